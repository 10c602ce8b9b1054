/*
 * Responsibility
 * - GET /health (疎通用)
 * - auth chain を通さない (operation ではない)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
