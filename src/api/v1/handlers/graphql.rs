/*
 * Responsibility
 * - POST /graphql: operationName + variables を受け取り gateway に委譲
 * - 結果を `{ data: { <operationName>: ... } }` に包んで返す
 * - 認証 / 認可の判断はしない (gateway の auth chain が operation ごとに行う)
 */
use axum::{Json, extract::State};

use crate::api::v1::dto::operation::{OperationRequest, OperationResponse};
use crate::api::v1::extractors::RequestCtxExtractor;
use crate::error::AppError;
use crate::state::AppState;

pub async fn execute(
    State(state): State<AppState>,
    RequestCtxExtractor(ctx): RequestCtxExtractor,
    Json(req): Json<OperationRequest>,
) -> Result<Json<OperationResponse>, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("BAD_USER_INPUT", m))?;

    let operation = req.operation_name.trim();
    let result = state
        .gateway
        .execute(operation, req.arguments(), ctx)
        .await?;

    Ok(Json(OperationResponse::new(operation, result)))
}
