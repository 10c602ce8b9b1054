/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /graphql
 * - RequestCtx を差し込む access middleware をここで掛ける (検証は operation 単位で gateway 側)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{graphql::execute, health::health};
use crate::middleware;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/graphql", post(execute));

    middleware::auth::access::apply(router)
}
