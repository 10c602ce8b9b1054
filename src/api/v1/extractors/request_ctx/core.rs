use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::state::AppState;

use super::RequestCtx;

/// Handler で RequestCtx を受け取るための extractor
/// middleware (`middleware::auth::access`) が request.extensions() に insert 済みである前提
/// 見つからない場合は配線ミスなので 500 を返す（認証可否は operation ごとに chain が決める）
pub struct RequestCtxExtractor(pub RequestCtx);

impl FromRequestParts<AppState> for RequestCtxExtractor
where
    AppState: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RequestCtx>() {
            Some(ctx) => Ok(RequestCtxExtractor(ctx.clone())),
            None => {
                tracing::error!("RequestCtx missing; access middleware not applied");
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
