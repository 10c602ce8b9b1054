//! Authorization header → RequestCtx を extensions に入れる
//!
//! - ここでは検証しない。ヘッダ値と request id を運ぶだけ
//! - 検証 / 認可は operation ごとに auth chain (`authenticate` → `authorize`) が行う
//! - ヘッダが無い / UTF-8 でない場合は anonymous として扱う

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::RequestCtx;
use crate::middleware::http::REQUEST_ID_HEADER;
use crate::state::AppState;

/// `/api/v1/*` に RequestCtx を差し込む middleware を適用する。
pub fn apply(router: Router<AppState>) -> Router<AppState> {
    router.layer(middleware::from_fn(access_middleware))
}

fn header_str(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn access_middleware(mut req: Request<Body>, next: Next) -> Response {
    let headers = req.headers();
    let ctx = RequestCtx::new(
        header_str(headers, REQUEST_ID_HEADER),
        header_str(headers, header::AUTHORIZATION),
    );

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    next.run(req).await
}
