/*!
 * Request context extractor
 *
 * Responsibility:
 * - リクエストごとのコンテキスト（RequestCtx）を handler / auth chain に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - RequestCtx, Principal
 * - RequestCtxExtractor
 */

mod core;
mod types;

pub use self::core::RequestCtxExtractor;
pub use self::types::{Principal, RequestCtx};
