/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: request context の差し込み + operation 単位の auth chain
 * - http: request id / trace / body limit / timeout
 */
pub mod auth;
pub mod http;
