/*
 * Responsibility
 * - Config読み込み → 依存生成 (JWKS key store / verifier / rule table / gateway) → Router 組み立て
 * - Middleware の適用 (request context / request id / trace / limits)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::middleware::auth::chain::Chain;
use crate::repos::event_repo::EventRepo;
use crate::services::auth::{KeyStore, build_key_store, build_verifier};
use crate::services::events;
use crate::services::gateway::Gateway;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,events_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(?info, "panic");

        // development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        auth_domain = %config.auth_domain,
        audience = %config.auth_audience,
        "starting gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

async fn build_state(config: &Config) -> Result<AppState, AppError> {
    let keys = build_key_store(config)?;

    // An unreachable JWKS endpoint must not keep the gateway down; the first
    // token with an unknown kid retries the fetch.
    match keys.prime().await {
        Ok(count) => tracing::info!(keys = count, jwks = %config.jwks_url, "jwks primed"),
        Err(err) => tracing::warn!(error = %err, jwks = %config.jwks_url, "jwks prime failed"),
    }

    Ok(AppState::new(build_gateway(config, keys)))
}

fn build_gateway(config: &Config, keys: KeyStore) -> Arc<Gateway> {
    let verifier = build_verifier(config, keys);
    let rules = Arc::new(events::rules(config.unknown_operation_policy));
    tracing::info!(unlisted = ?rules.unlisted_policy(), "operation rules loaded");
    let repo = Arc::new(EventRepo::new());

    let gateway = Gateway::new(events::registry(repo), Chain::auth(verifier, rules));
    tracing::debug!(?gateway, "gateway assembled");

    Arc::new(gateway)
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes())
        .with_state(state);

    middleware::http::apply(router, config)
}
