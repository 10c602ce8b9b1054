/// Factory: build the key store and token verifier from application `Config`.
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::keys::{HttpJwksFetcher, KeyStore, KeyStoreOptions};
use crate::services::auth::verifier::{TokenVerifier, VerifierSettings};

pub fn build_key_store(config: &Config) -> Result<KeyStore, AppError> {
    let fetch_timeout = Duration::from_secs(config.jwks_fetch_timeout_seconds);

    let fetcher = HttpJwksFetcher::new(config.jwks_url.clone(), fetch_timeout).map_err(|err| {
        tracing::error!(error = %err, "failed to build jwks http client");
        AppError::Internal
    })?;

    let options = KeyStoreOptions {
        fetch_timeout,
        min_refresh_interval: Duration::from_secs(config.jwks_min_refresh_seconds),
    };

    Ok(KeyStore::new(Arc::new(fetcher), options))
}

pub fn build_verifier(config: &Config, keys: KeyStore) -> Arc<TokenVerifier> {
    let settings = VerifierSettings {
        issuer: config.auth_issuer.clone(),
        audience: config.auth_audience.clone(),
        leeway_seconds: config.access_token_leeway_seconds,
    };

    Arc::new(TokenVerifier::new(Arc::new(keys), &settings))
}
