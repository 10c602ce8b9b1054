/*
 * Responsibility
 * - 環境変数や設定の読み込み (identity provider domain / audience / JWKS / policy)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

use crate::services::auth::keys::KeyStoreOptions;
use crate::services::auth::rules::UnlistedPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Identity provider (tenant domain, e.g. `tenant.eu.auth0.com`)
    pub auth_domain: String,
    pub auth_audience: String,
    // Always `https://<domain>/`
    pub auth_issuer: String,
    pub access_token_leeway_seconds: u64,

    pub jwks_url: Url,
    pub jwks_fetch_timeout_seconds: u64,
    pub jwks_min_refresh_seconds: u64,

    pub unknown_operation_policy: UnlistedPolicy,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        _ => Ok(default),
    }
}

/// `https://<domain>/`, the issuer the provider stamps into its tokens.
pub fn issuer_for(domain: &str) -> String {
    format!("https://{}/", domain)
}

/// Default JWKS location published by the provider.
pub fn jwks_url_for(domain: &str) -> Result<Url, url::ParseError> {
    Url::parse(&issuer_for(domain))?.join(".well-known/jwks.json")
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = env_or("PORT", 4000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let auth_domain = std::env::var("AUTH_DOMAIN")
            .map_err(|_| ConfigError::Missing("AUTH_DOMAIN"))?
            .trim()
            .trim_end_matches('/')
            .to_string();
        if auth_domain.is_empty() || auth_domain.contains("://") {
            return Err(ConfigError::Invalid("AUTH_DOMAIN"));
        }

        let auth_audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let jwks_url = match std::env::var("AUTH_JWKS_URL") {
            Ok(v) if !v.trim().is_empty() => {
                Url::parse(v.trim()).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?
            }
            _ => jwks_url_for(&auth_domain).map_err(|_| ConfigError::Invalid("AUTH_DOMAIN"))?,
        };

        // No grace window unless explicitly configured.
        let access_token_leeway_seconds = env_or("ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;
        let jwks_fetch_timeout_seconds = env_or("JWKS_FETCH_TIMEOUT_SECONDS", 5)?;
        // Off by default: every unseen kid gets a miss-driven refetch.
        let jwks_min_refresh_seconds = env_or(
            "JWKS_MIN_REFRESH_SECONDS",
            KeyStoreOptions::default().min_refresh_interval.as_secs(),
        )?;

        let unknown_operation_policy =
            env_or("UNKNOWN_OPERATION_POLICY", UnlistedPolicy::Allow)?;

        let request_timeout_seconds = env_or("REQUEST_TIMEOUT_SECONDS", 30)?;
        let request_body_limit_bytes = env_or("REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            auth_issuer: issuer_for(&auth_domain),
            auth_domain,
            auth_audience,
            access_token_leeway_seconds,
            jwks_url,
            jwks_fetch_timeout_seconds,
            jwks_min_refresh_seconds,
            unknown_operation_policy,
            request_timeout_seconds,
            request_body_limit_bytes,
        })
    }
}
