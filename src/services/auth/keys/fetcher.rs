//! Retrieval of the provider's published key set.
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use super::jwk::JwkSet;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("jwks request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("jwks endpoint returned HTTP {0}")]
    Status(u16),
    #[error("jwks document invalid: {0}")]
    Document(String),
}

/// Source of JWKS documents.
///
/// The key store owns caching and coalescing; implementations only perform one
/// fetch per call.
#[async_trait]
pub trait JwksFetcher: Send + Sync + 'static {
    // Where keys come from (for logging).
    fn source(&self) -> &str;

    async fn fetch(&self) -> Result<JwkSet, FetchError>;
}

/// `GET <jwks_url>` over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpJwksFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpJwksFetcher {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    fn source(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch(&self) -> Result<JwkSet, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<JwkSet>(&body).map_err(|e| FetchError::Document(e.to_string()))
    }
}
