pub mod fetcher;
pub mod jwk;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use fetcher::{FetchError, HttpJwksFetcher, JwksFetcher};
pub use jwk::PublicKey;
pub use store::{KeyStore, KeyStoreOptions};

/// Why a `kid` could not be turned into a verification key.
///
/// `Clone` because one coalesced fetch outcome is handed to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyResolutionError {
    #[error("no key with kid {0:?} in the provider key set")]
    UnknownKey(String),
    #[error("fetching the provider key set failed: {0}")]
    FetchFailed(String),
}

/// Resolve a key identifier to the key published under it.
///
/// Implementations must never return a key whose `kid` differs from the one asked for.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, kid: &str) -> Result<Arc<PublicKey>, KeyResolutionError>;
}
