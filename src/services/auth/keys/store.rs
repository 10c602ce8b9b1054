//! Process-wide JWKS cache.
//!
//! Responsibility:
//! - `kid` → key lookups served from memory
//! - refresh on miss, with concurrent misses coalesced into a single fetch
//! - keep the last good key set when a refresh fails
//!
//! The fetch runs on its own task. Callers only hold a `watch` receiver, so a
//! cancelled request never cancels a fetch other requests are waiting on.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::watch;

use super::fetcher::JwksFetcher;
use super::jwk::{KeyMap, PublicKey, index_keys};
use super::{KeyResolutionError, KeyResolver};

type RefreshOutcome = Result<(), KeyResolutionError>;
type InflightRefresh = watch::Receiver<Option<RefreshOutcome>>;

#[derive(Debug, Clone, Copy)]
pub struct KeyStoreOptions {
    /// Upper bound on one JWKS fetch.
    pub fetch_timeout: Duration,
    /// After a successful fetch, misses inside this window are answered from
    /// the current key set instead of refetching. Zero disables it.
    pub min_refresh_interval: Duration,
}

impl Default for KeyStoreOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            min_refresh_interval: Duration::ZERO,
        }
    }
}

struct Snapshot {
    keys: KeyMap,
    fetched_at: Instant,
}

struct Inner {
    fetcher: Arc<dyn JwksFetcher>,
    options: KeyStoreOptions,
    // Replaced wholesale on each successful fetch; never edited in place.
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    inflight: Mutex<Option<InflightRefresh>>,
}

/// Cheap to clone; all clones share one cache.
#[derive(Clone)]
pub struct KeyStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("source", &self.inner.fetcher.source())
            .field("options", &self.inner.options)
            .field("cached_keys", &self.cached_len())
            .finish()
    }
}

impl KeyStore {
    pub fn new(fetcher: Arc<dyn JwksFetcher>, options: KeyStoreOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                options,
                snapshot: RwLock::new(None),
                inflight: Mutex::new(None),
            }),
        }
    }

    /// Populate the cache ahead of the first request.
    pub async fn prime(&self) -> Result<usize, KeyResolutionError> {
        self.refresh().await?;
        Ok(self.cached_len())
    }

    pub fn cached_len(&self) -> usize {
        self.inner
            .current()
            .map(|s| s.keys.len())
            .unwrap_or_default()
    }

    fn cached(&self, kid: &str) -> Option<Arc<PublicKey>> {
        self.inner
            .current()
            .and_then(|s| s.keys.get(kid).cloned())
    }

    /// Cache first; on miss, join (or start) the single in-flight refresh and look again.
    pub async fn resolve(&self, kid: &str) -> Result<Arc<PublicKey>, KeyResolutionError> {
        if let Some(key) = self.cached(kid) {
            return Ok(key);
        }

        tracing::debug!(kid, "jwks cache miss");
        self.refresh().await?;

        self.cached(kid)
            .ok_or_else(|| KeyResolutionError::UnknownKey(kid.to_string()))
    }

    async fn refresh(&self) -> RefreshOutcome {
        let mut rx = {
            let mut slot = self
                .inner
                .inflight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            match slot.as_ref() {
                Some(rx) => rx.clone(),
                None => {
                    if self.inner.cooling_down() {
                        tracing::debug!("jwks refresh skipped: within minimum refresh interval");
                        return Ok(());
                    }

                    let (tx, rx) = watch::channel(None);
                    *slot = Some(rx.clone());

                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(async move {
                        let slot = InflightSlot(Arc::clone(&inner));
                        let outcome = inner.fetch_and_install().await;
                        // Clear the slot before publishing so the next miss burst starts a new fetch.
                        drop(slot);
                        let _ = tx.send(Some(outcome));
                    });

                    rx
                }
            }
        };

        let outcome = rx.wait_for(Option::is_some).await.map(|o| (*o).clone());
        match outcome {
            Ok(Some(result)) => result,
            _ => {
                // Sender dropped without publishing; the task died mid-fetch.
                self.inner.release_inflight(Some(&rx));
                Err(KeyResolutionError::FetchFailed(
                    "refresh task ended without a result".into(),
                ))
            }
        }
    }
}

/// Frees the in-flight slot when the refresh task ends, unwinding included.
struct InflightSlot(Arc<Inner>);

impl Drop for InflightSlot {
    fn drop(&mut self) {
        self.0.release_inflight(None);
    }
}

impl Inner {
    /// Empty the in-flight slot. With `only`, leave it alone unless it still
    /// holds that refresh's channel.
    fn release_inflight(&self, only: Option<&InflightRefresh>) {
        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        let matches = match (slot.as_ref(), only) {
            (Some(current), Some(rx)) => current.same_channel(rx),
            _ => true,
        };
        if matches {
            slot.take();
        }
    }

    fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn cooling_down(&self) -> bool {
        let window = self.options.min_refresh_interval;
        !window.is_zero()
            && self
                .current()
                .is_some_and(|s| s.fetched_at.elapsed() < window)
    }

    async fn fetch_and_install(&self) -> RefreshOutcome {
        let source = self.fetcher.source();
        let fetched = tokio::time::timeout(self.options.fetch_timeout, self.fetcher.fetch()).await;

        let set = match fetched {
            Ok(Ok(set)) => set,
            Ok(Err(err)) => {
                tracing::warn!(source, error = %err, "jwks fetch failed");
                return Err(KeyResolutionError::FetchFailed(err.to_string()));
            }
            Err(_) => {
                tracing::warn!(
                    source,
                    timeout_ms = self.options.fetch_timeout.as_millis() as u64,
                    "jwks fetch timed out"
                );
                return Err(KeyResolutionError::FetchFailed("timed out".into()));
            }
        };

        let keys = index_keys(&set);
        if keys.is_empty() {
            tracing::warn!(source, "jwks document has no usable keys; keeping current key set");
            return Err(KeyResolutionError::FetchFailed("no usable keys".into()));
        }

        tracing::info!(source, keys = keys.len(), "jwks refreshed");
        let snapshot = Arc::new(Snapshot {
            keys,
            fetched_at: Instant::now(),
        });
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);

        Ok(())
    }
}

#[async_trait]
impl KeyResolver for KeyStore {
    async fn resolve(&self, kid: &str) -> Result<Arc<PublicKey>, KeyResolutionError> {
        KeyStore::resolve(self, kid).await
    }
}
