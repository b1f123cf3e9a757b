//! Signing key retrieval and caching.
//!
//! Keys are fetched from the key server by key id. Issued keys do not change,
//! so there is no expiry, but the cache holds at most [`KEY_CACHE_CAPACITY`]
//! keys and drops the least recently used one beyond that. Key ids come from
//! unauthenticated requests, so failed lookups leave nothing behind.
//! Concurrent lookups of the same missing key share a single fetch; lookups of
//! other keys are not held up by it.

mod fetcher;

pub use fetcher::HttpKeyFetcher;

use std::num::NonZeroUsize;
use std::sync::Arc;

use appcycle_sdk::config::DispatcherConfig;
use appcycle_sdk::signature::PublicKey;
use async_trait::async_trait;
use lru::LruCache;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Failed to retrieve key [{key_id}]: {source}")]
    Request {
        key_id: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to retrieve key [{key_id}]: status {status}")]
    Status { key_id: String, status: u16 },
    #[error("Invalid key [{key_id}]: {message}")]
    Invalid { key_id: String, message: String },
}

/// Source of PEM-encoded signing keys.
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    async fn fetch(&self, key_id: &str) -> Result<String, KeyError>;
}

pub const KEY_CACHE_CAPACITY: usize = 32;

type KeySlot = Arc<OnceCell<Arc<PublicKey>>>;

pub struct KeyCache {
    fetcher: Arc<dyn KeyFetcher>,
    slots: Mutex<LruCache<String, KeySlot>>,
}

impl KeyCache {
    pub fn new(fetcher: Arc<dyn KeyFetcher>) -> Self {
        Self::with_capacity(fetcher, KEY_CACHE_CAPACITY)
    }

    pub fn with_capacity(fetcher: Arc<dyn KeyFetcher>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            fetcher,
            slots: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// A cache backed by the configured key server.
    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self::new(Arc::new(HttpKeyFetcher::new(&config.keyserver_url)))
    }

    /// Resolve a key, fetching it on first use.
    ///
    /// Failed fetches are not cached; the next lookup tries again.
    pub async fn get(&self, key_id: &str) -> Result<Arc<PublicKey>, KeyError> {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots
                .get_or_insert(key_id.to_string(), KeySlot::default)
                .clone()
        };
        let result = slot
            .get_or_try_init(|| async {
                let pem = self.fetcher.fetch(key_id).await?;
                let key = PublicKey::from_pem(&pem).map_err(|e| KeyError::Invalid {
                    key_id: key_id.to_string(),
                    message: e.to_string(),
                })?;
                debug!(key_id = %key_id, "Cached signing key");
                Ok::<_, KeyError>(Arc::new(key))
            })
            .await
            .cloned();

        if result.is_err() {
            let mut slots = self.slots.lock().await;
            let stale = slots
                .peek(key_id)
                .is_some_and(|current| Arc::ptr_eq(current, &slot) && !current.initialized());
            if stale {
                slots.pop(key_id);
            }
        }
        result
    }

    /// A key that has already been fetched, without touching the network.
    pub async fn cached(&self, key_id: &str) -> Option<Arc<PublicKey>> {
        let slots = self.slots.lock().await;
        slots.peek(key_id).and_then(|slot| slot.get().cloned())
    }

    /// Number of key ids currently held, fetched or in flight.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }
}
