use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Durable survives a browser restart; session lives as long as the tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreScope {
    Durable,
    Session,
}

impl StoreScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreScope::Durable => "durable",
            StoreScope::Session => "session",
        }
    }
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Raw string key/value access over the two scopes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_raw(&self, scope: StoreScope, key: &str) -> Result<Option<String>, StoreError>;
    async fn set_raw(&self, scope: StoreScope, key: &str, value: String) -> Result<(), StoreError>;
    async fn remove(&self, scope: StoreScope, key: &str) -> Result<(), StoreError>;
}

/// Hands out the store backing one checkout session.
#[async_trait]
pub trait SessionStores: Send + Sync {
    async fn open(&self, session_id: Uuid) -> Arc<dyn KeyValueStore>;

    /// Called once a session has been abandoned. Stores that expire on their
    /// own can ignore it.
    async fn release(&self, _session_id: Uuid) {}
}

/// Typed JSON view over a [`KeyValueStore`].
///
/// Never fails: unreadable or malformed values come back as `None`, failed
/// writes are logged and dropped. Callers treat both as "absent".
#[derive(Clone)]
pub struct PersistedStore {
    inner: Arc<dyn KeyValueStore>,
}

impl PersistedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub async fn get<T: DeserializeOwned>(&self, scope: StoreScope, key: &str) -> Option<T> {
        let raw = match self.inner.get_raw(scope, key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("store read {}:{} failed: {}", scope, key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("discarding malformed value at {}:{}: {}", scope, key, e);
                None
            }
        }
    }

    /// Returns whether the write reached the backing store.
    pub async fn set<T: Serialize + ?Sized>(&self, scope: StoreScope, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("could not encode value for {}:{}: {}", scope, key, e);
                return false;
            }
        };
        debug!("store write {}:{} ({} bytes)", scope, key, raw.len());
        match self.inner.set_raw(scope, key, raw).await {
            Ok(()) => true,
            Err(e) => {
                warn!("store write {}:{} failed: {}", scope, key, e);
                false
            }
        }
    }

    pub async fn remove(&self, scope: StoreScope, key: &str) {
        if let Err(e) = self.inner.remove(scope, key).await {
            warn!("store remove {}:{} failed: {}", scope, key, e);
        }
    }
}
