use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::store::{KeyValueStore, SessionStores, StoreError, StoreScope};

#[derive(Debug, Default)]
pub struct MemoryStore {
    durable: RwLock<HashMap<String, String>>,
    session: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn scope(&self, scope: StoreScope) -> &RwLock<HashMap<String, String>> {
        match scope {
            StoreScope::Durable => &self.durable,
            StoreScope::Session => &self.session,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.durable.read().await.is_empty() && self.session.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_raw(&self, scope: StoreScope, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.scope(scope).read().await.get(key).cloned())
    }

    async fn set_raw(&self, scope: StoreScope, key: &str, value: String) -> Result<(), StoreError> {
        self.scope(scope).write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, scope: StoreScope, key: &str) -> Result<(), StoreError> {
        self.scope(scope).write().await.remove(key);
        Ok(())
    }
}

struct TrackedStore {
    store: Arc<MemoryStore>,
    last_seen: Instant,
}

/// In-process registry of per-session memory stores. A session not opened
/// for `idle_ttl` is dropped whole on the next `open`.
pub struct MemoryStores {
    sessions: Mutex<HashMap<Uuid, TrackedStore>>,
    idle_ttl: Duration,
}

impl MemoryStores {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

impl Default for MemoryStores {
    fn default() -> Self {
        Self::new(Duration::from_secs(1800))
    }
}

#[async_trait]
impl SessionStores for MemoryStores {
    async fn open(&self, session_id: Uuid) -> Arc<dyn KeyValueStore> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        let before = sessions.len();
        sessions.retain(|_, tracked| now.duration_since(tracked.last_seen) < self.idle_ttl);
        if sessions.len() < before {
            debug!("expired {} idle checkout sessions", before - sessions.len());
        }

        let tracked = sessions.entry(session_id).or_insert_with(|| TrackedStore {
            store: Arc::new(MemoryStore::new()),
            last_seen: now,
        });
        tracked.last_seen = now;
        tracked.store.clone()
    }

    async fn release(&self, session_id: Uuid) {
        let mut sessions = self.sessions.lock().await;
        let empty = match sessions.get(&session_id) {
            Some(tracked) => tracked.store.is_empty().await,
            None => return,
        };
        if empty {
            sessions.remove(&session_id);
            debug!("released checkout session {}", session_id);
        }
    }
}
