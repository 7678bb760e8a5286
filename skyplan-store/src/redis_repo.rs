use async_trait::async_trait;
use redis::AsyncCommands;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::store::{KeyValueStore, SessionStores, StoreError, StoreScope};

/// One Redis hash per (session, scope). The session hash expires after
/// `session_ttl_seconds` without writes; the durable hash never expires.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    prefix: String,
    session_id: Uuid,
    session_ttl_seconds: u64,
}

impl RedisStore {
    pub fn new(client: redis::Client, prefix: impl Into<String>, session_id: Uuid, session_ttl_seconds: u64) -> Self {
        Self {
            client,
            prefix: prefix.into(),
            session_id,
            session_ttl_seconds,
        }
    }

    fn hash_key(&self, scope: StoreScope) -> String {
        hash_key(&self.prefix, self.session_id, scope)
    }
}

pub(crate) fn hash_key(prefix: &str, session_id: Uuid, scope: StoreScope) -> String {
    format!("{}:{}:{}", prefix, session_id, scope.as_str())
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get_raw(&self, scope: StoreScope, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.hget(self.hash_key(scope), key).await?;
        Ok(value)
    }

    async fn set_raw(&self, scope: StoreScope, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let hash = self.hash_key(scope);
        match scope {
            StoreScope::Durable => {
                let _: () = conn.hset(&hash, key, value).await?;
            }
            StoreScope::Session => {
                let _: () = redis::pipe()
                    .atomic()
                    .hset(&hash, key, value)
                    .ignore()
                    .expire(&hash, self.session_ttl_seconds as i64)
                    .ignore()
                    .query_async(&mut conn)
                    .await?;
            }
        }
        debug!("Redis hset {} {}", hash, key);
        Ok(())
    }

    async fn remove(&self, scope: StoreScope, key: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.hdel(self.hash_key(scope), key).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct RedisStores {
    client: redis::Client,
    prefix: String,
    session_ttl_seconds: u64,
}

impl RedisStores {
    pub fn new(connection_string: &str, prefix: impl Into<String>, session_ttl_seconds: u64) -> Result<Self, StoreError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self {
            client,
            prefix: prefix.into(),
            session_ttl_seconds,
        })
    }
}

#[async_trait]
impl SessionStores for RedisStores {
    async fn open(&self, session_id: Uuid) -> Arc<dyn KeyValueStore> {
        Arc::new(RedisStore::new(
            self.client.clone(),
            self.prefix.clone(),
            session_id,
            self.session_ttl_seconds,
        ))
    }
}
