//! Distributed cache backend for keyed entries
//!
//! One hash per session: the session id is the hash key and entry keys are
//! the fields. Values pass through the codec in both directions so binary
//! tagged sub-fields are reconstructed on read.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, error, warn};

use super::KeyedStore;
use crate::codec::{self, StateValue};
use crate::error::{Result, StoreError};

/// Cache store for keyed entries
pub struct RedisKeyedStore {
    conn: MultiplexedConnection,
    namespace: String,
}

impl RedisKeyedStore {
    /// Connect to the cache; the session id namespaces every entry
    pub async fn connect(cache_url: &str, session_id: &str) -> Result<Self> {
        let client = redis::Client::open(cache_url)?;
        let conn = client.get_multiplexed_async_connection().await?;

        debug!("Cache keyed store ready for {}", session_id);
        Ok(Self {
            conn,
            namespace: session_id.to_string(),
        })
    }
}

#[async_trait]
impl KeyedStore for RedisKeyedStore {
    async fn write(&self, key: &str, value: &StateValue) -> Result<()> {
        let mut conn = self.conn.clone();
        let encoded = codec::encode(value);

        if let Err(e) = conn
            .hset::<_, _, _, ()>(&self.namespace, key, encoded)
            .await
        {
            error!("Failed to write entry {}: {}", key, e);
            return Err(e.into());
        }

        debug!("Wrote entry: {}", key);
        Ok(())
    }

    async fn read(&self, key: &str) -> Option<StateValue> {
        let mut conn = self.conn.clone();

        let text: Option<String> = match conn.hget(&self.namespace, key).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read entry {}: {}", key, e);
                return None;
            }
        };

        match codec::decode(&text?) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to decode entry {}: {}", key, e);
                None
            }
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        let removed: i64 = match conn.hdel(&self.namespace, key).await {
            Ok(removed) => removed,
            Err(e) => {
                error!("Failed to remove entry {}: {}", key, e);
                return Err(e.into());
            }
        };

        // A delete that removed nothing is a failed remove, not a no-op
        if removed == 0 {
            error!("No entry to remove: {}", key);
            return Err(StoreError::EntryNotFound(key.to_string()));
        }

        debug!("Removed entry: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_url() -> Option<String> {
        std::env::var("REDIS_URL").ok()
    }

    // Requires a live server; run with REDIS_URL set:
    //   REDIS_URL=redis://127.0.0.1/ cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_write_read_remove_against_live_cache() {
        let url = cache_url().expect("REDIS_URL must be set for cache tests");
        let store = RedisKeyedStore::connect(&url, "cache-test-session")
            .await
            .unwrap();

        let value = StateValue::Bytes(vec![1, 2, 3, 4, 5, 6, 7]);
        store.write("pre-key-3", &value).await.unwrap();
        assert_eq!(store.read("pre-key-3").await, Some(value));

        store.remove("pre-key-3").await.unwrap();
        assert_eq!(store.read("pre-key-3").await, None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_remove_missing_is_error() {
        let url = cache_url().expect("REDIS_URL must be set for cache tests");
        let store = RedisKeyedStore::connect(&url, "cache-test-session")
            .await
            .unwrap();

        let result = store.remove("never-written").await;
        assert!(matches!(result, Err(StoreError::EntryNotFound(_))));
    }
}
