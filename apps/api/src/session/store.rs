//! Key/value storage behind the identity layer.
//!
//! `KvStore` is the seam: `InMemoryKvStore` for tests and single-node dev,
//! `RedisKvStore` when `REDIS_URL` is configured. `ScopedKvStore` gives each
//! client its own key namespace on top of either.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal store error: {0}")]
    Internal(String),
}

/// String-keyed, string-valued store with simple equality lookups.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
    /// Writes `value` only if the key currently holds `expected` (`None` means
    /// absent). Returns whether the write happened. The check and the write are
    /// one atomic step.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

/// In-memory implementation for development and testing
#[derive(Default)]
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        if entries.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis
// ────────────────────────────────────────────────────────────────────────────

// ARGV[1] = "1" when the key must be absent, ARGV[2] = expected, ARGV[3] = new.
const COMPARE_AND_SET_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
    if current then return 0 end
elseif current ~= ARGV[2] then
    return 0
end
redis.call('SET', KEYS[1], ARGV[3])
return 1
"#;

/// Redis-backed store over a multiplexed connection. Cloning the connection is
/// cheap; each call works on its own handle.
pub struct RedisKvStore {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisKvStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let written: i32 = redis::Script::new(COMPARE_AND_SET_SCRIPT)
            .key(key)
            .arg(if expected.is_none() { "1" } else { "0" })
            .arg(expected.unwrap_or_default())
            .arg(value)
            .invoke_async(&mut conn)
            .await?;
        Ok(written == 1)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-client namespace
// ────────────────────────────────────────────────────────────────────────────

/// View of a shared store restricted to one client's keys (`client:{id}:{key}`).
#[derive(Clone)]
pub struct ScopedKvStore {
    inner: Arc<dyn KvStore>,
    prefix: String,
}

impl ScopedKvStore {
    pub fn new(inner: Arc<dyn KvStore>, client_id: Uuid) -> Self {
        Self {
            inner,
            prefix: format!("client:{client_id}:"),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

#[async_trait]
impl KvStore for ScopedKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(&self.key(key)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(&self.key(key), value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(&self.key(key)).await
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StoreError> {
        self.inner
            .compare_and_set(&self.key(key), expected, value)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_get_set_delete() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_compare_and_set_only_writes_over_expected_value() {
        let store = InMemoryKvStore::new();
        assert!(store.compare_and_set("k", None, "v1").await.unwrap());
        assert!(!store.compare_and_set("k", None, "v2").await.unwrap());
        assert!(!store.compare_and_set("k", Some("stale"), "v2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

        assert!(store.compare_and_set("k", Some("v1"), "v2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_scoped_compare_and_set_uses_client_namespace() {
        let shared: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
        let id = Uuid::new_v4();
        let scoped = ScopedKvStore::new(shared.clone(), id);

        shared.set("users", "[]").await.unwrap();
        assert!(scoped.compare_and_set("users", None, "[1]").await.unwrap());
        assert_eq!(
            shared.get(&format!("client:{id}:users")).await.unwrap().as_deref(),
            Some("[1]")
        );
    }

    #[tokio::test]
    async fn test_scoped_stores_do_not_see_each_other() {
        let shared: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
        let a_id = Uuid::new_v4();
        let a = ScopedKvStore::new(shared.clone(), a_id);
        let b = ScopedKvStore::new(shared.clone(), Uuid::new_v4());

        a.set("loggedInUser", "a@example.com").await.unwrap();
        assert_eq!(b.get("loggedInUser").await.unwrap(), None);
        assert_eq!(
            shared
                .get(&format!("client:{a_id}:loggedInUser"))
                .await
                .unwrap()
                .as_deref(),
            Some("a@example.com")
        );
    }
}
