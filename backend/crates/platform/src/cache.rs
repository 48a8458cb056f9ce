//! Cache-aside infrastructure
//!
//! A small key/value façade with TTLs and JSON helpers. The cache is never
//! authoritative: callers branch on [`CacheError::Miss`] to go to the source
//! of truth, and treat every other error as "cache unavailable".
//!
//! Two stores are provided:
//! - [`RedisCache`] - shared across instances
//! - [`MemoryCache`] - per process, used when no Redis URL is configured and in tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum CacheError {
    /// Key absent or expired. Expected control flow, not a failure.
    #[error("cache miss for key `{0}`")]
    Miss(String),

    #[error("cache payload could not be (de)serialized")]
    Serialization(#[from] serde_json::Error),

    #[error("cache backend error")]
    Redis(#[from] redis::RedisError),
}

impl CacheError {
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss(_))
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for cache storage backends
#[trait_variant::make(CacheStore: Send)]
pub trait LocalCacheStore {
    /// Raw bytes, or [`CacheError::Miss`].
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    async fn has(&self, key: &str) -> CacheResult<bool>;

    async fn delete(&self, keys: &[String]) -> CacheResult<()>;

    /// Keys matching a glob pattern (`*`, `?`). Administrative use only.
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;
}

// ============================================================================
// Façade
// ============================================================================

/// Typed façade over a [`CacheStore`]. Cheap to clone.
pub struct Cache<S> {
    store: Arc<S>,
}

impl<S> Clone for Cache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CacheStore + Sync> Cache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        self.store.get(key).await
    }

    /// Fetch and JSON-decode.
    pub async fn get_struct<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        let bytes = self.store.get(key).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.store.set(key, value, ttl).await
    }

    /// JSON-encode and store with `ttl`.
    pub async fn set_struct<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> CacheResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, bytes, ttl).await
    }

    pub async fn has(&self, key: &str) -> CacheResult<bool> {
        self.store.has(key).await
    }

    pub async fn delete(&self, keys: &[String]) -> CacheResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        self.store.delete(keys).await
    }

    pub async fn get_keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.store.keys(pattern).await
    }
}

// ============================================================================
// Redis store
// ============================================================================

/// Redis-backed store. The connection manager reconnects on its own.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        value.ok_or_else(|| CacheError::Miss(key.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        // SET EX rejects 0
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, secs).await?;
        Ok(())
    }

    async fn has(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(keys).await?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.keys(pattern).await?)
    }
}

// ============================================================================
// In-memory store
// ============================================================================

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Process-local store. Expired entries behave as absent and are dropped lazily.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }
}

impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(entry.value.clone()),
                Some(_) => {}
                None => return Err(CacheError::Miss(key.to_string())),
            }
        }
        self.entries.write().await.remove(key);
        Err(CacheError::Miss(key.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn has(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .is_some_and(|e| e.expires_at > now))
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|(key, e)| e.expires_at > now && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Redis-style glob with `*` and `?`.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        match p.get(pi) {
            Some('*') => {
                backtrack = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '?' || c == t[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    pi = star + 1;
                    ti = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}
