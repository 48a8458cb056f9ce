//! Cache backend chosen at startup.

use std::time::Duration;

use platform::cache::{CacheResult, CacheStore, MemoryCache, RedisCache};

/// Redis when `REDIS_URL` is set, the in-process map otherwise.
pub enum AppCache {
    Redis(RedisCache),
    Memory(MemoryCache),
}

impl AppCache {
    pub async fn from_url(url: Option<&str>) -> CacheResult<Self> {
        match url {
            Some(url) => {
                let cache = RedisCache::connect(url).await?;
                tracing::info!("Connected to Redis");
                Ok(Self::Redis(cache))
            }
            None => {
                tracing::info!("REDIS_URL not set, using in-process cache");
                Ok(Self::Memory(MemoryCache::new()))
            }
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Redis(_) => "redis",
            Self::Memory(_) => "memory",
        }
    }
}

impl CacheStore for AppCache {
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        match self {
            Self::Redis(c) => c.get(key).await,
            Self::Memory(c) => c.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        match self {
            Self::Redis(c) => c.set(key, value, ttl).await,
            Self::Memory(c) => c.set(key, value, ttl).await,
        }
    }

    async fn has(&self, key: &str) -> CacheResult<bool> {
        match self {
            Self::Redis(c) => c.has(key).await,
            Self::Memory(c) => c.has(key).await,
        }
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<()> {
        match self {
            Self::Redis(c) => c.delete(keys).await,
            Self::Memory(c) => c.delete(keys).await,
        }
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        match self {
            Self::Redis(c) => c.keys(pattern).await,
            Self::Memory(c) => c.keys(pattern).await,
        }
    }
}
