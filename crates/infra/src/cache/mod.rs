//! Read-through cache boundary.
//!
//! Values are stored as serialized JSON under namespaced string keys (see
//! [`keys`]). Point entries are evicted by key; listing entries are evicted
//! wholesale by prefix.

use std::sync::Arc;

use thiserror::Error;

pub mod in_memory;
pub mod keys;
pub mod read_through;
#[cfg(feature = "redis")]
pub mod redis_cache;

pub use in_memory::InMemoryCache;
pub use read_through::{Invalidation, ReadThroughCache};
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache serialization error: {0}")]
    Serialization(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

#[async_trait::async_trait]
pub trait CacheLayer: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn put(&self, key: &str, value: String) -> CacheResult<()>;

    async fn evict(&self, key: &str) -> CacheResult<()>;

    /// Evict every entry whose key starts with `prefix`.
    async fn evict_prefix(&self, prefix: &str) -> CacheResult<()>;
}

#[async_trait::async_trait]
impl<C> CacheLayer for Arc<C>
where
    C: CacheLayer + ?Sized,
{
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: String) -> CacheResult<()> {
        (**self).put(key, value).await
    }

    async fn evict(&self, key: &str) -> CacheResult<()> {
        (**self).evict(key).await
    }

    async fn evict_prefix(&self, prefix: &str) -> CacheResult<()> {
        (**self).evict_prefix(prefix).await
    }
}
