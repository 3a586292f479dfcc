use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{CacheError, CacheLayer};

/// Cache entries a write has made stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    keys: BTreeSet<String>,
    prefixes: BTreeSet<&'static str>,
}

impl Invalidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefixes.insert(prefix);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.prefixes.iter().copied()
    }
}

/// Memoized reads, invalidated on write.
///
/// Reads hold the shared side of a fence from lookup through fill; writes
/// hold the exclusive side across the store write and its invalidation. A
/// reader that loaded the old value can therefore never put it back after
/// the write has evicted it. The fence is per process.
///
/// Do not call [`read`](Self::read) from inside a [`write`](Self::write)
/// operation: the fence is not reentrant.
pub struct ReadThroughCache {
    layer: Arc<dyn CacheLayer>,
    fence: RwLock<()>,
}

impl ReadThroughCache {
    pub fn new(layer: Arc<dyn CacheLayer>) -> Self {
        Self {
            layer,
            fence: RwLock::new(()),
        }
    }

    /// Serve `key` from the cache, or run `load` and remember its result.
    ///
    /// Failed loads are not cached. An entry that no longer decodes is
    /// treated as a miss and overwritten.
    pub async fn read<T, E, F, Fut>(&self, key: &str, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let _fence = self.fence.read().await;

        if let Some(raw) = self.layer.get(key).await? {
            match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(cache_key = key, "cache hit");
                    return Ok(value);
                }
                Err(e) => warn!(cache_key = key, error = %e, "discarding undecodable cache entry"),
            }
        }

        debug!(cache_key = key, "cache miss");
        let value = load().await?;
        let raw = serde_json::to_string(&value)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.layer.put(key, raw).await?;
        Ok(value)
    }

    /// Run a write and apply the invalidation it reports, atomically with
    /// respect to readers. Nothing is evicted when `op` fails.
    pub async fn write<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(T, Invalidation), E>>,
    {
        let _fence = self.fence.write().await;
        let (value, invalidation) = op().await?;
        self.invalidate(&invalidation).await?;
        Ok(value)
    }

    async fn invalidate(&self, invalidation: &Invalidation) -> Result<(), CacheError> {
        for key in invalidation.keys() {
            self.layer.evict(key).await?;
        }
        for prefix in invalidation.prefixes() {
            self.layer.evict_prefix(prefix).await?;
        }
        debug!(?invalidation, "cache invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = ReadThroughCache::new(Arc::new(InMemoryCache::new()));
        let loads = AtomicUsize::new(0);

        for _ in 0..2 {
            let v: Result<u32, CacheError> = cache
                .read("product:id:1", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(v.unwrap(), 7);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_loads_are_not_cached() {
        let layer = Arc::new(InMemoryCache::new());
        let cache = ReadThroughCache::new(layer.clone());
        let v: Result<u32, CacheError> = cache
            .read("k", || async { Err(CacheError::Backend("down".into())) })
            .await;
        assert!(v.is_err());
        assert!(layer.is_empty());
    }

    #[tokio::test]
    async fn write_evicts_keys_and_prefixes_only_on_success() {
        let layer = Arc::new(InMemoryCache::new());
        let cache = ReadThroughCache::new(layer.clone());
        layer.put("product:id:1", "1".into()).await.unwrap();
        layer.put("products:page:x", "[]".into()).await.unwrap();
        layer.put("category:id:1", "{}".into()).await.unwrap();

        let failed: Result<(), CacheError> = cache
            .write(|| async { Err(CacheError::Backend("store down".into())) })
            .await;
        assert!(failed.is_err());
        assert_eq!(layer.len(), 3);

        let ok: Result<(), CacheError> = cache
            .write(|| async {
                Ok((
                    (),
                    Invalidation::new().key("product:id:1").prefix("products:"),
                ))
            })
            .await;
        ok.unwrap();
        assert!(!layer.contains("product:id:1"));
        assert!(!layer.contains("products:page:x"));
        assert!(layer.contains("category:id:1"));
    }

    #[tokio::test]
    async fn undecodable_entries_are_reloaded() {
        let layer = Arc::new(InMemoryCache::new());
        layer.put("k", "not json".into()).await.unwrap();
        let cache = ReadThroughCache::new(layer.clone());
        let v: Result<u32, CacheError> = cache.read("k", || async { Ok(3) }).await;
        assert_eq!(v.unwrap(), 3);
        assert_eq!(layer.get("k").await.unwrap().as_deref(), Some("3"));
    }
}
