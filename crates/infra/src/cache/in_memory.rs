use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{CacheError, CacheLayer, CacheResult};

/// In-process cache for tests/dev. No expiry; entries live until evicted.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|m| m.contains_key(key))
            .unwrap_or(false)
    }
}

fn poisoned() -> CacheError {
    CacheError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl CacheLayer for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let map = self.entries.read().map_err(|_| poisoned())?;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> CacheResult<()> {
        let mut map = self.entries.write().map_err(|_| poisoned())?;
        map.insert(key.to_string(), value);
        Ok(())
    }

    async fn evict(&self, key: &str) -> CacheResult<()> {
        let mut map = self.entries.write().map_err(|_| poisoned())?;
        map.remove(key);
        Ok(())
    }

    async fn evict_prefix(&self, prefix: &str) -> CacheResult<()> {
        let mut map = self.entries.write().map_err(|_| poisoned())?;
        map.retain(|k, _| !k.starts_with(prefix));
        Ok(())
    }
}
