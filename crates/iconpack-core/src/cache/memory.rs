//! In-memory catalog cache.

use super::traits::CatalogCache;
use crate::catalog::IconCatalog;
use crate::config::CatalogConfig;
use mini_moka::sync::Cache;
use std::sync::Arc;

/// `mini-moka` backed cache, optionally expiring entries after a TTL.
#[derive(Clone)]
pub struct MemoryCatalogCache {
    cache: Cache<String, Arc<IconCatalog>>,
}

impl MemoryCatalogCache {
    /// A cache that keeps catalogs until invalidated.
    pub fn new() -> Self {
        Self::from_config(&CatalogConfig::default())
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(CatalogConfig::CACHE_MAX_CAPACITY);
        if let Some(ttl) = config.cache_ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            cache: builder.build(),
        }
    }
}

impl Default for MemoryCatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache for MemoryCatalogCache {
    fn get(&self, key: &str) -> Option<Arc<IconCatalog>> {
        self.cache.get(&key.to_string())
    }

    fn set(&self, key: &str, catalog: Arc<IconCatalog>) {
        self.cache.insert(key.to_string(), catalog);
    }

    fn invalidate(&self, key: &str) {
        self.cache.invalidate(&key.to_string());
    }
}

impl std::fmt::Debug for MemoryCatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCatalogCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_set_get_invalidate() {
        let cache = MemoryCatalogCache::new();
        assert!(cache.get("key").is_none());

        let catalog = Arc::new(IconCatalog::default());
        cache.set("key", catalog.clone());
        let cached = cache.get("key").unwrap();
        assert!(Arc::ptr_eq(&cached, &catalog));

        cache.invalidate("key");
        assert!(cache.get("key").is_none());
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = MemoryCatalogCache::from_config(&CatalogConfig {
            cache_ttl: Some(Duration::from_millis(50)),
        });
        cache.set("key", Arc::new(IconCatalog::default()));
        assert!(cache.get("key").is_some());

        std::thread::sleep(Duration::from_millis(120));
        assert!(cache.get("key").is_none());
    }
}
