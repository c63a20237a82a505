//! Catalog cache port.

use crate::catalog::IconCatalog;
use std::sync::Arc;

/// Storage for built catalogs.
///
/// Implementations must be safe to share across threads. A backend that
/// loses entries (eviction, expiry) only causes a rebuild on the next read.
pub trait CatalogCache: Send + Sync {
    /// Get a cached catalog by key.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    fn get(&self, key: &str) -> Option<Arc<IconCatalog>>;

    /// Store a catalog, replacing any existing entry with the same key.
    fn set(&self, key: &str, catalog: Arc<IconCatalog>);

    /// Invalidate (delete) a specific key.
    fn invalidate(&self, key: &str);
}
