//! Catalog caching.
//!
//! Building the catalog scans the file system and parses fonts, so the result
//! is kept behind the `CatalogCache` port until explicitly invalidated. The
//! bundled backend is an in-process `mini-moka` cache; other backends (shared
//! memory, an external store) implement the same trait.

mod memory;
mod traits;

pub use memory::MemoryCatalogCache;
pub use traits::CatalogCache;
