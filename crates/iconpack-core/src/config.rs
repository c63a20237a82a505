//! Centralized configuration for icon pack discovery.
//!
//! Constants for source resolution, font parsing and catalog building.

use std::time::Duration;

/// Source expression resolution.
pub struct FinderConfig;

impl FinderConfig {
    pub const ICON_ID_PLACEHOLDER: &'static str = "{icon_id}";
    pub const GROUP_PLACEHOLDER: &'static str = "{group}";

    /// Extensions an image based pack may expose.
    pub const ALLOWED_EXTENSIONS: &'static [&'static str] = &["svg", "png", "gif"];

    /// Schemes accepted for remote sources.
    pub const REMOTE_SCHEMES: &'static [&'static str] = &["http", "https"];
}

/// Font based extraction.
pub struct FontConfig;

impl FontConfig {
    /// Extensions the font extractor accepts as sources.
    pub const ALLOWED_EXTENSIONS: &'static [&'static str] =
        &["codepoints", "json", "yml", "yaml", "ttf", "otf", "woff"];

    /// Font files above this size are rejected before parsing (32MB).
    pub const MAX_FONT_FILE_BYTES: u64 = 33_554_432;
}

/// Catalog building and pack discovery.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// TTL for the in-memory catalog cache, `None` keeps it until invalidated.
    pub cache_ttl: Option<Duration>,
}

impl CatalogConfig {
    /// Cache key under which the built catalog is stored.
    pub const CACHE_KEY: &'static str = "icon_pack:catalog";

    /// Suffix of pack definition files; the provider name is the prefix.
    pub const DEFINITION_SUFFIX: &'static str = ".icons.yml";

    /// How deep discovery walks below a search directory.
    pub const DISCOVERY_MAX_DEPTH: usize = 3;

    /// Upper bound on cached catalogs (one per manager key in practice).
    pub const CACHE_MAX_CAPACITY: u64 = 16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_lists_are_lowercase() {
        for ext in FinderConfig::ALLOWED_EXTENSIONS
            .iter()
            .chain(FontConfig::ALLOWED_EXTENSIONS)
        {
            assert_eq!(*ext, ext.to_lowercase());
        }
    }

    #[test]
    fn test_default_cache_has_no_ttl() {
        assert!(CatalogConfig::default().cache_ttl.is_none());
    }
}
