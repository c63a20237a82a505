//! Icon pack catalog.
//!
//! Builds one catalog of icons, keyed by `pack_id:icon_id`, from declarative
//! pack definitions. A pack points its extractor at image directories, SVG
//! files, SVG sprite sheets or icon fonts; the catalog is built once and
//! cached until invalidated.
//!
//! # Example
//!
//! ```rust,ignore
//! use iconpack_core::{IconPackManager, YamlPackDiscovery};
//!
//! fn main() -> iconpack_core::Result<()> {
//!     let manager = IconPackManager::builder("/srv/www")
//!         .with_source(YamlPackDiscovery::new().with_scan_dir("modules"))
//!         .build()?;
//!
//!     for (pack_id, label) in manager.list_pack_options(true)? {
//!         println!("{pack_id}: {label}");
//!     }
//!
//!     if let Some(icon) = manager.get_icon("material:home")? {
//!         println!("{}", icon.source());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractor;
pub mod finder;
pub mod font;
pub mod models;
pub mod packs;
pub mod svg;

// Re-export commonly used types
pub use cache::{CatalogCache, MemoryCatalogCache};
pub use catalog::{IconCatalog, IconPackManager, IconPackManagerBuilder};
pub use config::{CatalogConfig, FinderConfig, FontConfig};
pub use error::{IconPackError, Result};
pub use extractor::{
    ExtractorContext, ExtractorRegistry, FontExtractor, IconExtractor, PathExtractor,
    SvgExtractor, SvgSpriteExtractor,
};
pub use finder::{FileRef, IconFinder};
pub use font::{parse_font, FontError, FontInfo};
pub use models::{parse_full_id, IconEntry, PackDefinition, PackLicense, SettingSchema};
pub use packs::{
    JsonSchemaValidator, PackDefinitionSource, PackValidator, RawPackDefinition,
    YamlPackDiscovery,
};
pub use svg::{SvgDocument, SvgParseError};
