//! Icon extractors.
//!
//! An extractor turns one pack definition into its icon entries. The built-in
//! ones cover image directories (`path`), standalone SVG files (`svg`), SVG
//! sprite sheets (`svg_sprite`) and icon fonts (`font`). Custom extractors are
//! registered into the same `ExtractorRegistry` under their own id.

mod font;
mod path;
mod svg;
mod svg_sprite;

pub use font::FontExtractor;
pub use path::PathExtractor;
pub use svg::SvgExtractor;
pub use svg_sprite::SvgSpriteExtractor;

use crate::error::{IconPackError, Result};
use crate::finder::{is_remote_source, IconFinder};
use crate::models::{IconEntry, PackDefinition};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared services handed to every extractor run.
#[derive(Debug, Clone, Copy)]
pub struct ExtractorContext<'a> {
    pub finder: &'a IconFinder,
}

/// Produces the icon entries of a pack.
pub trait IconExtractor: Send + Sync {
    /// Id packs use to select this extractor.
    fn id(&self) -> &str;

    /// Discover every icon of `pack`.
    ///
    /// Configuration problems are errors; unreadable or malformed individual
    /// files are logged and skipped.
    fn discover_icons(
        &self,
        pack: &PackDefinition,
        context: &ExtractorContext<'_>,
    ) -> Result<Vec<IconEntry>>;
}

type ExtractorFactory = Arc<dyn Fn() -> Box<dyn IconExtractor> + Send + Sync>;

/// Extractor factories keyed by extractor id.
#[derive(Clone)]
pub struct ExtractorRegistry {
    factories: BTreeMap<String, ExtractorFactory>,
}

impl ExtractorRegistry {
    /// A registry with no extractors at all.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in extractors.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(PathExtractor::ID, || Box::new(PathExtractor));
        registry.register(SvgExtractor::ID, || Box::new(SvgExtractor));
        registry.register(SvgSpriteExtractor::ID, || Box::new(SvgSpriteExtractor));
        registry.register(FontExtractor::ID, || Box::new(FontExtractor));
        registry
    }

    /// Register a factory; an existing id is replaced.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn IconExtractor> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
    }

    /// Instantiate the extractor registered under `id`.
    pub fn create(&self, id: &str) -> Option<Box<dyn IconExtractor>> {
        self.factories.get(id).map(|factory| factory())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

/// Sources of a file-based pack, checked before anything is scanned.
///
/// Sources must be present and non-empty, and a relative source needs a pack
/// with a base path to resolve against.
pub(crate) fn checked_sources(pack: &PackDefinition) -> Result<&[String]> {
    let sources = pack.require_sources()?;
    if pack.relative_path.is_empty() {
        if let Some(relative) = sources
            .iter()
            .find(|s| !s.starts_with('/') && !is_remote_source(s))
        {
            return Err(IconPackError::config(
                &pack.provider,
                &pack.id,
                format!(
                    "source '{}' is relative but the pack has no base path",
                    relative
                ),
            ));
        }
    }
    Ok(sources)
}
