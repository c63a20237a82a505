//! Catalog building and queries.

use super::IconCatalog;
use crate::cache::{CatalogCache, MemoryCatalogCache};
use crate::config::CatalogConfig;
use crate::error::{IconPackError, Result};
use crate::extractor::{ExtractorContext, ExtractorRegistry, IconExtractor};
use crate::finder::IconFinder;
use crate::models::{is_valid_pack_id, IconEntry, PackDefinition};
use crate::packs::{JsonSchemaValidator, PackDefinitionSource, PackValidator, YamlPackDiscovery};
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Builds the icon catalog and answers queries against it.
///
/// The catalog is built lazily on first use and kept in the cache until
/// [`clear_cached_definitions`](Self::clear_cached_definitions) is called.
///
/// # Example
///
/// ```rust,ignore
/// use iconpack_core::IconPackManager;
///
/// let manager = IconPackManager::builder("/srv/www").build()?;
/// for (full_id, icon) in manager.get_icons(Some(&["material"]))? {
///     println!("{} -> {}", full_id, icon.source());
/// }
/// ```
pub struct IconPackManager {
    root: PathBuf,
    finder: IconFinder,
    source: Box<dyn PackDefinitionSource>,
    validator: Option<Box<dyn PackValidator>>,
    registry: ExtractorRegistry,
    cache: Arc<dyn CatalogCache>,
}

impl IconPackManager {
    /// Start configuring a manager for the web root `root`.
    pub fn builder(root: impl Into<PathBuf>) -> IconPackManagerBuilder {
        IconPackManagerBuilder::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The current catalog, rebuilt if the cache holds none.
    ///
    /// Any error aborts the rebuild and nothing is cached.
    pub fn get_catalog(&self) -> Result<Arc<IconCatalog>> {
        if let Some(catalog) = self.cache.get(CatalogConfig::CACHE_KEY) {
            return Ok(catalog);
        }
        let catalog = Arc::new(self.build_catalog()?);
        self.cache.set(CatalogConfig::CACHE_KEY, catalog.clone());
        Ok(catalog)
    }

    /// Icons of the allowed packs (all packs for `None`), keyed by full id.
    pub fn get_icons(
        &self,
        allowed_pack_ids: Option<&[&str]>,
    ) -> Result<BTreeMap<String, IconEntry>> {
        Ok(self.get_catalog()?.icons_for(allowed_pack_ids))
    }

    /// Look up a single icon by `pack_id:icon_id`.
    pub fn get_icon(&self, full_id: &str) -> Result<Option<IconEntry>> {
        Ok(self.get_catalog()?.icon(full_id).cloned())
    }

    /// Pack id to option label for every pack that has icons.
    pub fn list_pack_options(&self, with_description: bool) -> Result<BTreeMap<String, String>> {
        let catalog = self.get_catalog()?;
        Ok(catalog
            .packs()
            .iter()
            .filter_map(|pack| {
                let count = catalog.icon_count(&pack.id);
                (count > 0).then(|| (pack.id.clone(), pack.option_label(count, with_description)))
            })
            .collect())
    }

    /// Default values of a pack's settings; empty for unknown packs.
    pub fn get_extractor_form_defaults(&self, pack_id: &str) -> Result<Map<String, Value>> {
        Ok(self
            .get_catalog()?
            .pack(pack_id)
            .map(PackDefinition::extractor_form_defaults)
            .unwrap_or_default())
    }

    /// Every enabled pack definition, in load order.
    pub fn get_definitions(&self) -> Result<Vec<PackDefinition>> {
        Ok(self.get_catalog()?.packs().to_vec())
    }

    pub fn get_definition(&self, pack_id: &str) -> Result<Option<PackDefinition>> {
        Ok(self.get_catalog()?.pack(pack_id).cloned())
    }

    /// Drop the cached catalog; the next query rebuilds it.
    pub fn clear_cached_definitions(&self) {
        debug!("Invalidating cached icon catalog");
        self.cache.invalidate(CatalogConfig::CACHE_KEY);
    }

    fn build_catalog(&self) -> Result<IconCatalog> {
        let raw_definitions = self.source.load(&self.root)?;
        let context = ExtractorContext {
            finder: &self.finder,
        };
        let mut catalog = IconCatalog::new(Utc::now());

        for raw in raw_definitions {
            if !is_valid_pack_id(&raw.id) {
                return Err(IconPackError::InvalidPackId {
                    provider: raw.provider,
                    pack_id: raw.id,
                });
            }
            if raw.definition.get("enabled") == Some(&Value::Bool(false)) {
                debug!("Icon pack '{}' from {} is disabled", raw.id, raw.provider);
                continue;
            }
            if let Some(validator) = &self.validator {
                validator.validate(&raw.provider, &raw.id, &raw.definition)?;
            }

            let pack = PackDefinition::from_value(
                &raw.id,
                &raw.provider,
                &raw.relative_path,
                &self.root,
                raw.definition,
            )?;
            if !pack.enabled {
                continue;
            }

            let extractor = self.extractor_for(&pack)?;
            let icons = extractor.discover_icons(&pack, &context)?;
            debug!(
                "Icon pack '{}' ({}) produced {} icons",
                pack.id,
                extractor.id(),
                icons.len()
            );
            catalog.add_pack(pack, icons);
        }

        info!(
            "Built icon catalog: {} packs, {} icons",
            catalog.packs().len(),
            catalog.len()
        );
        Ok(catalog)
    }

    fn extractor_for(&self, pack: &PackDefinition) -> Result<Box<dyn IconExtractor>> {
        self.registry
            .create(&pack.extractor_id)
            .ok_or_else(|| IconPackError::UnknownExtractor {
                pack_id: pack.id.clone(),
                extractor: pack.extractor_id.clone(),
            })
    }
}

impl std::fmt::Debug for IconPackManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconPackManager")
            .field("root", &self.root)
            .field("registry", &self.registry)
            .field("validation", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

enum ValidatorChoice {
    Bundled,
    Custom(Box<dyn PackValidator>),
    Disabled,
}

/// Configures an [`IconPackManager`].
///
/// Defaults: definitions discovered by scanning the root for
/// `*.icons.yml`, validation against the bundled schema, the built-in
/// extractors and an in-memory cache without expiry.
pub struct IconPackManagerBuilder {
    root: PathBuf,
    source: Option<Box<dyn PackDefinitionSource>>,
    validator: ValidatorChoice,
    registry: ExtractorRegistry,
    cache: Option<Arc<dyn CatalogCache>>,
    config: CatalogConfig,
}

impl IconPackManagerBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source: None,
            validator: ValidatorChoice::Bundled,
            registry: ExtractorRegistry::new(),
            cache: None,
            config: CatalogConfig::default(),
        }
    }

    /// Where pack definitions come from.
    pub fn with_source(mut self, source: impl PackDefinitionSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Replace the bundled schema validator.
    pub fn with_validator(mut self, validator: impl PackValidator + 'static) -> Self {
        self.validator = ValidatorChoice::Custom(Box::new(validator));
        self
    }

    /// Skip schema validation entirely.
    pub fn without_validation(mut self) -> Self {
        self.validator = ValidatorChoice::Disabled;
        self
    }

    /// Use a shared or custom cache backend.
    pub fn with_cache(mut self, cache: Arc<dyn CatalogCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Settings for the default in-memory cache.
    pub fn with_config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a custom extractor, or replace a built-in one.
    pub fn with_extractor<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn IconExtractor> + Send + Sync + 'static,
    {
        self.registry.register(id, factory);
        self
    }

    pub fn build(self) -> Result<IconPackManager> {
        let validator: Option<Box<dyn PackValidator>> = match self.validator {
            ValidatorChoice::Bundled => Some(Box::new(JsonSchemaValidator::new()?)),
            ValidatorChoice::Custom(validator) => Some(validator),
            ValidatorChoice::Disabled => None,
        };
        let source = self
            .source
            .unwrap_or_else(|| Box::new(YamlPackDiscovery::new().with_scan_dir("")));
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCatalogCache::from_config(&self.config)));

        Ok(IconPackManager {
            finder: IconFinder::new(&self.root),
            root: self.root,
            source,
            validator,
            registry: self.registry,
            cache,
        })
    }
}
