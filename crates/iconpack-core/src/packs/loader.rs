//! Pack definition discovery.
//!
//! Every provider (a module or theme directory) may ship one
//! `<provider>.icons.yml` file declaring any number of packs, keyed by pack
//! id. Providers are registered explicitly or found by walking search
//! directories.

use crate::config::CatalogConfig;
use crate::error::{IconPackError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A pack declaration as read from disk, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPackDefinition {
    pub id: String,
    pub provider: String,
    /// Provider directory relative to the root.
    pub relative_path: String,
    pub definition: Value,
}

impl RawPackDefinition {
    pub fn new(
        id: impl Into<String>,
        provider: impl Into<String>,
        relative_path: impl Into<String>,
        definition: Value,
    ) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            relative_path: relative_path.into(),
            definition,
        }
    }
}

/// Where raw pack declarations come from.
pub trait PackDefinitionSource: Send + Sync {
    /// Load every declaration, in a stable order.
    fn load(&self, root: &Path) -> Result<Vec<RawPackDefinition>>;
}

/// Declarations supplied directly, mostly for tests and embedding.
impl PackDefinitionSource for Vec<RawPackDefinition> {
    fn load(&self, _root: &Path) -> Result<Vec<RawPackDefinition>> {
        Ok(self.clone())
    }
}

/// Reads `<provider>.icons.yml` files.
#[derive(Debug, Clone)]
pub struct YamlPackDiscovery {
    providers: Vec<(String, PathBuf)>,
    scan_dirs: Vec<PathBuf>,
    max_depth: usize,
}

impl Default for YamlPackDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl YamlPackDiscovery {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            scan_dirs: Vec::new(),
            max_depth: CatalogConfig::DISCOVERY_MAX_DEPTH,
        }
    }

    /// Register a provider directory; relative directories resolve against
    /// the root.
    pub fn with_provider(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.providers.push((name.into(), dir.into()));
        self
    }

    /// Search a directory for definition files.
    pub fn with_scan_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scan_dirs.push(dir.into());
        self
    }

    /// How deep below a search directory definition files are looked for.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Provider name to definition file, sorted by provider name.
    fn definition_files(&self, root: &Path) -> BTreeMap<String, PathBuf> {
        let mut files = BTreeMap::new();

        for (name, dir) in &self.providers {
            let file = root
                .join(dir)
                .join(format!("{}{}", name, CatalogConfig::DEFINITION_SUFFIX));
            if !file.is_file() {
                debug!("Provider '{}' has no {}", name, file.display());
                continue;
            }
            files.entry(name.clone()).or_insert(file);
        }

        for dir in &self.scan_dirs {
            let dir = root.join(dir);
            if !dir.is_dir() {
                warn!("Pack search directory {} does not exist", dir.display());
                continue;
            }
            for entry in WalkDir::new(&dir)
                .max_depth(self.max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let file_name = entry.file_name().to_string_lossy().into_owned();
                let Some(provider) = file_name.strip_suffix(CatalogConfig::DEFINITION_SUFFIX)
                else {
                    continue;
                };
                if provider.is_empty() {
                    continue;
                }
                if let Some(existing) = files.get(provider) {
                    warn!(
                        "Provider '{}' found again at {}, keeping {}",
                        provider,
                        entry.path().display(),
                        existing.display()
                    );
                    continue;
                }
                files.insert(provider.to_string(), entry.into_path());
            }
        }

        files
    }

    fn load_file(&self, root: &Path, provider: &str, file: &Path) -> Result<Vec<RawPackDefinition>> {
        let content =
            std::fs::read_to_string(file).map_err(|e| IconPackError::io_with_path(e, file))?;
        let document: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| IconPackError::Yaml {
                message: format!("Failed to parse {}: {}", file.display(), e),
                source: Some(e),
            })?;

        let mapping = match document {
            serde_yaml::Value::Mapping(mapping) => mapping,
            serde_yaml::Value::Null => return Ok(Vec::new()),
            _ => {
                return Err(IconPackError::Yaml {
                    message: format!("{} must be a mapping of pack ids", file.display()),
                    source: None,
                })
            }
        };

        let relative_path = provider_relative_path(root, file);
        let mut packs = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Some(id) = key.as_str() else {
                return Err(IconPackError::Yaml {
                    message: format!("{}: pack id {:?} is not a string", file.display(), key),
                    source: None,
                });
            };
            let definition = serde_json::to_value(&value).map_err(|e| {
                IconPackError::config(provider, id, format!("unsupported YAML value: {}", e))
            })?;
            packs.push(RawPackDefinition::new(
                id,
                provider,
                relative_path.clone(),
                definition,
            ));
        }
        Ok(packs)
    }
}

impl PackDefinitionSource for YamlPackDiscovery {
    fn load(&self, root: &Path) -> Result<Vec<RawPackDefinition>> {
        let mut packs: Vec<RawPackDefinition> = Vec::new();
        let mut owners: BTreeMap<String, String> = BTreeMap::new();

        for (provider, file) in self.definition_files(root) {
            let loaded = self.load_file(root, &provider, &file)?;
            debug!("Loaded {} pack definitions from {}", loaded.len(), file.display());

            for pack in loaded {
                if let Some(owner) = owners.get(&pack.id) {
                    return Err(IconPackError::config(
                        &pack.provider,
                        &pack.id,
                        format!("pack id already declared by provider '{}'", owner),
                    ));
                }
                owners.insert(pack.id.clone(), pack.provider.clone());
                packs.push(pack);
            }
        }

        info!("Discovered {} icon pack definitions", packs.len());
        Ok(packs)
    }
}

/// Directory of a definition file relative to the root, forward slashes.
fn provider_relative_path(root: &Path, file: &Path) -> String {
    let dir = file.parent().unwrap_or(root);
    match dir.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => {
            warn!(
                "Definition file {} is outside the root {}",
                file.display(),
                root.display()
            );
            String::new()
        }
    }
}
