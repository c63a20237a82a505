//! Icon pack definition schema.
//!
//! Defines the structure of one pack entry in a `*.icons.yml` file, plus the
//! fields derived when the definition is loaded (provider and paths).

use crate::error::{IconPackError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Allowed pack id characters.
static PACK_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").unwrap());

/// Check a pack id against `^[a-z0-9_]+$`.
pub fn is_valid_pack_id(id: &str) -> bool {
    PACK_ID_PATTERN.is_match(id)
}

/// Extractor configuration block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackConfig {
    /// Source expressions, resolved in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    /// Leading entries to skip (font text formats only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Anything else, left for custom extractors.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A settings form fragment.
///
/// Only `default` is interpreted here; the rest belongs to the settings form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// License metadata of a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackLicense {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "gpl-compatible", default)]
    pub gpl_compatible: Option<bool>,
}

/// Complete icon pack definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackDefinition {
    /// Pack id, taken from the key in the definition file.
    #[serde(default)]
    pub id: String,
    /// Display label.
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Which extractor discovers this pack's icons.
    #[serde(rename = "extractor")]
    pub extractor_id: String,
    #[serde(default)]
    pub config: PackConfig,
    /// Settings form fields, in file order.
    #[serde(default, with = "ordered_settings")]
    pub settings: Vec<(String, SettingSchema)>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub library: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license: Option<PackLicense>,
    #[serde(default)]
    pub links: Vec<String>,
    /// Template used by pickers to preview an icon.
    #[serde(default)]
    pub preview: Option<String>,

    // Derived at load time.
    /// Module or theme that declared the pack.
    #[serde(default)]
    pub provider: String,
    /// Provider directory relative to the root, forward slashes, no leading `/`.
    #[serde(default)]
    pub relative_path: String,
    /// Provider directory on disk.
    #[serde(default)]
    pub absolute_path: PathBuf,
}

fn default_true() -> bool {
    true
}

impl PackDefinition {
    /// Build a definition from its raw declaration.
    ///
    /// `relative_path` is the provider directory relative to `root`.
    pub fn from_value(
        id: &str,
        provider: &str,
        relative_path: &str,
        root: &Path,
        value: Value,
    ) -> Result<Self> {
        let mut definition: PackDefinition = serde_json::from_value(value).map_err(|e| {
            IconPackError::config(provider, id, format!("invalid definition: {}", e))
        })?;

        let relative_path = relative_path.trim_matches('/').replace('\\', "/");
        definition.id = id.to_string();
        definition.provider = provider.to_string();
        definition.absolute_path = if relative_path.is_empty() {
            root.to_path_buf()
        } else {
            root.join(&relative_path)
        };
        definition.relative_path = relative_path;

        Ok(definition)
    }

    /// The configured sources, failing if they are absent or empty.
    pub fn require_sources(&self) -> Result<&[String]> {
        match self.config.sources.as_deref() {
            None => Err(IconPackError::config(
                &self.provider,
                &self.id,
                format!(
                    "missing 'config.sources' required by extractor '{}'",
                    self.extractor_id
                ),
            )),
            Some([]) => Err(IconPackError::config(
                &self.provider,
                &self.id,
                format!(
                    "empty 'config.sources' for extractor '{}'",
                    self.extractor_id
                ),
            )),
            Some(sources) => Ok(sources),
        }
    }

    /// The `default` of every declared setting.
    pub fn extractor_form_defaults(&self) -> Map<String, Value> {
        self.settings
            .iter()
            .filter_map(|(key, setting)| {
                setting
                    .default
                    .as_ref()
                    .map(|value| (key.clone(), value.clone()))
            })
            .collect()
    }

    /// Options label, `Label (count)` or `Label - description (count)`.
    pub fn option_label(&self, count: usize, with_description: bool) -> String {
        if with_description && !self.description.is_empty() {
            format!("{} - {} ({})", self.label, self.description, count)
        } else {
            format!("{} ({})", self.label, count)
        }
    }

    #[cfg(test)]
    pub(crate) fn for_test(id: &str, extractor: &str) -> Self {
        Self {
            id: id.to_string(),
            label: "Demo".to_string(),
            description: String::new(),
            enabled: true,
            extractor_id: extractor.to_string(),
            config: PackConfig::default(),
            settings: Vec::new(),
            template: Some("<img src=\"{{ source }}\">".to_string()),
            library: None,
            version: None,
            license: None,
            links: Vec::new(),
            preview: None,
            provider: "test_provider".to_string(),
            relative_path: "modules/test_provider".to_string(),
            absolute_path: PathBuf::from("/srv/www/modules/test_provider"),
        }
    }
}

/// `settings` is a mapping in the definition file; the order of its keys is
/// the order of the settings form.
mod ordered_settings {
    use super::SettingSchema;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::{Map, Value};

    pub fn serialize<S>(
        settings: &[(String, SettingSchema)],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(settings.iter().map(|(key, setting)| (key, setting)))
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Vec<(String, SettingSchema)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, value)| {
                serde_json::from_value(value)
                    .map(|setting| (key.clone(), setting))
                    .map_err(|e| D::Error::custom(format!("setting '{}': {}", key, e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pack_id_validation() {
        assert!(is_valid_pack_id("material_symbols_2"));
        assert!(!is_valid_pack_id("Material"));
        assert!(!is_valid_pack_id("my-pack"));
        assert!(!is_valid_pack_id(""));
    }

    #[test]
    fn test_from_value_derives_paths() {
        let value = json!({
            "label": "Brand",
            "extractor": "svg",
            "config": {"sources": ["icons/{icon_id}.svg"], "custom": 3},
            "template": "{{ content }}",
            "license": {"name": "MIT", "gpl-compatible": true}
        });
        let pack =
            PackDefinition::from_value("brand", "my_theme", "/themes/my_theme/", Path::new("/srv"), value)
                .unwrap();

        assert_eq!(pack.id, "brand");
        assert_eq!(pack.provider, "my_theme");
        assert_eq!(pack.relative_path, "themes/my_theme");
        assert_eq!(pack.absolute_path, PathBuf::from("/srv/themes/my_theme"));
        assert!(pack.enabled);
        assert_eq!(pack.config.extra.get("custom"), Some(&json!(3)));
        assert_eq!(pack.license.unwrap().gpl_compatible, Some(true));
    }

    #[test]
    fn test_from_value_reports_bad_shape() {
        let err = PackDefinition::from_value(
            "brand",
            "my_theme",
            "themes/my_theme",
            Path::new("/srv"),
            json!({"extractor": "svg"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("my_theme pack 'brand'"));
        assert!(err.to_string().contains("label"));
    }

    #[test]
    fn test_require_sources() {
        let mut pack = PackDefinition::for_test("demo", "svg");
        let err = pack.require_sources().unwrap_err();
        assert!(err.to_string().contains("missing 'config.sources'"));

        pack.config.sources = Some(vec![]);
        let err = pack.require_sources().unwrap_err();
        assert!(err.to_string().contains("empty 'config.sources'"));

        pack.config.sources = Some(vec!["icons/*.svg".into()]);
        assert_eq!(pack.require_sources().unwrap().len(), 1);
    }

    #[test]
    fn test_extractor_form_defaults() {
        let mut pack = PackDefinition::for_test("demo", "svg");
        pack.settings.push((
            "size".into(),
            SettingSchema {
                title: Some("Size".into()),
                kind: Some("integer".into()),
                default: Some(json!(24)),
                ..Default::default()
            },
        ));
        pack.settings.push((
            "color".into(),
            SettingSchema {
                title: Some("Color".into()),
                ..Default::default()
            },
        ));

        let defaults = pack.extractor_form_defaults();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults.get("size"), Some(&json!(24)));
    }

    #[test]
    fn test_settings_keep_file_order() {
        let pack: PackDefinition = serde_json::from_value(json!({
            "label": "Demo",
            "extractor": "svg",
            "settings": {
                "size": {"type": "integer", "default": 24},
                "color": {"type": "string", "default": "currentColor"},
                "align": {"type": "string", "default": "middle"}
            }
        }))
        .unwrap();

        let defaults = pack.extractor_form_defaults();
        assert_eq!(defaults.keys().collect::<Vec<_>>(), vec!["size", "color", "align"]);

        let value = serde_json::to_value(&pack).unwrap();
        let keys: Vec<_> = value["settings"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["size", "color", "align"]);
    }

    #[test]
    fn test_option_label() {
        let mut pack = PackDefinition::for_test("demo", "svg");
        assert_eq!(pack.option_label(3, true), "Demo (3)");
        pack.description = "Brand icons".into();
        assert_eq!(pack.option_label(3, true), "Demo - Brand icons (3)");
        assert_eq!(pack.option_label(3, false), "Demo (3)");
    }
}
