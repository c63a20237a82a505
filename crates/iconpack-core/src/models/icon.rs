//! The icon entry value object.

use super::pack::PackDefinition;
use crate::error::{IconPackError, Result};
use serde::Serialize;

/// Separator between pack id and icon id in a full id.
pub const FULL_ID_SEPARATOR: char = ':';

/// One icon in the catalog.
///
/// Entries are built by extractors and never change afterwards; a catalog
/// rebuild replaces them wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconEntry {
    pack_id: String,
    icon_id: String,
    full_id: String,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    label: String,
    pack_label: String,
    template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    library: Option<String>,
}

impl IconEntry {
    /// Create an entry for `icon_id` in `pack`.
    ///
    /// Fails when either id is empty or when the pack declares no template.
    pub fn new(
        pack: &PackDefinition,
        icon_id: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self> {
        let icon_id = icon_id.into();

        if pack.id.is_empty() {
            return Err(IconPackError::InvalidIcon {
                message: "empty pack id".to_string(),
            });
        }
        if icon_id.is_empty() {
            return Err(IconPackError::InvalidIcon {
                message: format!("empty icon id in pack '{}'", pack.id),
            });
        }

        let template = match pack.template.as_deref() {
            Some(template) if !template.trim().is_empty() => template.to_string(),
            _ => {
                return Err(IconPackError::config(
                    &pack.provider,
                    &pack.id,
                    "missing required 'template'",
                ))
            }
        };

        Ok(Self {
            full_id: format!("{}{}{}", pack.id, FULL_ID_SEPARATOR, icon_id),
            label: humanize_label(&icon_id),
            pack_id: pack.id.clone(),
            icon_id,
            source: source.into(),
            group: None,
            content: None,
            pack_label: pack.label.clone(),
            template,
            library: pack.library.clone(),
        })
    }

    /// Set the group; empty groups are treated as absent.
    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group.filter(|g| !g.is_empty());
        self
    }

    /// Attach an inline payload.
    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    /// Override the humanized label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn pack_id(&self) -> &str {
        &self.pack_id
    }

    pub fn icon_id(&self) -> &str {
        &self.icon_id
    }

    /// The catalog key, `pack_id:icon_id`.
    pub fn full_id(&self) -> &str {
        &self.full_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pack_label(&self) -> &str {
        &self.pack_label
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn library(&self) -> Option<&str> {
        self.library.as_deref()
    }
}

/// Split a full id on its first separator into `(pack_id, icon_id)`.
///
/// Returns `None` when there is no separator or either side is empty. Icon
/// ids may themselves contain the separator.
pub fn parse_full_id(full_id: &str) -> Option<(&str, &str)> {
    let (pack_id, icon_id) = full_id.split_once(FULL_ID_SEPARATOR)?;
    if pack_id.is_empty() || icon_id.is_empty() {
        return None;
    }
    Some((pack_id, icon_id))
}

/// Derive a display label from an icon id.
///
/// `-`, `_` and `.` become spaces and the first character is upper-cased:
/// `arrow-left_alt` → `Arrow left alt`.
pub fn humanize_label(icon_id: &str) -> String {
    let spaced: String = icon_id
        .chars()
        .map(|c| if matches!(c, '-' | '_' | '.') { ' ' } else { c })
        .collect();

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
