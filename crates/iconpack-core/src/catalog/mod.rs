//! The icon catalog and the manager that builds it.

mod manager;

pub use manager::{IconPackManager, IconPackManagerBuilder};

use crate::models::{IconEntry, PackDefinition};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Every enabled pack and every icon, as of one rebuild.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IconCatalog {
    /// Packs in load order.
    packs: Vec<PackDefinition>,
    /// Icons keyed by full id.
    icons: BTreeMap<String, IconEntry>,
    /// Icons per pack id.
    counts: BTreeMap<String, usize>,
    built_at: DateTime<Utc>,
}

impl IconCatalog {
    pub(crate) fn new(built_at: DateTime<Utc>) -> Self {
        Self {
            built_at,
            ..Default::default()
        }
    }

    /// Add a pack and its icons. A full id already present keeps its first
    /// entry.
    pub(crate) fn add_pack(&mut self, pack: PackDefinition, icons: Vec<IconEntry>) {
        let mut count = 0;
        for icon in icons {
            if self.icons.contains_key(icon.full_id()) {
                debug!("Icon '{}' already in the catalog, keeping the first", icon.full_id());
                continue;
            }
            self.icons.insert(icon.full_id().to_string(), icon);
            count += 1;
        }
        self.counts.insert(pack.id.clone(), count);
        self.packs.push(pack);
    }

    pub fn packs(&self) -> &[PackDefinition] {
        &self.packs
    }

    pub fn pack(&self, pack_id: &str) -> Option<&PackDefinition> {
        self.packs.iter().find(|p| p.id == pack_id)
    }

    pub fn icons(&self) -> &BTreeMap<String, IconEntry> {
        &self.icons
    }

    pub fn icon(&self, full_id: &str) -> Option<&IconEntry> {
        self.icons.get(full_id)
    }

    /// Number of icons a pack contributed; 0 for unknown packs.
    pub fn icon_count(&self, pack_id: &str) -> usize {
        self.counts.get(pack_id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Icons of the allowed packs, or all icons for `None`.
    pub fn icons_for(&self, allowed_pack_ids: Option<&[&str]>) -> BTreeMap<String, IconEntry> {
        self.icons
            .iter()
            .filter(|(_, icon)| allowed_pack_ids.map_or(true, |ids| ids.contains(&icon.pack_id())))
            .map(|(full_id, icon)| (full_id.clone(), icon.clone()))
            .collect()
    }
}
