//! Image files used as-is.

use super::{checked_sources, ExtractorContext, IconExtractor};
use crate::error::Result;
use crate::models::{IconEntry, PackDefinition};

/// One entry per resolved file, local or remote. Files are never opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathExtractor;

impl PathExtractor {
    pub const ID: &'static str = "path";
}

impl IconExtractor for PathExtractor {
    fn id(&self) -> &str {
        Self::ID
    }

    fn discover_icons(
        &self,
        pack: &PackDefinition,
        context: &ExtractorContext<'_>,
    ) -> Result<Vec<IconEntry>> {
        let sources = checked_sources(pack)?;
        context
            .finder
            .get_files_from_sources(sources, &pack.relative_path)
            .into_values()
            .map(|file| Ok(IconEntry::new(pack, file.icon_id, file.source)?.with_group(file.group)))
            .collect()
    }
}
