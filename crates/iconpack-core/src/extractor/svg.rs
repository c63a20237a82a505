//! Standalone SVG files, inlined.

use super::{checked_sources, ExtractorContext, IconExtractor};
use crate::error::Result;
use crate::finder::FileRef;
use crate::models::{IconEntry, PackDefinition};
use crate::svg::SvgDocument;
use tracing::{debug, warn};

/// One entry per SVG file with the markup inside `<svg>` as content.
///
/// Sprite sheets are left to `SvgSpriteExtractor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgExtractor;

impl SvgExtractor {
    pub const ID: &'static str = "svg";
}

/// Read and parse a resolved SVG file, logging why when it cannot be used.
pub(super) fn load_svg(pack: &PackDefinition, file: &FileRef) -> Option<SvgDocument> {
    let Some(path) = file.absolute_path.as_deref() else {
        warn!(
            "Pack '{}': remote source {} cannot be inlined, skipping",
            pack.id, file.source
        );
        return None;
    };

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Pack '{}': failed to read {}: {}", pack.id, path.display(), e);
            return None;
        }
    };

    match SvgDocument::parse_bytes(&bytes) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!("Pack '{}': invalid SVG {}: {}", pack.id, path.display(), e);
            None
        }
    }
}

impl IconExtractor for SvgExtractor {
    fn id(&self) -> &str {
        Self::ID
    }

    fn discover_icons(
        &self,
        pack: &PackDefinition,
        context: &ExtractorContext<'_>,
    ) -> Result<Vec<IconEntry>> {
        let sources = checked_sources(pack)?;
        let mut icons = Vec::new();

        for file in context
            .finder
            .get_files_from_sources(sources, &pack.relative_path)
            .into_values()
        {
            let Some(document) = load_svg(pack, &file) else {
                continue;
            };
            if document.is_sprite() {
                debug!("Pack '{}': {} is a sprite, skipping", pack.id, file.source);
                continue;
            }

            let content = document.inner_markup().to_string();
            icons.push(
                IconEntry::new(pack, file.icon_id, file.source)?
                    .with_group(file.group)
                    .with_content(Some(content)),
            );
        }

        Ok(icons)
    }
}
