//! SVG sprite sheets.

use super::svg::load_svg;
use super::{checked_sources, ExtractorContext, IconExtractor};
use crate::config::FinderConfig;
use crate::error::Result;
use crate::models::{IconEntry, PackDefinition};
use std::collections::HashSet;
use tracing::debug;

/// One entry per `<symbol id="...">`, pointing at the sprite file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgSpriteExtractor;

impl SvgSpriteExtractor {
    pub const ID: &'static str = "svg_sprite";
}

impl IconExtractor for SvgSpriteExtractor {
    fn id(&self) -> &str {
        Self::ID
    }

    fn discover_icons(
        &self,
        pack: &PackDefinition,
        context: &ExtractorContext<'_>,
    ) -> Result<Vec<IconEntry>> {
        let sources = checked_sources(pack)?;
        let mut seen = HashSet::new();
        let mut icons = Vec::new();

        // Sheets are not keyed by file name: two groups may each hold an
        // `icons.svg`.
        let files = sources.iter().flat_map(|source| {
            context.finder.resolve_source(
                source,
                &pack.relative_path,
                FinderConfig::ALLOWED_EXTENSIONS,
            )
        });
        for file in files {
            let Some(document) = load_svg(pack, &file) else {
                continue;
            };
            if !document.is_sprite() {
                debug!("Pack '{}': {} has no symbols, skipping", pack.id, file.source);
                continue;
            }

            for symbol_id in document.symbol_ids() {
                if !seen.insert(symbol_id.clone()) {
                    debug!(
                        "Pack '{}': symbol '{}' in {} already found, keeping the first",
                        pack.id, symbol_id, file.source
                    );
                    continue;
                }
                icons.push(
                    IconEntry::new(pack, symbol_id.as_str(), file.source.as_str())?
                        .with_group(file.group.clone()),
                );
            }
        }

        Ok(icons)
    }
}
