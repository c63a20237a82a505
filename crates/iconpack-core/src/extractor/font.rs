//! Icon fonts.
//!
//! A font pack lists its glyphs in one of several formats, picked by file
//! extension:
//!
//! - `codepoints`: one `name codepoint` pair per line (Material Icons style)
//! - `json`: an object of `name: content`
//! - `yml` / `yaml`: a mapping of `name: content`
//! - `ttf` / `otf` / `woff`: the font itself, read through `crate::font`
//!
//! Entries from every source are merged in order (first id wins) before
//! `config.offset` leading entries are dropped.

use super::{checked_sources, ExtractorContext, IconExtractor};
use crate::config::FontConfig;
use crate::error::{IconPackError, Result};
use crate::finder::FileRef;
use crate::font::{parse_font, FontError};
use crate::models::{IconEntry, PackDefinition};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Glyph listing formats, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontFormat {
    Codepoints,
    Json,
    Yaml,
    Binary,
}

impl FontFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "codepoints" => Some(Self::Codepoints),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            "ttf" | "otf" | "woff" => Some(Self::Binary),
            _ => None,
        }
    }
}

/// An icon as listed by a font source, before it becomes an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Glyph {
    id: String,
    content: Option<String>,
    source: String,
}

/// Glyph listings and font files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontExtractor;

impl FontExtractor {
    pub const ID: &'static str = "font";
}

impl IconExtractor for FontExtractor {
    fn id(&self) -> &str {
        Self::ID
    }

    fn discover_icons(
        &self,
        pack: &PackDefinition,
        context: &ExtractorContext<'_>,
    ) -> Result<Vec<IconEntry>> {
        let sources = checked_sources(pack)?;

        let mut glyphs = Vec::new();
        for source in sources {
            for file in context.finder.resolve_source(
                source,
                &pack.relative_path,
                FontConfig::ALLOWED_EXTENSIONS,
            ) {
                glyphs.extend(read_glyphs(pack, &file)?);
            }
        }

        let mut seen = HashSet::new();
        glyphs.retain(|glyph| {
            let first = seen.insert(glyph.id.clone());
            if !first {
                debug!("Pack '{}': glyph '{}' listed twice, keeping the first", pack.id, glyph.id);
            }
            first
        });

        let offset = pack.config.offset.unwrap_or(0);
        glyphs
            .into_iter()
            .skip(offset)
            .map(|glyph| {
                Ok(IconEntry::new(pack, glyph.id, glyph.source)?.with_content(glyph.content))
            })
            .collect()
    }
}

fn read_glyphs(pack: &PackDefinition, file: &FileRef) -> Result<Vec<Glyph>> {
    let Some(path) = file.absolute_path.as_deref() else {
        warn!(
            "Pack '{}': remote font source {} is not supported, skipping",
            pack.id, file.source
        );
        return Ok(Vec::new());
    };
    let Some(format) = FontFormat::from_path(path) else {
        warn!("Pack '{}': {} is not a font listing, skipping", pack.id, path.display());
        return Ok(Vec::new());
    };

    let glyph = |(id, content): (String, Option<String>)| Glyph {
        id,
        content,
        source: file.source.clone(),
    };

    let entries = match format {
        FontFormat::Codepoints => parse_codepoints(&read_text(path)?),
        FontFormat::Json => parse_json_map(pack, path, &read_text(path)?)?,
        FontFormat::Yaml => parse_yaml_map(pack, path, &read_text(path)?)?,
        FontFormat::Binary => read_binary_font(path)?,
    };
    Ok(entries.into_iter().map(glyph).collect())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| IconPackError::io_with_path(e, path))
}

/// `name [content]` per line; blank lines and `#` comments are ignored.
fn parse_codepoints(text: &str) -> Vec<(String, Option<String>)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.split_once(char::is_whitespace) {
            Some((id, rest)) => {
                let rest = rest.trim();
                (id.to_string(), (!rest.is_empty()).then(|| rest.to_string()))
            }
            None => (line.to_string(), None),
        })
        .collect()
}

fn parse_json_map(
    pack: &PackDefinition,
    path: &Path,
    text: &str,
) -> Result<Vec<(String, Option<String>)>> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        IconPackError::config(
            &pack.provider,
            &pack.id,
            format!("invalid JSON in {}: {}", path.display(), e),
        )
    })?;
    let serde_json::Value::Object(map) = value else {
        return Err(IconPackError::config(
            &pack.provider,
            &pack.id,
            format!("{} must contain a JSON object", path.display()),
        ));
    };

    Ok(map
        .into_iter()
        .map(|(id, value)| {
            let content = match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s),
                other => Some(other.to_string()),
            };
            (id, content)
        })
        .collect())
}

fn parse_yaml_map(
    pack: &PackDefinition,
    path: &Path,
    text: &str,
) -> Result<Vec<(String, Option<String>)>> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| {
        IconPackError::config(
            &pack.provider,
            &pack.id,
            format!("invalid YAML in {}: {}", path.display(), e),
        )
    })?;
    let map = match value {
        serde_yaml::Value::Mapping(map) => map,
        serde_yaml::Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(IconPackError::config(
                &pack.provider,
                &pack.id,
                format!("{} must contain a YAML mapping", path.display()),
            ))
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let Some(id) = yaml_scalar(&key) else {
            warn!("{}: ignoring non-scalar key {:?}", path.display(), key);
            continue;
        };
        let content = match &value {
            serde_yaml::Value::Null => None,
            scalar @ (serde_yaml::Value::String(_)
            | serde_yaml::Value::Number(_)
            | serde_yaml::Value::Bool(_)) => yaml_scalar(scalar),
            other => serde_json::to_string(other).ok(),
        };
        entries.push((id, content));
    }
    Ok(entries)
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Ids are glyph names when the font has them, else the hex codepoint.
fn read_binary_font(path: &Path) -> Result<Vec<(String, Option<String>)>> {
    let font_error = |source: FontError| IconPackError::Font {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path)
        .map_err(|e| IconPackError::io_with_path(e, path))?
        .len();
    if size > FontConfig::MAX_FONT_FILE_BYTES {
        return Err(font_error(FontError::TooLarge {
            size,
            limit: FontConfig::MAX_FONT_FILE_BYTES,
        }));
    }

    let bytes = std::fs::read(path).map_err(|e| IconPackError::io_with_path(e, path))?;
    let font = parse_font(&bytes).map_err(font_error)?;
    info!(
        "Read font '{}' from {}: {} codepoints",
        font.postscript_name,
        path.display(),
        font.codepoints.len()
    );

    Ok(font
        .codepoints
        .iter()
        .map(|(&codepoint, &glyph_id)| {
            let id = font
                .glyph_name(glyph_id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{:04x}", codepoint));
            let content = char::from_u32(codepoint).map(String::from);
            (id, content)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::IconFinder;
    use crate::font::testing::TestFont;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        pack: PackDefinition,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            fs::create_dir_all(temp.path().join("modules/test_provider/fonts")).unwrap();
            let mut pack = PackDefinition::for_test("demo", "font");
            pack.template = Some("<i>{{ content }}</i>".into());
            Self { temp, pack }
        }

        fn write(&self, name: &str, contents: impl AsRef<[u8]>) {
            fs::write(
                self.temp.path().join("modules/test_provider/fonts").join(name),
                contents,
            )
            .unwrap();
        }

        fn discover(&mut self, sources: &[&str]) -> Result<Vec<IconEntry>> {
            self.pack.config.sources = Some(sources.iter().map(|s| s.to_string()).collect());
            let finder = IconFinder::new(self.temp.path());
            FontExtractor.discover_icons(&self.pack, &ExtractorContext { finder: &finder })
        }
    }

    fn ids(icons: &[IconEntry]) -> Vec<&str> {
        icons.iter().map(|i| i.icon_id()).collect()
    }

    #[test]
    fn test_codepoints_file() {
        let mut fixture = Fixture::new();
        fixture.write(
            "icons.codepoints",
            "# Material icons\n\n10k e951\nhome e88a\n  lonely  \n",
        );
        let icons = fixture.discover(&["fonts/icons.codepoints"]).unwrap();

        assert_eq!(ids(&icons), vec!["10k", "home", "lonely"]);
        assert_eq!(icons[0].content(), Some("e951"));
        assert_eq!(icons[2].content(), None);
        assert_eq!(icons[1].source(), "/modules/test_provider/fonts/icons.codepoints");
    }

    #[test]
    fn test_json_and_yaml_maps() {
        let mut fixture = Fixture::new();
        fixture.write("a.json", r#"{"star": "\uf005", "heart": 61444, "empty": null}"#);
        fixture.write("b.yml", "bell: \"\\uf0f3\"\nstar: duplicate\n42: answer\n");
        let icons = fixture.discover(&["fonts/a.json", "fonts/b.yml"]).unwrap();

        assert_eq!(ids(&icons), vec!["star", "heart", "empty", "bell", "42"]);
        assert_eq!(icons[0].content(), Some("\u{f005}"));
        assert_eq!(icons[1].content(), Some("61444"));
        assert_eq!(icons[2].content(), None);
        assert_eq!(icons[3].content(), Some("\u{f0f3}"));
    }

    #[test]
    fn test_offset_applies_after_merge() {
        let mut fixture = Fixture::new();
        fixture.write("a.codepoints", "one 1\ntwo 2\n");
        fixture.write("b.codepoints", "two 2\nthree 3\n");
        fixture.pack.config.offset = Some(2);
        let icons = fixture
            .discover(&["fonts/a.codepoints", "fonts/b.codepoints"])
            .unwrap();
        assert_eq!(ids(&icons), vec!["three"]);
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let mut fixture = Fixture::new();
        fixture.write("broken.json", "{not json");
        let err = fixture.discover(&["fonts/broken.json"]).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("broken.json"));

        fixture.write("list.json", "[1, 2]");
        let err = fixture.discover(&["fonts/list.json"]).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_invalid_yaml_is_fatal() {
        let mut fixture = Fixture::new();
        fixture.write("broken.yaml", "a: [unclosed");
        let err = fixture.discover(&["fonts/broken.yaml"]).unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }

    #[test]
    fn test_truetype_font_with_glyph_names() {
        let mut fixture = Fixture::new();
        fixture.write("icons.ttf", TestFont::default().to_sfnt());
        let icons = fixture.discover(&["fonts/icons.ttf"]).unwrap();

        assert_eq!(ids(&icons), vec!["home", "user", "settings"]);
        assert_eq!(icons[0].content(), Some("\u{e000}"));
        assert_eq!(icons[0].source(), "/modules/test_provider/fonts/icons.ttf");
    }

    #[test]
    fn test_woff_font_without_glyph_names() {
        let mut fixture = Fixture::new();
        let font = TestFont {
            glyph_names: None,
            ..Default::default()
        };
        fixture.write("icons.woff", font.to_woff(true));
        let icons = fixture.discover(&["fonts/icons.woff"]).unwrap();
        assert_eq!(ids(&icons), vec!["e000", "e001", "e002"]);
    }

    #[test]
    fn test_corrupt_font_is_fatal() {
        let mut fixture = Fixture::new();
        let font = TestFont {
            head_magic: 0,
            ..Default::default()
        };
        fixture.write("bad.ttf", font.to_sfnt());
        let err = fixture.discover(&["fonts/bad.ttf"]).unwrap_err();
        assert!(matches!(
            err,
            IconPackError::Font {
                source: FontError::InvalidMagic(0),
                ..
            }
        ));
    }

    #[test]
    fn test_missing_sources_are_fatal() {
        let mut fixture = Fixture::new();
        let err = fixture.discover(&[]).unwrap_err();
        assert!(err.to_string().contains("empty 'config.sources'"));
    }
}
