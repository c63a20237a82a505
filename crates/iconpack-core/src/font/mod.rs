//! Binary font inspection.
//!
//! Reads just enough of a TrueType/OpenType (or WOFF 1.0 wrapped) font to list
//! its icons: the Unicode-to-glyph mapping from `cmap`, glyph names from
//! `post`, and the PostScript name from `name`. Outlines are never touched.
//!
//! Only `cmap` subtable format 4 is understood, so codepoints above the Basic
//! Multilingual Plane are not reported.

mod post_names;
mod reader;
mod sfnt;
mod woff;

#[cfg(test)]
pub(crate) mod testing;

use reader::ByteReader;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub use sfnt::FontTables;

/// `true` flavor used by Apple TrueType fonts.
pub const FLAVOR_TRUE: u32 = 0x7472_7565;
/// TrueType outlines.
pub const FLAVOR_TRUETYPE: u32 = 0x0001_0000;
/// CFF outlines.
pub const FLAVOR_OTTO: u32 = 0x4F54_544F;
/// `wOFF`.
pub const WOFF_SIGNATURE: u32 = 0x774F_4646;

/// A four-byte table tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const CMAP: Tag = Tag(*b"cmap");
    pub const HEAD: Tag = Tag(*b"head");
    pub const HHEA: Tag = Tag(*b"hhea");
    pub const HMTX: Tag = Tag(*b"hmtx");
    pub const MAXP: Tag = Tag(*b"maxp");
    pub const NAME: Tag = Tag(*b"name");
    pub const OS2: Tag = Tag(*b"OS/2");
    pub const POST: Tag = Tag(*b"post");
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Why a font file could not be read.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("unexpected end of data reading {needed} bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("unrecognized font signature 0x{0:08X}")]
    UnknownSignature(u32),

    #[error("font file is {size} bytes, the limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("missing required table '{0}'")]
    MissingTable(Tag),

    #[error("table '{0}' lies outside the file")]
    TableOutOfBounds(Tag),

    #[error("invalid 'head' magic number 0x{0:08X}")]
    InvalidMagic(u32),

    #[error("cmap has no encoding records")]
    NoCmapSubtable,

    #[error("unsupported cmap subtable format {0}, only format 4 is supported")]
    UnsupportedCmapFormat(u16),

    #[error("name table has no PostScript name (nameID 6)")]
    MissingPostScriptName,

    #[error("invalid WOFF signature 0x{0:08X}")]
    InvalidWoffSignature(u32),

    #[error("WOFF reserved field must be zero, found {0}")]
    WoffReservedNotZero(u16),

    #[error("unsupported WOFF flavor 0x{0:08X}")]
    UnsupportedFlavor(u32),

    #[error("WOFF table '{tag}' is stored in {compressed} bytes, more than its original {original}")]
    CompressedLargerThanOriginal {
        tag: Tag,
        compressed: u32,
        original: u32,
    },

    #[error("WOFF table '{tag}' inflated to {actual} bytes, expected {expected}")]
    LengthMismatch { tag: Tag, expected: u32, actual: usize },

    #[error("WOFF table '{tag}' could not be inflated: {source}")]
    Inflate {
        tag: Tag,
        #[source]
        source: std::io::Error,
    },
}

/// What a font tells us about its icons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontInfo {
    /// Outline flavor of the underlying sfnt.
    pub flavor: u32,
    pub postscript_name: String,
    pub num_glyphs: u16,
    /// Codepoint to glyph id, glyph 0 excluded.
    pub codepoints: BTreeMap<u32, u16>,
    /// Glyph names indexed by glyph id, when `post` carries them.
    pub glyph_names: Option<Vec<String>>,
}

impl FontInfo {
    /// Name of a glyph, skipping `.notdef` and blanks.
    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        self.glyph_names
            .as_ref()?
            .get(usize::from(glyph_id))
            .map(String::as_str)
            .filter(|name| !name.is_empty() && *name != ".notdef")
    }
}

/// Parse a TrueType, OpenType or WOFF 1.0 font.
///
/// The container is detected from the leading signature, not the extension.
pub fn parse_font(data: &[u8]) -> Result<FontInfo, FontError> {
    let signature = ByteReader::new(data).read_u32()?;
    let tables = match signature {
        WOFF_SIGNATURE => woff::unwrap(data)?,
        FLAVOR_TRUETYPE | FLAVOR_TRUE | FLAVOR_OTTO => FontTables::from_sfnt(data)?,
        other => return Err(FontError::UnknownSignature(other)),
    };
    sfnt::parse_tables(&tables)
}

#[cfg(test)]
mod tests {
    use super::testing::TestFont;
    use super::*;

    #[test]
    fn test_parse_detects_container() {
        let font = TestFont::default();
        let from_sfnt = parse_font(&font.to_sfnt()).unwrap();
        let from_woff = parse_font(&font.to_woff(true)).unwrap();
        assert_eq!(from_sfnt, from_woff);
        assert_eq!(from_sfnt.postscript_name, "TestIcons-Regular");
    }

    #[test]
    fn test_unknown_signature() {
        let err = parse_font(b"wOF2\0\0\0\0").unwrap_err();
        assert!(matches!(err, FontError::UnknownSignature(0x774F_4632)));
        assert!(matches!(parse_font(b"ab"), Err(FontError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_glyph_name_skips_notdef() {
        let info = parse_font(&TestFont::default().to_sfnt()).unwrap();
        assert_eq!(info.glyph_name(0), None);
        assert_eq!(info.glyph_name(1), Some("home"));
        assert_eq!(info.glyph_name(999), None);
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::OS2.to_string(), "OS/2");
    }
}
