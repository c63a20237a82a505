//! In-memory font fixtures.
//!
//! Builds just enough of a TrueType file (and its WOFF wrapping) for the
//! parser: real `cmap`, `name` and `post` tables, zero-filled metrics.

use super::{Tag, FLAVOR_TRUETYPE, WOFF_SIGNATURE};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// One cmap format 4 segment.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub start: u16,
    pub end: u16,
    pub delta: u16,
    /// Glyph ids read through idRangeOffset instead of the delta.
    pub glyphs: Option<Vec<u16>>,
}

impl Segment {
    pub(crate) fn delta(start: u16, end: u16, delta: u16) -> Self {
        Self {
            start,
            end,
            delta,
            glyphs: None,
        }
    }

    pub(crate) fn glyphs(start: u16, glyphs: &[u16]) -> Self {
        Self {
            start,
            end: start + glyphs.len() as u16 - 1,
            delta: 0,
            glyphs: Some(glyphs.to_vec()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TestFont {
    pub segments: Vec<Segment>,
    pub cmap_format: u16,
    pub postscript_name: String,
    /// Store the PostScript name as a Macintosh Roman record only.
    pub mac_name: bool,
    /// `Some` writes a version 2.0 `post`, `None` a version 3.0 one.
    pub glyph_names: Option<Vec<String>>,
    pub head_magic: u32,
    pub omit: Option<Tag>,
}

impl Default for TestFont {
    /// Three glyphs at U+E000..U+E002 named `home`, `user` and `settings`.
    fn default() -> Self {
        Self {
            segments: vec![Segment::delta(0xE000, 0xE002, 0u16.wrapping_sub(0xDFFF))],
            cmap_format: 4,
            postscript_name: "TestIcons-Regular".to_string(),
            mac_name: false,
            glyph_names: Some(
                [".notdef", "home", "user", "settings"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            head_magic: 0x5F0F_3CF5,
            omit: None,
        }
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

impl TestFont {
    fn num_glyphs(&self) -> u16 {
        self.glyph_names.as_ref().map(|n| n.len() as u16).unwrap_or(4)
    }

    /// The cmap subtable alone.
    pub(crate) fn cmap_subtable(&self) -> Vec<u8> {
        let mut segments = self.segments.clone();
        segments.push(Segment::delta(0xFFFF, 0xFFFF, 1));
        let seg_count = segments.len();

        let mut glyph_array: Vec<u16> = Vec::new();
        let mut range_offsets = Vec::with_capacity(seg_count);
        for (i, segment) in segments.iter().enumerate() {
            match &segment.glyphs {
                Some(glyphs) => {
                    // Bytes from this idRangeOffset slot to the glyph.
                    let offset = 2 * (seg_count - i) + 2 * glyph_array.len();
                    range_offsets.push(offset as u16);
                    glyph_array.extend(glyphs);
                }
                None => range_offsets.push(0),
            }
        }

        let mut out = Vec::new();
        push_u16(&mut out, self.cmap_format);
        push_u16(&mut out, (16 + 8 * seg_count + 2 * glyph_array.len()) as u16);
        push_u16(&mut out, 0);
        push_u16(&mut out, (seg_count * 2) as u16);
        // searchRange, entrySelector, rangeShift are not consulted.
        out.extend_from_slice(&[0; 6]);
        for s in &segments {
            push_u16(&mut out, s.end);
        }
        push_u16(&mut out, 0);
        for s in &segments {
            push_u16(&mut out, s.start);
        }
        for s in &segments {
            push_u16(&mut out, s.delta);
        }
        for offset in &range_offsets {
            push_u16(&mut out, *offset);
        }
        for glyph in &glyph_array {
            push_u16(&mut out, *glyph);
        }
        out
    }

    /// A cmap with a single Windows Unicode BMP record.
    pub(crate) fn cmap_table(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_u16(&mut out, 0);
        push_u16(&mut out, 1);
        push_u16(&mut out, 3);
        push_u16(&mut out, 1);
        push_u32(&mut out, 12);
        out.extend(self.cmap_subtable());
        out
    }

    pub(crate) fn name_table(&self) -> Vec<u8> {
        let (platform, encoding, language, string) = if self.mac_name {
            (1u16, 0u16, 0u16, self.postscript_name.as_bytes().to_vec())
        } else {
            let utf16: Vec<u8> = self
                .postscript_name
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect();
            (3, 1, 0x0409, utf16)
        };

        let mut out = Vec::new();
        push_u16(&mut out, 0);
        push_u16(&mut out, 2);
        push_u16(&mut out, 6 + 2 * 12);
        // A family name record that must not be picked up.
        let family = b"TestIcons";
        for (name_id, length, offset) in [
            (1u16, family.len() as u16, string.len() as u16),
            (6, string.len() as u16, 0),
        ] {
            push_u16(&mut out, platform);
            push_u16(&mut out, encoding);
            push_u16(&mut out, language);
            push_u16(&mut out, name_id);
            push_u16(&mut out, length);
            push_u16(&mut out, offset);
        }
        out.extend_from_slice(&string);
        out.extend_from_slice(family);
        out
    }

    pub(crate) fn post_table(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let version = if self.glyph_names.is_some() {
            0x0002_0000
        } else {
            0x0003_0000
        };
        push_u32(&mut out, version);
        // italicAngle through maxMemType1.
        out.extend_from_slice(&[0; 28]);

        if let Some(names) = &self.glyph_names {
            push_u16(&mut out, names.len() as u16);
            let mut custom: Vec<&str> = Vec::new();
            for name in names {
                match super::post_names::STANDARD_MAC_GLYPH_NAMES
                    .iter()
                    .position(|standard| standard == name)
                {
                    Some(index) => push_u16(&mut out, index as u16),
                    None => {
                        push_u16(&mut out, 258 + custom.len() as u16);
                        custom.push(name);
                    }
                }
            }
            for name in custom {
                out.push(name.len() as u8);
                out.extend_from_slice(name.as_bytes());
            }
        }
        out
    }

    fn head_table(&self) -> Vec<u8> {
        let mut out = vec![0u8; 54];
        out[12..16].copy_from_slice(&self.head_magic.to_be_bytes());
        out
    }

    fn maxp_table(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_u32(&mut out, 0x0000_5000);
        push_u16(&mut out, self.num_glyphs());
        out
    }

    /// All tables, sorted by tag.
    pub(crate) fn tables(&self) -> Vec<(Tag, Vec<u8>)> {
        let mut tables = vec![
            (Tag::OS2, vec![0u8; 78]),
            (Tag::CMAP, self.cmap_table()),
            (Tag::HEAD, self.head_table()),
            (Tag::HHEA, vec![0u8; 36]),
            (Tag::HMTX, vec![0u8; 4 * usize::from(self.num_glyphs())]),
            (Tag::MAXP, self.maxp_table()),
            (Tag::NAME, self.name_table()),
            (Tag::POST, self.post_table()),
        ];
        tables.retain(|(tag, _)| Some(*tag) != self.omit);
        tables.sort_by_key(|(tag, _)| *tag);
        tables
    }

    pub(crate) fn to_sfnt(&self) -> Vec<u8> {
        let tables = self.tables();
        let mut out = Vec::new();
        push_u32(&mut out, FLAVOR_TRUETYPE);
        push_u16(&mut out, tables.len() as u16);
        out.extend_from_slice(&[0; 6]);

        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, bytes) in &tables {
            out.extend_from_slice(&tag.0);
            push_u32(&mut out, 0);
            push_u32(&mut out, offset as u32);
            push_u32(&mut out, bytes.len() as u32);
            body.extend_from_slice(bytes);
            pad4(&mut body);
            offset = 12 + 16 * tables.len() + body.len();
        }
        out.extend(body);
        out
    }

    /// WOFF wrapping; with `compress` every table that shrinks is deflated.
    pub(crate) fn to_woff(&self, compress: bool) -> Vec<u8> {
        let tables = self.tables();
        let mut out = woff_header(FLAVOR_TRUETYPE, tables.len() as u16, 0);

        let mut offset = 44 + 20 * tables.len();
        let mut body = Vec::new();
        for (tag, bytes) in &tables {
            let stored = if compress {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
                encoder.write_all(bytes).unwrap();
                let compressed = encoder.finish().unwrap();
                if compressed.len() < bytes.len() {
                    compressed
                } else {
                    bytes.clone()
                }
            } else {
                bytes.clone()
            };
            out.extend(woff_table_entry(
                *tag,
                offset as u32,
                stored.len() as u32,
                bytes.len() as u32,
            ));
            body.extend_from_slice(&stored);
            pad4(&mut body);
            offset = 44 + 20 * tables.len() + body.len();
        }
        out.extend(body);
        out
    }
}

/// A 44-byte WOFF header.
pub(crate) fn woff_header(flavor: u32, num_tables: u16, reserved: u16) -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, WOFF_SIGNATURE);
    push_u32(&mut out, flavor);
    push_u32(&mut out, 0);
    push_u16(&mut out, num_tables);
    push_u16(&mut out, reserved);
    out.extend_from_slice(&[0; 28]);
    out
}

/// A 20-byte WOFF table directory entry.
pub(crate) fn woff_table_entry(tag: Tag, offset: u32, comp_length: u32, orig_length: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&tag.0);
    push_u32(&mut out, offset);
    push_u32(&mut out, comp_length);
    push_u32(&mut out, orig_length);
    push_u32(&mut out, 0);
    out
}
