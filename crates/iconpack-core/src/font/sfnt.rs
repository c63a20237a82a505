//! sfnt table directory and the tables icon discovery needs.

use super::post_names::{MAC_ROMAN_HIGH, STANDARD_MAC_GLYPH_NAMES};
use super::reader::ByteReader;
use super::{FontError, FontInfo, Tag};
use std::collections::BTreeMap;
use tracing::debug;

/// Tables a font must carry to be accepted.
pub(crate) const REQUIRED_TABLES: [Tag; 8] = [
    Tag::HEAD,
    Tag::HHEA,
    Tag::MAXP,
    Tag::HMTX,
    Tag::CMAP,
    Tag::NAME,
    Tag::OS2,
    Tag::POST,
];

const HEAD_MAGIC: u32 = 0x5F0F_3CF5;
const NAME_ID_POSTSCRIPT: u16 = 6;
const SENTINEL_CODE: u32 = 0xFFFF;

/// One entry of the table directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl TableRecord {
    fn read(reader: &mut ByteReader<'_>) -> Result<Self, FontError> {
        Ok(Self {
            tag: reader.read_tag()?,
            checksum: reader.read_u32()?,
            offset: reader.read_u32()?,
            length: reader.read_u32()?,
        })
    }
}

/// The raw tables of a font, keyed by tag.
///
/// Built either from a plain sfnt or by unwrapping a WOFF file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontTables {
    pub(crate) flavor: u32,
    pub(crate) tables: BTreeMap<Tag, Vec<u8>>,
}

impl FontTables {
    pub(crate) fn new(flavor: u32) -> Self {
        Self {
            flavor,
            tables: BTreeMap::new(),
        }
    }

    /// Read the table directory of a TrueType/OpenType file.
    pub fn from_sfnt(data: &[u8]) -> Result<Self, FontError> {
        let mut reader = ByteReader::new(data);
        let flavor = reader.read_u32()?;
        let num_tables = reader.read_u16()?;
        // searchRange, entrySelector, rangeShift
        reader.skip(6)?;

        let mut tables = Self::new(flavor);
        for _ in 0..num_tables {
            let record = TableRecord::read(&mut reader)?;
            let bytes = ByteReader::at(data, record.offset as usize)
                .and_then(|mut r| r.read_bytes(record.length as usize))
                .map_err(|_| FontError::TableOutOfBounds(record.tag))?;
            tables.insert(record.tag, bytes.to_vec());
        }
        Ok(tables)
    }

    pub(crate) fn insert(&mut self, tag: Tag, bytes: Vec<u8>) {
        self.tables.insert(tag, bytes);
    }

    pub fn flavor(&self) -> u32 {
        self.flavor
    }

    pub fn get(&self, tag: Tag) -> Option<&[u8]> {
        self.tables.get(&tag).map(Vec::as_slice)
    }

    fn require(&self, tag: Tag) -> Result<&[u8], FontError> {
        self.get(tag).ok_or(FontError::MissingTable(tag))
    }
}

/// Validate the tables and pull out everything `FontInfo` reports.
pub(crate) fn parse_tables(tables: &FontTables) -> Result<FontInfo, FontError> {
    for tag in REQUIRED_TABLES {
        tables.require(tag)?;
    }

    let magic = ByteReader::at(tables.require(Tag::HEAD)?, 12)?.read_u32()?;
    if magic != HEAD_MAGIC {
        return Err(FontError::InvalidMagic(magic));
    }

    let num_glyphs = ByteReader::at(tables.require(Tag::MAXP)?, 4)?.read_u16()?;
    let codepoints = parse_cmap(tables.require(Tag::CMAP)?)?;
    let postscript_name = parse_postscript_name(tables.require(Tag::NAME)?)?;
    let glyph_names = parse_post(tables.require(Tag::POST)?)?;

    debug!(
        "Font '{}': {} glyphs, {} mapped codepoints, glyph names {}",
        postscript_name,
        num_glyphs,
        codepoints.len(),
        if glyph_names.is_some() { "present" } else { "absent" }
    );

    Ok(FontInfo {
        flavor: tables.flavor,
        postscript_name,
        num_glyphs,
        codepoints,
        glyph_names,
    })
}

#[derive(Debug, Clone, Copy)]
struct EncodingRecord {
    platform_id: u16,
    encoding_id: u16,
    offset: u32,
}

/// Preferred subtable: Windows Unicode BMP, any Unicode platform record,
/// Windows full repertoire, then whatever comes first.
fn select_encoding(records: &[EncodingRecord]) -> Option<EncodingRecord> {
    records
        .iter()
        .find(|r| r.platform_id == 3 && r.encoding_id == 1)
        .or_else(|| records.iter().find(|r| r.platform_id == 0))
        .or_else(|| records.iter().find(|r| r.platform_id == 3 && r.encoding_id == 10))
        .or_else(|| records.first())
        .copied()
}

pub(crate) fn parse_cmap(data: &[u8]) -> Result<BTreeMap<u32, u16>, FontError> {
    let mut reader = ByteReader::new(data);
    let _version = reader.read_u16()?;
    let num_records = reader.read_u16()?;

    let mut records = Vec::with_capacity(usize::from(num_records));
    for _ in 0..num_records {
        records.push(EncodingRecord {
            platform_id: reader.read_u16()?,
            encoding_id: reader.read_u16()?,
            offset: reader.read_u32()?,
        });
    }

    let record = select_encoding(&records).ok_or(FontError::NoCmapSubtable)?;
    let subtable = data
        .get(record.offset as usize..)
        .ok_or(FontError::TableOutOfBounds(Tag::CMAP))?;

    let format = ByteReader::new(subtable).read_u16()?;
    if format != 4 {
        return Err(FontError::UnsupportedCmapFormat(format));
    }
    parse_format4(subtable)
}

/// Glyph ids past 16 bits wrap around.
pub(crate) fn wrap_glyph_id(glyph_id: u32) -> u32 {
    if glyph_id >= 65536 {
        glyph_id - 65536
    } else {
        glyph_id
    }
}

fn parse_format4(subtable: &[u8]) -> Result<BTreeMap<u32, u16>, FontError> {
    let mut reader = ByteReader::new(subtable);
    // format, length, language
    reader.skip(6)?;
    let seg_count = usize::from(reader.read_u16()? / 2);
    // searchRange, entrySelector, rangeShift
    reader.skip(6)?;

    let end_codes = reader.read_u16_array(seg_count)?;
    // reservedPad
    reader.skip(2)?;
    let start_codes = reader.read_u16_array(seg_count)?;
    let id_deltas = reader.read_u16_array(seg_count)?;
    let id_range_offsets_at = reader.position();
    let id_range_offsets = reader.read_u16_array(seg_count)?;

    let mut codepoints = BTreeMap::new();
    // Segments are sorted by end code; a code already covered by an earlier
    // segment is never visited again.
    let mut next_code = 0u32;
    for segment in 0..seg_count {
        let start = u32::from(start_codes[segment]);
        let end = u32::from(end_codes[segment]);
        let delta = u32::from(id_deltas[segment]);
        let range_offset = usize::from(id_range_offsets[segment]);

        let first = start.max(next_code);
        next_code = next_code.max(end + 1);
        if first > end {
            continue;
        }

        for code in first..=end {
            if code == SENTINEL_CODE {
                continue;
            }

            let glyph_id = if range_offset == 0 {
                wrap_glyph_id(code + delta)
            } else {
                // Offset is relative to this segment's idRangeOffset slot.
                let at = id_range_offsets_at
                    + segment * 2
                    + range_offset
                    + (code - start) as usize * 2;
                match ByteReader::at(subtable, at).and_then(|mut r| r.read_u16()) {
                    Ok(0) | Err(_) => 0,
                    Ok(glyph) => wrap_glyph_id(u32::from(glyph) + delta),
                }
            };

            if glyph_id != 0 {
                codepoints.insert(code, glyph_id as u16);
            }
        }
    }
    Ok(codepoints)
}

#[derive(Debug, Clone, Copy)]
struct NameRecord {
    platform_id: u16,
    name_id: u16,
    length: u16,
    offset: u16,
}

/// PostScript name: a Unicode or Windows (UTF-16BE) record first, then a
/// Macintosh Roman record.
pub(crate) fn parse_postscript_name(data: &[u8]) -> Result<String, FontError> {
    let mut reader = ByteReader::new(data);
    let _format = reader.read_u16()?;
    let count = reader.read_u16()?;
    let storage = usize::from(reader.read_u16()?);

    let mut records = Vec::new();
    for _ in 0..count {
        let platform_id = reader.read_u16()?;
        // encodingID, languageID
        reader.skip(4)?;
        let record = NameRecord {
            platform_id,
            name_id: reader.read_u16()?,
            length: reader.read_u16()?,
            offset: reader.read_u16()?,
        };
        if record.name_id == NAME_ID_POSTSCRIPT {
            records.push(record);
        }
    }

    let utf16 = records.iter().filter(|r| matches!(r.platform_id, 0 | 3));
    let mac = records.iter().filter(|r| r.platform_id == 1);
    for record in utf16.chain(mac) {
        let bytes = ByteReader::at(data, storage + usize::from(record.offset))
            .and_then(|mut r| r.read_bytes(usize::from(record.length)))
            .map_err(|_| FontError::TableOutOfBounds(Tag::NAME))?;
        let name = if record.platform_id == 1 {
            decode_mac_roman(bytes)
        } else {
            decode_utf16_be(bytes)
        };
        let name = name.trim().to_string();
        if !name.is_empty() {
            return Ok(name);
        }
    }
    Err(FontError::MissingPostScriptName)
}

fn decode_utf16_be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn decode_mac_roman(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b < 0x80 {
                char::from(b)
            } else {
                MAC_ROMAN_HIGH[usize::from(b - 0x80)]
            }
        })
        .collect()
}

/// Glyph names from `post`, indexed by glyph id.
///
/// Version 1.0 uses the standard Macintosh ordering, version 2.0 its own
/// index plus Pascal strings. Every other version carries no names.
pub(crate) fn parse_post(data: &[u8]) -> Result<Option<Vec<String>>, FontError> {
    let version = ByteReader::new(data).read_u32()?;
    match version {
        0x0001_0000 => Ok(Some(
            STANDARD_MAC_GLYPH_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        )),
        0x0002_0000 => parse_post_v2(data).map(Some),
        other => {
            debug!("post table version 0x{:08X} has no glyph names", other);
            Ok(None)
        }
    }
}

fn parse_post_v2(data: &[u8]) -> Result<Vec<String>, FontError> {
    let mut reader = ByteReader::at(data, 32)?;
    let num_glyphs = usize::from(reader.read_u16()?);
    let indices = reader.read_u16_array(num_glyphs)?;

    let mut custom = Vec::new();
    while reader.remaining() > 0 {
        let length = usize::from(reader.read_u8()?);
        custom.push(String::from_utf8_lossy(reader.read_bytes(length)?).into_owned());
    }

    let standard = STANDARD_MAC_GLYPH_NAMES.len();
    Ok(indices
        .into_iter()
        .map(|index| {
            let index = usize::from(index);
            if index < standard {
                STANDARD_MAC_GLYPH_NAMES[index].to_string()
            } else {
                custom.get(index - standard).cloned().unwrap_or_default()
            }
        })
        .collect())
}
