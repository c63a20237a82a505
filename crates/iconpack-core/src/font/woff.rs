//! WOFF 1.0 container.
//!
//! Each table is stored either verbatim or zlib-compressed. The tables are
//! restored into a `FontTables` set; metadata and private blocks are ignored.

use super::reader::ByteReader;
use super::sfnt::FontTables;
use super::{FontError, Tag, FLAVOR_OTTO, FLAVOR_TRUE, FLAVOR_TRUETYPE, WOFF_SIGNATURE};
use crate::config::FontConfig;
use flate2::read::ZlibDecoder;
use std::io::Read;

const HEADER_LEN: usize = 44;

#[derive(Debug, Clone, Copy)]
struct WoffTableEntry {
    tag: Tag,
    offset: u32,
    comp_length: u32,
    orig_length: u32,
}

/// Restore the sfnt tables of a WOFF file.
pub(crate) fn unwrap(data: &[u8]) -> Result<FontTables, FontError> {
    let mut reader = ByteReader::new(data);

    let signature = reader.read_u32()?;
    if signature != WOFF_SIGNATURE {
        return Err(FontError::InvalidWoffSignature(signature));
    }
    let flavor = reader.read_u32()?;
    if !matches!(flavor, FLAVOR_TRUETYPE | FLAVOR_TRUE | FLAVOR_OTTO) {
        return Err(FontError::UnsupportedFlavor(flavor));
    }
    let _length = reader.read_u32()?;
    let num_tables = reader.read_u16()?;
    let reserved = reader.read_u16()?;
    if reserved != 0 {
        return Err(FontError::WoffReservedNotZero(reserved));
    }
    // totalSfntSize, version, metadata block, private block.
    reader.seek(HEADER_LEN)?;

    let mut entries = Vec::with_capacity(usize::from(num_tables));
    for _ in 0..num_tables {
        let tag = reader.read_tag()?;
        let offset = reader.read_u32()?;
        let comp_length = reader.read_u32()?;
        let orig_length = reader.read_u32()?;
        let _orig_checksum = reader.read_u32()?;
        entries.push(WoffTableEntry {
            tag,
            offset,
            comp_length,
            orig_length,
        });
    }

    let mut tables = FontTables::new(flavor);
    for entry in entries {
        let stored = ByteReader::at(data, entry.offset as usize)
            .and_then(|mut r| r.read_bytes(entry.comp_length as usize))
            .map_err(|_| FontError::TableOutOfBounds(entry.tag))?;
        tables.insert(entry.tag, restore_table(&entry, stored)?);
    }
    Ok(tables)
}

fn restore_table(entry: &WoffTableEntry, stored: &[u8]) -> Result<Vec<u8>, FontError> {
    if entry.comp_length > entry.orig_length {
        return Err(FontError::CompressedLargerThanOriginal {
            tag: entry.tag,
            compressed: entry.comp_length,
            original: entry.orig_length,
        });
    }
    if entry.comp_length == entry.orig_length {
        return Ok(stored.to_vec());
    }
    if u64::from(entry.orig_length) > FontConfig::MAX_FONT_FILE_BYTES {
        return Err(FontError::TooLarge {
            size: u64::from(entry.orig_length),
            limit: FontConfig::MAX_FONT_FILE_BYTES,
        });
    }

    // One byte past the declared size is enough to detect an overrun.
    let mut inflated = Vec::with_capacity(entry.orig_length as usize);
    ZlibDecoder::new(stored)
        .take(u64::from(entry.orig_length) + 1)
        .read_to_end(&mut inflated)
        .map_err(|source| FontError::Inflate {
            tag: entry.tag,
            source,
        })?;

    if inflated.len() != entry.orig_length as usize {
        return Err(FontError::LengthMismatch {
            tag: entry.tag,
            expected: entry.orig_length,
            actual: inflated.len(),
        });
    }
    Ok(inflated)
}
