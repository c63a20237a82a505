//! Big-endian cursor over a byte slice.

use super::{FontError, Tag};

/// Sequential big-endian reader with explicit seeks.
///
/// Every read is bounds checked; running off the end is a
/// `FontError::UnexpectedEof` carrying the offset of the failed read.
#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// A reader positioned at `offset`.
    pub(crate) fn at(data: &'a [u8], offset: usize) -> Result<Self, FontError> {
        let mut reader = Self::new(data);
        reader.seek(offset)?;
        Ok(reader)
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn seek(&mut self, offset: usize) -> Result<(), FontError> {
        if offset > self.data.len() {
            return Err(FontError::UnexpectedEof {
                offset,
                needed: 0,
            });
        }
        self.pos = offset;
        Ok(())
    }

    pub(crate) fn skip(&mut self, count: usize) -> Result<(), FontError> {
        self.read_bytes(count).map(|_| ())
    }

    pub(crate) fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], FontError> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .ok_or(FontError::UnexpectedEof {
                offset: self.pos,
                needed: count,
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FontError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, FontError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, FontError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16, FontError> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, FontError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub(crate) fn read_tag(&mut self) -> Result<Tag, FontError> {
        Ok(Tag(self.read_array()?))
    }

    /// `count` consecutive `u16` values.
    pub(crate) fn read_u16_array(&mut self, count: usize) -> Result<Vec<u16>, FontError> {
        (0..count).map(|_| self.read_u16()).collect()
    }
}
