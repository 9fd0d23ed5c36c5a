//! # Wire Reader
//!
//! Bounds-checked cursor over an encoded message. Every read validates the
//! remaining length before touching the buffer and reports failures with the
//! absolute offset of the value that could not be read.
//!
//! Sub-readers for embedded messages and packed runs carry a `base` offset,
//! so errors deep inside a nested payload still point into the original
//! input.

use types::MAX_FIELD_NUMBER;

use crate::error::{DecodeError, DecodeResult};
use crate::wire::{WireType, MAX_VARINT_LEN};

#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    /// Reader over a slice that starts `base` bytes into the outer input
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Position relative to this reader's slice
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Position relative to the outermost input
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes consumed since `start` (a value previously returned by `position`)
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        &self.data[start..self.pos]
    }

    pub fn read_varint(&mut self) -> DecodeResult<u64> {
        let start = self.offset();
        let mut value = 0u64;

        for i in 0..MAX_VARINT_LEN {
            let Some(&byte) = self.data.get(self.pos) else {
                return Err(DecodeError::truncated_varint(start, i));
            };
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }

        Err(DecodeError::truncated_varint(start, MAX_VARINT_LEN))
    }

    /// Read a tag and split it into field number and wire type
    pub fn read_tag(&mut self) -> DecodeResult<(u32, WireType)> {
        let start = self.offset();
        let tag = self.read_varint()?;
        let number = tag >> 3;

        if number == 0 {
            return Err(DecodeError::invalid_tag(tag, start, "field number 0"));
        }
        if number > u64::from(MAX_FIELD_NUMBER) {
            return Err(DecodeError::invalid_tag(
                tag,
                start,
                format!("field number {number} exceeds {MAX_FIELD_NUMBER}"),
            ));
        }

        let raw_type = (tag & 0x07) as u8;
        let wire_type = WireType::try_from(raw_type).map_err(|_| {
            DecodeError::invalid_tag(tag, start, format!("unsupported wire type {raw_type}"))
        })?;

        Ok((number as u32, wire_type))
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize, field: u32) -> DecodeResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(DecodeError::buffer_underrun(self.offset(), len, self.remaining(), field));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_fixed64(&mut self, field: u32) -> DecodeResult<u64> {
        let bytes = self.read_bytes(8, field)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    pub fn read_fixed32(&mut self, field: u32) -> DecodeResult<u32> {
        let bytes = self.read_bytes(4, field)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(raw))
    }

    /// Read a varint length prefix and return a sub-reader over the payload
    pub fn read_length_delimited(&mut self, field: u32) -> DecodeResult<WireReader<'a>> {
        let len_offset = self.offset();
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .map_err(|_| DecodeError::buffer_underrun(len_offset, usize::MAX, self.remaining(), field))?;
        let base = self.offset();
        let payload = self.read_bytes(len, field)?;
        Ok(WireReader::with_base(payload, base))
    }

    /// Advance past one field value of the given wire type
    pub fn skip(&mut self, field: u32, wire_type: WireType) -> DecodeResult<()> {
        match wire_type {
            WireType::Varint => self.read_varint().map(|_| ()),
            WireType::Fixed64 => self.read_bytes(8, field).map(|_| ()),
            WireType::Fixed32 => self.read_bytes(4, field).map(|_| ()),
            WireType::LengthDelimited => self.read_length_delimited(field).map(|_| ()),
        }
    }

    /// The unread remainder of this reader's slice
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}
