//! Wire primitives: tags, varints, zig-zag
//!
//! ```text
//! tag   = (field_number << 3) | wire_type        (varint)
//! varint: 7 bits per byte, little-endian groups, MSB = continuation
//! ```

use bytes::BufMut;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Longest legal varint encoding of a 64-bit value
pub const MAX_VARINT_LEN: usize = 10;

/// Wire types this codec understands
///
/// Group start/end (3, 4) and the unassigned values 6 and 7 are rejected as
/// invalid tags. `Fixed32` has no field kind of its own but is skippable, so
/// unknown 32-bit fields survive a round trip.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    pub fn name(&self) -> &'static str {
        match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::Fixed32 => "fixed32",
        }
    }
}

pub fn make_tag(field_number: u32, wire_type: WireType) -> u64 {
    (u64::from(field_number) << 3) | u64::from(u8::from(wire_type))
}

pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0x80 {
        buf.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

pub fn encoded_len_varint(value: u64) -> usize {
    // 1 byte per started group of 7 bits, minimum 1
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

pub fn encode_tag(field_number: u32, wire_type: WireType, buf: &mut impl BufMut) {
    encode_varint(make_tag(field_number, wire_type), buf);
}

pub fn encoded_len_tag(field_number: u32) -> usize {
    encoded_len_varint(u64::from(field_number) << 3)
}

pub fn encode_zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn decode_zigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
