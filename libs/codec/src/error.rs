//! Decode errors for the wire codec
//!
//! Every variant that comes from malformed input carries the absolute byte
//! offset where decoding stopped, so a bad capture can be located with a hex
//! dump.

use thiserror::Error;
use types::MessageError;

/// Wire decoding errors with diagnostic context
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended inside a varint, or a varint ran past 10 bytes
    #[error("Truncated varint at offset {offset}: {detail}")]
    TruncatedVarint { offset: usize, detail: String },

    /// A length prefix or fixed-width value needs more bytes than remain
    #[error("Buffer underrun at offset {offset}: need {need} bytes, {remaining} remaining (field {field})")]
    BufferUnderrun {
        offset: usize,
        need: usize,
        remaining: usize,
        field: u32,
    },

    /// Field number 0, out of range, or an unsupported wire type
    #[error("Invalid tag {tag:#x} at offset {offset}: {reason}")]
    InvalidTag { tag: u64, offset: usize, reason: String },

    /// A `string` field holds bytes that are not UTF-8
    #[error("Invalid UTF-8 in {message}.{field} at offset {offset}")]
    InvalidUtf8 {
        message: String,
        field: String,
        offset: usize,
    },

    /// Embedded messages nest deeper than the configured limit
    #[error("Recursion limit exceeded: depth {depth} > {limit} at offset {offset}")]
    RecursionLimitExceeded {
        depth: usize,
        limit: usize,
        offset: usize,
    },

    /// Input larger than the configured maximum
    #[error("Message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// The requested root type is not part of the schema
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// Decoded value rejected by the instance layer
    #[error(transparent)]
    Field(#[from] MessageError),
}

impl DecodeError {
    pub fn truncated_varint(offset: usize, available: usize) -> Self {
        let detail = if available == 0 {
            "input ended before varint".to_string()
        } else if available >= crate::wire::MAX_VARINT_LEN {
            format!("no terminating byte within {} bytes", crate::wire::MAX_VARINT_LEN)
        } else {
            format!("input ended after {available} continuation bytes")
        };
        Self::TruncatedVarint { offset, detail }
    }

    pub fn buffer_underrun(offset: usize, need: usize, remaining: usize, field: u32) -> Self {
        Self::BufferUnderrun {
            offset,
            need,
            remaining,
            field,
        }
    }

    pub fn invalid_tag(tag: u64, offset: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTag {
            tag,
            offset,
            reason: reason.into(),
        }
    }

    /// Byte offset of the failure, where one applies
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedVarint { offset, .. }
            | Self::BufferUnderrun { offset, .. }
            | Self::InvalidTag { offset, .. }
            | Self::InvalidUtf8 { offset, .. }
            | Self::RecursionLimitExceeded { offset, .. } => Some(*offset),
            Self::MessageTooLarge { .. } | Self::UnknownMessageType(_) | Self::Field(_) => None,
        }
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;
