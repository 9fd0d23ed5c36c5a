//! # Promowire Codec
//!
//! ## Purpose
//!
//! The wire layer of promowire: turns [`types::Message`] instances into the
//! tag/varint/length-delimited binary format and back, guided entirely by the
//! runtime schema the message carries.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → services/inspector
//!     ↑           ↓
//!  Schema,     wire bytes,
//!  Message     framing
//! ```
//!
//! ## What This Crate Contains
//! - Varint, zig-zag and tag primitives ([`wire`])
//! - A bounds-checked reader with absolute error offsets ([`reader`])
//! - Encoder with exact size precomputation ([`encoder`])
//! - Configurable decoder: size and depth limits, unknown-field policy
//!   ([`Decoder`], [`CodecConfig`])
//! - Length-delimited framing for message streams ([`framing`])
//!
//! ## What This Crate Does NOT Contain
//! - Schema definitions or message storage (belongs in libs/types)
//! - Transport or file handling
//!
//! ## Example
//!
//! ```rust
//! use codec::{encode_to_vec, Decoder};
//! use types::catalog::{self, fields, names};
//!
//! let schema = catalog::schema();
//! let mut content = schema.new_message(names::CONTENT)?;
//! content.set(fields::content::EXTERNAL_CONTENT_ID, "ABC123")?;
//!
//! let bytes = encode_to_vec(&content);
//! assert_eq!(bytes, [0x12, 0x06, b'A', b'B', b'C', b'1', b'2', b'3']);
//!
//! let decoded = Decoder::default().decode_named(&schema, names::CONTENT, &bytes)?;
//! assert_eq!(decoded, content);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod framing;
pub mod reader;
pub mod wire;

pub use config::{CodecConfig, UnknownFieldPolicy};
pub use decoder::{decode, Decoder};
pub use encoder::{encode, encode_to_bytes, encode_to_vec, encoded_len};
pub use error::{DecodeError, DecodeResult};
pub use framing::{encode_length_delimited, encode_length_delimited_to_vec, length_delimited_len};
pub use reader::WireReader;
pub use wire::{WireType, MAX_VARINT_LEN};
