//! # Promowire Types Library
//!
//! Schema model, enum validation and the generic message instance layer for
//! the promowire binary message format.
//!
//! ## Design Philosophy
//!
//! - **Schema as data**: message and enum types are descriptors built at
//!   runtime from [`SchemaDef`], not generated code
//! - **Shared, immutable descriptors**: a validated [`Schema`] is wrapped in an
//!   `Arc` and referenced by every message instance
//! - **Open enums**: any integer is storable in an enum field; symbols are a
//!   view, never a filter
//! - **Presence without sentinels**: a field slot is either occupied or
//!   missing
//!
//! ## Quick Start
//!
//! ```rust
//! use types::catalog::{self, fields, names, Status};
//!
//! let schema = catalog::schema();
//! let mut content = schema.new_message(names::CONTENT)?;
//! content.set(fields::content::STATUS, Status::Active)?;
//! content.set(fields::content::EXTERNAL_CONTENT_ID, "ABC123")?;
//!
//! assert_eq!(
//!     content.to_string(),
//!     r#"Content { status: ACTIVE, external_content_id: "ABC123" }"#
//! );
//! # Ok::<(), types::MessageError>(())
//! ```
//!
//! ### Custom schemas
//! ```rust
//! use types::{FieldDef, KindDef, MessageDef, SchemaDef};
//!
//! let schema = SchemaDef::new()
//!     .message(MessageDef::new("Point").field(FieldDef::new(1, "x", KindDef::Sint64)))
//!     .build()?;
//! assert!(schema.message_by_name("Point").is_some());
//! # Ok::<(), types::SchemaError>(())
//! ```
//!
//! Encoding and decoding live in the `codec` crate.

#[cfg(feature = "catalog")]
pub mod catalog;
pub mod enums;
pub mod error;
pub mod message;
pub mod schema;

pub use enums::{EnumSymbol, EnumValue, UNRECOGNIZED};
pub use error::{MessageError, MessageResult, SchemaError, SchemaResult};
pub use message::{Message, UnknownFields, Value};
pub use schema::{
    EnumDef, EnumDescriptor, EnumId, EnumValueDef, FieldDef, FieldDescriptor, FieldKind, KindDef,
    MessageDef, MessageDescriptor, MessageId, Presence, Schema, SchemaDef, MAX_FIELD_NUMBER,
    RESERVED_FIELD_NUMBERS,
};
