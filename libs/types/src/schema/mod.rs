//! # Schema Model
//!
//! Descriptors for message and enum types, built once from declarative
//! definitions and then shared read-only (`Arc<Schema>`) by every encode,
//! decode and message instance.
//!
//! ```text
//! SchemaDef (names) → [loader: check + resolve] → Schema (ids)
//!                                                   ↓
//!                               Message instances, Wire codec
//! ```
//!
//! Type references are resolved to [`MessageId`] / [`EnumId`] indices, so
//! recursive message types are representable; only cycles through `required`
//! embeddings are rejected.

mod definition;
mod descriptor;
mod loader;

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

pub use definition::{EnumDef, EnumValueDef, FieldDef, KindDef, MessageDef, SchemaDef};
pub use descriptor::{
    EnumDescriptor, EnumId, FieldDescriptor, FieldKind, MessageDescriptor, MessageId, Presence,
};

use crate::error::{MessageError, MessageResult};
use crate::message::Message;

/// Largest field number the tag encoding can carry (29 bits)
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Field numbers reserved by the wire format implementation
pub const RESERVED_FIELD_NUMBERS: RangeInclusive<u32> = 19000..=19999;

/// A loaded, validated set of message and enum descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    messages: Vec<MessageDescriptor>,
    enums: Vec<EnumDescriptor>,
    message_index: HashMap<String, MessageId>,
    enum_index: HashMap<String, EnumId>,
}

impl Schema {
    /// Message descriptor for an id issued by this schema
    pub fn message(&self, id: MessageId) -> &MessageDescriptor {
        &self.messages[id.0]
    }

    /// Message descriptor for an id that may come from another schema
    pub fn get_message(&self, id: MessageId) -> Option<&MessageDescriptor> {
        self.messages.get(id.0)
    }

    /// Enum descriptor for an id issued by this schema
    pub fn enumeration(&self, id: EnumId) -> &EnumDescriptor {
        &self.enums[id.0]
    }

    pub fn message_id(&self, name: &str) -> Option<MessageId> {
        self.message_index.get(name).copied()
    }

    pub fn enum_id(&self, name: &str) -> Option<EnumId> {
        self.enum_index.get(name).copied()
    }

    pub fn message_by_name(&self, name: &str) -> Option<&MessageDescriptor> {
        self.message_id(name).map(|id| self.message(id))
    }

    pub fn enum_by_name(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enum_id(name).map(|id| self.enumeration(id))
    }

    /// Message descriptors in definition order
    pub fn messages(&self) -> &[MessageDescriptor] {
        &self.messages
    }

    /// Enum descriptors in definition order
    pub fn enums(&self) -> &[EnumDescriptor] {
        &self.enums
    }

    /// Empty instance of the named message type
    pub fn new_message(self: &Arc<Self>, name: &str) -> MessageResult<Message> {
        let id = self
            .message_id(name)
            .ok_or_else(|| MessageError::UnknownMessageType(name.to_string()))?;
        Ok(Message::of(self, id))
    }
}
