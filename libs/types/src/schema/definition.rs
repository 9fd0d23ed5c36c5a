//! Declarative schema input
//!
//! The definitions here are what a schema compiler hands over: one entry per
//! enum, message and field, with nested types referenced by name. They carry no
//! validation of their own; [`SchemaDef::build`] resolves and checks them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{loader, Schema};
use crate::error::{SchemaError, SchemaResult};

/// Field kind as written in a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindDef {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Bool,
    Double,
    String,
    Bytes,
    Message,
    Enum,
}

impl KindDef {
    pub fn name(&self) -> &'static str {
        match self {
            KindDef::Int32 => "int32",
            KindDef::Int64 => "int64",
            KindDef::Uint32 => "uint32",
            KindDef::Uint64 => "uint64",
            KindDef::Sint32 => "sint32",
            KindDef::Sint64 => "sint64",
            KindDef::Bool => "bool",
            KindDef::Double => "double",
            KindDef::String => "string",
            KindDef::Bytes => "bytes",
            KindDef::Message => "message",
            KindDef::Enum => "enum",
        }
    }
}

/// One field of a message definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub number: u32,
    pub name: String,
    pub kind: KindDef,
    /// Referenced type for `message` and `enum` kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub repeated: bool,
    /// Explicit presence for scalar kinds
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub required: bool,
}

impl FieldDef {
    pub fn new(number: u32, name: impl Into<String>, kind: KindDef) -> Self {
        Self {
            number,
            name: name.into(),
            kind,
            type_name: None,
            repeated: false,
            optional: false,
            required: false,
        }
    }

    pub fn message(number: u32, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::new(number, name, KindDef::Message)
        }
    }

    pub fn enumeration(number: u32, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::new(number, name, KindDef::Enum)
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A message type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl MessageDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// One named enum member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDef {
    pub name: String,
    pub number: i32,
}

/// An enum type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValueDef>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValueDef {
            name: name.into(),
            number,
        });
        self
    }
}

/// The complete declarative input for one schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub messages: Vec<MessageDef>,
}

impl SchemaDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enumeration(mut self, def: EnumDef) -> Self {
        self.enums.push(def);
        self
    }

    pub fn message(mut self, def: MessageDef) -> Self {
        self.messages.push(def);
        self
    }

    /// Append every definition of `other`, e.g. to combine per-file definitions
    pub fn extend(mut self, other: SchemaDef) -> Self {
        self.enums.extend(other.enums);
        self.messages.extend(other.messages);
        self
    }

    /// Parse definitions from TOML (`[[enums]]` / `[[messages]]` tables)
    pub fn from_toml_str(text: &str) -> SchemaResult<Self> {
        toml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    /// Validate and resolve into an immutable, shareable schema
    pub fn build(&self) -> SchemaResult<Arc<Schema>> {
        loader::load(self).map(Arc::new)
    }
}
