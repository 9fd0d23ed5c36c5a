//! Field values held by a message instance

use std::sync::Arc;

use super::Message;
use crate::schema::{FieldKind, Schema};

/// A single field value
///
/// Signed integer kinds (`int32`, `int64`, `sint32`, `sint64`) share
/// `Int`; unsigned kinds share `UInt`. The field descriptor decides the wire
/// encoding. Repeated fields hold a `List` whose items are never lists.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Bool(bool),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Raw enum integer, recognized or not
    Enum(i32),
    Message(Message),
    List(Vec<Value>),
}

impl Value {
    /// Short kind label used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Bool(_) => "bool",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
        }
    }

    /// Whether this equals the zero value of its kind
    ///
    /// Doubles compare by bit pattern so `-0.0` is not a default.
    pub fn is_default(&self) -> bool {
        match self {
            Value::Int(v) => *v == 0,
            Value::UInt(v) => *v == 0,
            Value::Bool(v) => !*v,
            Value::Double(v) => v.to_bits() == 0,
            Value::String(v) => v.is_empty(),
            Value::Bytes(v) => v.is_empty(),
            Value::Enum(v) => *v == 0,
            Value::List(v) => v.is_empty(),
            Value::Message(_) => false,
        }
    }

    /// Zero value for a field kind; an empty instance for message kinds
    pub fn default_for(kind: FieldKind, schema: &Arc<Schema>) -> Value {
        match kind {
            FieldKind::Int32 | FieldKind::Int64 | FieldKind::SInt32 | FieldKind::SInt64 => Value::Int(0),
            FieldKind::UInt32 | FieldKind::UInt64 => Value::UInt(0),
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Double => Value::Double(0.0),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Bytes => Value::Bytes(Vec::new()),
            FieldKind::Enum(_) => Value::Enum(0),
            FieldKind::Message(id) => Value::Message(Message::of(schema, id)),
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Doubles compare by bit pattern, so NaN equals itself and `-0.0 != 0.0`
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Message(a), Value::Message(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Message> for Value {
    fn from(v: Message) -> Self {
        Value::Message(v)
    }
}
