//! Resolved, immutable schema descriptors

use std::collections::HashMap;
use std::fmt;

/// Index of a message type inside its [`Schema`](super::Schema)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub(crate) usize);

/// Index of an enum type inside its [`Schema`](super::Schema)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(pub(crate) usize);

/// Declared shape of a field's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    /// Zig-zag encoded signed 32-bit
    SInt32,
    /// Zig-zag encoded signed 64-bit
    SInt64,
    Bool,
    Double,
    String,
    Bytes,
    Message(MessageId),
    Enum(EnumId),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::SInt32 => "sint32",
            FieldKind::SInt64 => "sint64",
            FieldKind::Bool => "bool",
            FieldKind::Double => "double",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Message(_) => "message",
            FieldKind::Enum(_) => "enum",
        }
    }

    /// Kinds whose values are varint-encoded on the wire
    pub fn is_varint(&self) -> bool {
        matches!(
            self,
            FieldKind::Int32
                | FieldKind::Int64
                | FieldKind::UInt32
                | FieldKind::UInt64
                | FieldKind::SInt32
                | FieldKind::SInt64
                | FieldKind::Bool
                | FieldKind::Enum(_)
        )
    }

    /// Kinds that a repeated field may pack into one length-delimited run
    pub fn is_packable(&self) -> bool {
        self.is_varint() || matches!(self, FieldKind::Double)
    }

    pub fn is_length_delimited(&self) -> bool {
        matches!(
            self,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message(_)
        )
    }
}

/// Whether a field distinguishes "set to default" from "never set"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// Default value means absent; omitted from the wire
    Implicit,
    /// Presence bit tracked independently of the value
    Explicit,
}

/// One field of a message type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub number: u32,
    pub name: String,
    pub kind: FieldKind,
    pub repeated: bool,
    pub presence: Presence,
    pub required: bool,
}

impl FieldDescriptor {
    pub fn tracks_presence(&self) -> bool {
        !self.repeated && self.presence == Presence::Explicit
    }
}

/// One message type: its name and fields ordered by field number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub(crate) id: MessageId,
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) by_number: HashMap<u32, usize>,
    pub(crate) by_name: HashMap<String, usize>,
}

impl MessageDescriptor {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in ascending field-number order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.by_number.get(&number).map(|&i| &self.fields[i])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }
}

impl fmt::Display for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message {} ({} fields)", self.name, self.fields.len())
    }
}

/// One enum type: a closed set of named integers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub(crate) id: EnumId,
    pub(crate) name: String,
    /// (number, name) in declaration order
    pub(crate) values: Vec<(i32, String)>,
    pub(crate) by_number: HashMap<i32, usize>,
}

impl EnumDescriptor {
    pub fn id(&self) -> EnumId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> impl Iterator<Item = (i32, &str)> + '_ {
        self.values.iter().map(|(n, s)| (*n, s.as_str()))
    }
}
