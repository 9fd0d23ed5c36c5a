//! Schema and message-layer errors
//!
//! `SchemaError` is raised once, while a schema is loaded, and is fatal for the
//! schema being built. `MessageError` is raised by the message instance layer
//! when a caller addresses a field that does not exist or hands it a value of
//! the wrong kind.

use thiserror::Error;

/// Errors raised while turning schema definitions into descriptors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two message or enum types share a name
    #[error("Duplicate type name '{name}': message and enum names must be unique within a schema")]
    DuplicateTypeName { name: String },

    /// A field number is used twice inside one message type
    #[error("Duplicate field number {number} in message '{message}' (fields '{first}' and '{second}')")]
    DuplicateFieldNumber {
        message: String,
        number: u32,
        first: String,
        second: String,
    },

    /// A field name is used twice inside one message type
    #[error("Duplicate field name '{field}' in message '{message}'")]
    DuplicateFieldName { message: String, field: String },

    /// Field number outside the encodable range or inside the reserved block
    #[error("Invalid field number {number} for '{message}.{field}': {reason}")]
    InvalidFieldNumber {
        message: String,
        field: String,
        number: u32,
        reason: String,
    },

    /// A message or enum field references a type that was never defined
    #[error("Undefined type '{referenced}' referenced by '{message}.{field}'")]
    UndefinedType {
        message: String,
        field: String,
        referenced: String,
    },

    /// A message or enum field carries no type reference at all
    #[error("Field '{message}.{field}' of kind {kind} needs a type_name")]
    MissingTypeReference {
        message: String,
        field: String,
        kind: String,
    },

    /// Reference resolves, but to the wrong category (enum used as message or vice versa)
    #[error("Field '{message}.{field}' expects {expected} type but '{referenced}' is {actual}")]
    WrongTypeCategory {
        message: String,
        field: String,
        referenced: String,
        expected: String,
        actual: String,
    },

    /// Enum has no members at all
    #[error("Enum '{name}' defines no values")]
    EmptyEnum { name: String },

    /// Enum does not define the conventional zero/default member
    #[error("Enum '{name}' must define value 0 as its default member")]
    MissingZeroValue { name: String },

    /// Enum assigns the same integer to two members
    #[error("Enum '{name}' assigns value {number} to both '{first}' and '{second}'")]
    DuplicateEnumValue {
        name: String,
        number: i32,
        first: String,
        second: String,
    },

    /// Required embeddings form a cycle, so no finite instance can satisfy the schema
    #[error("Cycle among required message fields: {}", path.join(" -> "))]
    RequiredCycle { path: Vec<String> },

    /// Declarative schema text could not be parsed
    #[error("Schema definition parse error: {0}")]
    Parse(String),
}

impl SchemaError {
    /// Build an `InvalidFieldNumber` error with the reason derived from the number
    pub fn invalid_field_number(message: &str, field: &str, number: u32) -> Self {
        let reason = if number == 0 {
            "field numbers start at 1"
        } else if (crate::schema::RESERVED_FIELD_NUMBERS).contains(&number) {
            "19000-19999 is reserved by the wire format"
        } else {
            "exceeds the maximum field number 536870911"
        };

        Self::InvalidFieldNumber {
            message: message.to_string(),
            field: field.to_string(),
            number,
            reason: reason.to_string(),
        }
    }
}

/// Errors raised by the message instance layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Field number is not declared on this message type
    #[error("Message '{message}' has no field number {number}")]
    NoSuchField { message: String, number: u32 },

    /// Field name is not declared on this message type
    #[error("Message '{message}' has no field named '{name}'")]
    NoSuchFieldName { message: String, name: String },

    /// Value kind disagrees with the field's declared kind
    #[error("Type mismatch for '{message}.{field}': expected {expected}, got {got}")]
    TypeMismatch {
        message: String,
        field: String,
        expected: String,
        got: String,
    },

    /// Value has the right kind but does not fit the declared width
    #[error("Value {value} out of range for '{message}.{field}' ({kind})")]
    OutOfRange {
        message: String,
        field: String,
        kind: String,
        value: String,
    },

    /// List operation on a singular field
    #[error("Field '{message}.{field}' is not repeated")]
    NotRepeated { message: String, field: String },

    /// Message type name not present in the schema
    #[error("Unknown message type '{0}'")]
    UnknownMessageType(String),
}

/// Result type for schema loading
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Result type for message field access
pub type MessageResult<T> = std::result::Result<T, MessageError>;
