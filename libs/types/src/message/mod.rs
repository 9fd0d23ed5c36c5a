//! # Message Instance Layer
//!
//! One generic [`Message`] type stands in for every schema message type. It
//! pairs a shared descriptor reference (`Arc<Schema>` + [`MessageId`]) with a
//! per-field slot map. A slot is either occupied (value present) or missing
//! (value absent, presence bit clear), so the two can never disagree.
//!
//! ## Presence rules
//!
//! - Explicit-presence fields (embedded messages, `optional` scalars) keep any
//!   value they are given, defaults included.
//! - Implicit-presence scalars treat the kind's default as "absent": setting
//!   one to `0`, `""` or `false` clears the slot. Encoding omits them and
//!   decoding restores the same state.
//! - Repeated fields are present while their list is non-empty.
//!
//! A single instance is not meant for concurrent mutation; the descriptors it
//! points at are immutable and shared freely across threads.

mod display;
mod value;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use value::Value;

use crate::enums::EnumValue;
use crate::error::{MessageError, MessageResult};
use crate::schema::{FieldDescriptor, FieldKind, MessageDescriptor, MessageId, Schema};

/// Raw bytes of fields the decoding schema did not recognize, tag included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFields {
    raw: Vec<u8>,
}

impl UnknownFields {
    /// Append one complete field (tag and value bytes) verbatim
    pub fn push_raw(&mut self, field: &[u8]) {
        self.raw.extend_from_slice(field);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

/// A runtime instance of one schema message type
#[derive(Clone)]
pub struct Message {
    schema: Arc<Schema>,
    type_id: MessageId,
    fields: BTreeMap<u32, Value>,
    unknown: UnknownFields,
}

impl Message {
    /// Empty instance: every field absent, reads return defaults
    pub fn of(schema: &Arc<Schema>, type_id: MessageId) -> Self {
        Self {
            schema: Arc::clone(schema),
            type_id,
            fields: BTreeMap::new(),
            unknown: UnknownFields::default(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn type_id(&self) -> MessageId {
        self.type_id
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        self.schema.message(self.type_id)
    }

    pub fn type_name(&self) -> &str {
        self.descriptor().name()
    }

    /// Field number for a declared field name
    pub fn field_number(&self, name: &str) -> MessageResult<u32> {
        self.descriptor()
            .field_by_name(name)
            .map(|f| f.number)
            .ok_or_else(|| MessageError::NoSuchFieldName {
                message: self.type_name().to_string(),
                name: name.to_string(),
            })
    }

    /// True when the field was explicitly set or decoded (and not since cleared)
    pub fn has(&self, number: u32) -> bool {
        self.fields.contains_key(&number)
    }

    /// Stored value, or the kind's default when absent
    pub fn get(&self, number: u32) -> MessageResult<Cow<'_, Value>> {
        let field = self.field(number)?;
        Ok(match self.fields.get(&number) {
            Some(value) => Cow::Borrowed(value),
            None if field.repeated => Cow::Owned(Value::List(Vec::new())),
            None => Cow::Owned(Value::default_for(field.kind, &self.schema)),
        })
    }

    pub fn get_by_name(&self, name: &str) -> MessageResult<Cow<'_, Value>> {
        self.get(self.field_number(name)?)
    }

    /// Validate `value` against the declared kind and store it
    ///
    /// Repeated fields take a `Value::List`; an empty list clears the field.
    pub fn set(&mut self, number: u32, value: impl Into<Value>) -> MessageResult<()> {
        let value = value.into();
        let schema = Arc::clone(&self.schema);
        let descriptor = schema.message(self.type_id);
        let field = lookup(descriptor, number)?;

        if field.repeated {
            let Value::List(items) = &value else {
                return Err(type_mismatch(descriptor, field, &format!("list of {}", field.kind.name()), value.kind_name()));
            };
            for item in items {
                check_item(&schema, descriptor, field, item)?;
            }
        } else {
            check_item(&schema, descriptor, field, &value)?;
        }

        if !field.tracks_presence() && value.is_default() {
            self.fields.remove(&number);
        } else {
            self.fields.insert(number, value);
        }
        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: impl Into<Value>) -> MessageResult<()> {
        let number = self.field_number(name)?;
        self.set(number, value)
    }

    /// Builder-style `set`
    pub fn with(mut self, number: u32, value: impl Into<Value>) -> MessageResult<Self> {
        self.set(number, value)?;
        Ok(self)
    }

    /// Store any integer in an enum field, declared member or not
    pub fn set_enum_raw(&mut self, number: u32, raw: i32) -> MessageResult<()> {
        self.set(number, Value::Enum(raw))
    }

    /// Append one item to a repeated field
    pub fn push(&mut self, number: u32, item: impl Into<Value>) -> MessageResult<()> {
        let item = item.into();
        let schema = Arc::clone(&self.schema);
        let descriptor = schema.message(self.type_id);
        let field = lookup(descriptor, number)?;

        if !field.repeated {
            return Err(MessageError::NotRepeated {
                message: descriptor.name().to_string(),
                field: field.name.clone(),
            });
        }
        check_item(&schema, descriptor, field, &item)?;

        match self.fields.entry(number).or_insert_with(|| Value::List(Vec::new())) {
            Value::List(items) => {
                items.push(item);
                Ok(())
            }
            other => Err(type_mismatch(descriptor, field, "list", other.kind_name())),
        }
    }

    /// Remove value and presence; returns whether anything was stored
    pub fn clear_field(&mut self, number: u32) -> bool {
        self.fields.remove(&number).is_some()
    }

    /// Remove every field and all unknown bytes
    pub fn clear(&mut self) {
        self.fields.clear();
        self.unknown.clear();
    }

    /// No fields present and no unknown bytes retained
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.unknown.is_empty()
    }

    pub fn get_i64(&self, number: u32) -> MessageResult<i64> {
        let value = self.singular(number, "signed integer", |k| {
            matches!(k, FieldKind::Int32 | FieldKind::Int64 | FieldKind::SInt32 | FieldKind::SInt64)
        })?;
        Ok(match value {
            Some(Value::Int(v)) => *v,
            _ => 0,
        })
    }

    pub fn get_u64(&self, number: u32) -> MessageResult<u64> {
        let value = self.singular(number, "unsigned integer", |k| {
            matches!(k, FieldKind::UInt32 | FieldKind::UInt64)
        })?;
        Ok(match value {
            Some(Value::UInt(v)) => *v,
            _ => 0,
        })
    }

    pub fn get_bool(&self, number: u32) -> MessageResult<bool> {
        let value = self.singular(number, "bool", |k| k == FieldKind::Bool)?;
        Ok(matches!(value, Some(Value::Bool(true))))
    }

    pub fn get_f64(&self, number: u32) -> MessageResult<f64> {
        let value = self.singular(number, "double", |k| k == FieldKind::Double)?;
        Ok(match value {
            Some(Value::Double(v)) => *v,
            _ => 0.0,
        })
    }

    pub fn get_str(&self, number: u32) -> MessageResult<&str> {
        let value = self.singular(number, "string", |k| k == FieldKind::String)?;
        Ok(match value {
            Some(Value::String(v)) => v,
            _ => "",
        })
    }

    pub fn get_bytes(&self, number: u32) -> MessageResult<&[u8]> {
        let value = self.singular(number, "bytes", |k| k == FieldKind::Bytes)?;
        Ok(match value {
            Some(Value::Bytes(v)) => v,
            _ => &[],
        })
    }

    /// Raw integer plus symbol; unrecognized values are reported, not rejected
    pub fn get_enum(&self, number: u32) -> MessageResult<EnumValue<'_>> {
        let field = self.field(number)?;
        let FieldKind::Enum(enum_id) = field.kind else {
            return Err(type_mismatch(self.descriptor(), field, "enum", field.kind.name()));
        };
        if field.repeated {
            return Err(type_mismatch(self.descriptor(), field, "singular enum", "list"));
        }
        let raw = match self.fields.get(&number) {
            Some(Value::Enum(raw)) => *raw,
            _ => 0,
        };
        Ok(self.schema.enumeration(enum_id).resolve(raw))
    }

    /// Embedded message if present
    pub fn message(&self, number: u32) -> MessageResult<Option<&Message>> {
        let value = self.singular(number, "message", |k| matches!(k, FieldKind::Message(_)))?;
        Ok(value.and_then(Value::as_message))
    }

    /// Mutable embedded message, created empty (and marked present) if absent
    pub fn message_mut(&mut self, number: u32) -> MessageResult<&mut Message> {
        let schema = Arc::clone(&self.schema);
        let descriptor = schema.message(self.type_id);
        let field = lookup(descriptor, number)?;
        let FieldKind::Message(target) = field.kind else {
            return Err(type_mismatch(descriptor, field, "message", field.kind.name()));
        };
        if field.repeated {
            return Err(type_mismatch(descriptor, field, "singular message", "list"));
        }

        match self
            .fields
            .entry(number)
            .or_insert_with(|| Value::Message(Message::of(&schema, target)))
        {
            Value::Message(m) => Ok(m),
            other => Err(type_mismatch(descriptor, field, "message", other.kind_name())),
        }
    }

    /// Items of a repeated field; empty when absent
    pub fn list(&self, number: u32) -> MessageResult<&[Value]> {
        let field = self.field(number)?;
        if !field.repeated {
            return Err(MessageError::NotRepeated {
                message: self.type_name().to_string(),
                field: field.name.clone(),
            });
        }
        Ok(self.fields.get(&number).and_then(Value::as_list).unwrap_or(&[]))
    }

    /// Present fields in ascending field-number order
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> + '_ {
        let descriptor = self.descriptor();
        self.fields
            .iter()
            .filter_map(move |(number, value)| descriptor.field(*number).map(|f| (f, value)))
    }

    pub fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown
    }

    pub fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown
    }

    /// Merge the present fields of `other` into `self`
    ///
    /// Singular scalars overwrite, embedded messages merge recursively,
    /// repeated fields append, unknown bytes append. Fields absent from
    /// `other` (including implicit scalars at their default) are untouched.
    /// `Decoder::merge` follows the wire instead.
    pub fn merge_from(&mut self, other: Message) -> MessageResult<()> {
        if other.type_id != self.type_id || !Arc::ptr_eq(&other.schema, &self.schema) {
            return Err(MessageError::TypeMismatch {
                message: self.type_name().to_string(),
                field: "<self>".to_string(),
                expected: format!("message {}", self.type_name()),
                got: format!("message {}", other.type_name()),
            });
        }

        let Message { fields, unknown, .. } = other;
        for (number, incoming) in fields {
            match (self.fields.get_mut(&number), incoming) {
                (Some(Value::List(items)), Value::List(more)) => items.extend(more),
                (Some(Value::Message(existing)), Value::Message(child)) => existing.merge_from(child)?,
                (_, incoming) => {
                    self.fields.insert(number, incoming);
                }
            }
        }
        self.unknown.push_raw(unknown.as_bytes());
        Ok(())
    }

    fn field(&self, number: u32) -> MessageResult<&FieldDescriptor> {
        lookup(self.descriptor(), number)
    }

    fn singular(
        &self,
        number: u32,
        expected: &str,
        accepts: impl Fn(FieldKind) -> bool,
    ) -> MessageResult<Option<&Value>> {
        let field = self.field(number)?;
        if field.repeated || !accepts(field.kind) {
            let got = if field.repeated { "list" } else { field.kind.name() };
            return Err(type_mismatch(self.descriptor(), field, expected, got));
        }
        Ok(self.fields.get(&number))
    }
}

fn lookup(descriptor: &MessageDescriptor, number: u32) -> MessageResult<&FieldDescriptor> {
    descriptor.field(number).ok_or_else(|| MessageError::NoSuchField {
        message: descriptor.name().to_string(),
        number,
    })
}

fn type_mismatch(descriptor: &MessageDescriptor, field: &FieldDescriptor, expected: &str, got: &str) -> MessageError {
    MessageError::TypeMismatch {
        message: descriptor.name().to_string(),
        field: field.name.clone(),
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

/// Check one non-list value against the field's element kind
fn check_item(
    schema: &Arc<Schema>,
    descriptor: &MessageDescriptor,
    field: &FieldDescriptor,
    value: &Value,
) -> MessageResult<()> {
    let out_of_range = |shown: String| MessageError::OutOfRange {
        message: descriptor.name().to_string(),
        field: field.name.clone(),
        kind: field.kind.name().to_string(),
        value: shown,
    };

    match (field.kind, value) {
        (FieldKind::Int32 | FieldKind::SInt32, Value::Int(v)) => {
            i32::try_from(*v).map(|_| ()).map_err(|_| out_of_range(v.to_string()))
        }
        (FieldKind::UInt32, Value::UInt(v)) => {
            u32::try_from(*v).map(|_| ()).map_err(|_| out_of_range(v.to_string()))
        }
        (FieldKind::Int64 | FieldKind::SInt64, Value::Int(_))
        | (FieldKind::UInt64, Value::UInt(_))
        | (FieldKind::Bool, Value::Bool(_))
        | (FieldKind::Double, Value::Double(_))
        | (FieldKind::String, Value::String(_))
        | (FieldKind::Bytes, Value::Bytes(_))
        | (FieldKind::Enum(_), Value::Enum(_)) => Ok(()),
        (FieldKind::Message(target), Value::Message(m)) => {
            if m.type_id == target && Arc::ptr_eq(&m.schema, schema) {
                Ok(())
            } else {
                Err(type_mismatch(
                    descriptor,
                    field,
                    &format!("message {}", schema.message(target).name()),
                    &format!("message {}", m.type_name()),
                ))
            }
        }
        (kind, other) => Err(type_mismatch(descriptor, field, kind.name(), other.kind_name())),
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema)
            && self.type_id == other.type_id
            && self.fields == other.fields
            && self.unknown == other.unknown
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("type", &self.type_name())
            .field("fields", &self.fields)
            .field("unknown_bytes", &self.unknown.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::EnumSymbol;
    use crate::schema::{EnumDef, FieldDef, KindDef, MessageDef, Presence, SchemaDef};

    fn schema() -> Arc<Schema> {
        SchemaDef::new()
            .enumeration(
                EnumDef::new("BidType")
                    .value("UNKNOWN_BID_TYPE", 0)
                    .value("CPM", 1)
                    .value("CPC", 2),
            )
            .message(MessageDef::new("Content").field(FieldDef::new(2, "external_content_id", KindDef::String)))
            .message(MessageDef::new("Account").field(FieldDef::new(1, "id", KindDef::Uint64)))
            .message(
                MessageDef::new("Promotion")
                    .field(FieldDef::message(2, "content", "Content"))
                    .field(FieldDef::enumeration(3, "bid_type", "BidType"))
                    .field(FieldDef::new(4, "bid_amount", KindDef::Double))
                    .field(FieldDef::new(5, "priority", KindDef::Int32))
                    .field(FieldDef::new(6, "tags", KindDef::String).repeated())
                    .field(FieldDef::new(7, "budget", KindDef::Uint64).optional()),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_absent_fields_read_defaults() {
        let schema = schema();
        let promotion = schema.new_message("Promotion").unwrap();

        assert!(!promotion.has(4));
        assert_eq!(promotion.get_f64(4).unwrap(), 0.0);
        assert_eq!(promotion.get_i64(5).unwrap(), 0);
        assert!(promotion.message(2).unwrap().is_none());
        assert_eq!(*promotion.get(6).unwrap(), Value::List(vec![]));
        match promotion.get(2).unwrap().as_ref() {
            Value::Message(content) => assert!(content.is_empty()),
            other => panic!("expected default message, got {other:?}"),
        }
    }

    #[test]
    fn test_set_and_get() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();

        promotion.set(4, 1.25).unwrap();
        promotion.set(5, -3i64).unwrap();
        promotion.set_by_name("bid_type", Value::Enum(2)).unwrap();

        assert!(promotion.has(4));
        assert_eq!(promotion.get_f64(4).unwrap(), 1.25);
        assert_eq!(promotion.get_i64(5).unwrap(), -3);
        assert_eq!(promotion.get_enum(3).unwrap().symbol, EnumSymbol::Known("CPC"));
    }

    #[test]
    fn test_type_mismatch() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();

        let err = promotion.set(4, "not a double").unwrap_err();
        assert!(matches!(
            err,
            MessageError::TypeMismatch { ref expected, ref got, .. } if expected == "double" && got == "string"
        ));
        assert!(!promotion.has(4));

        // wrong embedded message type
        let account = schema.new_message("Account").unwrap();
        assert!(matches!(promotion.set(2, account), Err(MessageError::TypeMismatch { .. })));

        // typed getter on the wrong kind
        assert!(promotion.get_str(4).is_err());
    }

    #[test]
    fn test_out_of_range_int32() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();

        let err = promotion.set(5, i64::from(i32::MAX) + 1).unwrap_err();
        assert!(matches!(err, MessageError::OutOfRange { .. }));
    }

    #[test]
    fn test_unknown_field_number() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();

        assert_eq!(
            promotion.set(99, 1u64).unwrap_err(),
            MessageError::NoSuchField { message: "Promotion".into(), number: 99 }
        );
        assert!(!promotion.has(99));
    }

    #[test]
    fn test_implicit_default_clears() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();

        promotion.set(5, 7i64).unwrap();
        assert!(promotion.has(5));
        promotion.set(5, 0i64).unwrap();
        assert!(!promotion.has(5));
    }

    #[test]
    fn test_explicit_presence_keeps_default() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();

        assert_eq!(promotion.descriptor().field(7).unwrap().presence, Presence::Explicit);
        promotion.set(7, 0u64).unwrap();
        assert!(promotion.has(7));

        let content = schema.new_message("Content").unwrap();
        promotion.set(2, content).unwrap();
        assert!(promotion.has(2));
        assert!(promotion.message(2).unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_clear_field_removes_presence() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();

        promotion.message_mut(2).unwrap().set(2, "ABC123").unwrap();
        assert!(promotion.has(2));
        assert!(promotion.clear_field(2));
        assert!(!promotion.has(2));
        assert!(!promotion.clear_field(2));
    }

    #[test]
    fn test_enum_raw_value_preserved() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();

        promotion.set_enum_raw(3, 42).unwrap();
        let bid_type = promotion.get_enum(3).unwrap();
        assert_eq!(bid_type.raw, 42);
        assert!(!bid_type.is_valid());
        assert_eq!(bid_type.symbol, EnumSymbol::Unrecognized);
    }

    #[test]
    fn test_repeated_fields() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();

        promotion.push(6, "summer").unwrap();
        promotion.push(6, "sale").unwrap();
        assert_eq!(promotion.list(6).unwrap().len(), 2);

        assert!(matches!(promotion.push(5, 1i64), Err(MessageError::NotRepeated { .. })));
        assert!(matches!(promotion.push(6, 1i64), Err(MessageError::TypeMismatch { .. })));
        assert!(matches!(promotion.set(6, "single"), Err(MessageError::TypeMismatch { .. })));

        promotion.set(6, Value::List(vec![])).unwrap();
        assert!(!promotion.has(6));
    }

    #[test]
    fn test_merge_from() {
        let schema = schema();
        let mut base = schema.new_message("Promotion").unwrap();
        base.set(4, 1.0).unwrap();
        base.push(6, "a").unwrap();
        base.message_mut(2).unwrap().set(2, "OLD").unwrap();

        let mut update = schema.new_message("Promotion").unwrap();
        update.set(4, 2.0).unwrap();
        update.push(6, "b").unwrap();
        update.set(5, 9i64).unwrap();
        update.unknown_fields_mut().push_raw(&[0x50, 0x01]);

        base.merge_from(update).unwrap();

        assert_eq!(base.get_f64(4).unwrap(), 2.0);
        assert_eq!(base.get_i64(5).unwrap(), 9);
        assert_eq!(base.list(6).unwrap(), &[Value::from("a"), Value::from("b")]);
        assert_eq!(base.message(2).unwrap().unwrap().get_str(2).unwrap(), "OLD");
        assert_eq!(base.unknown_fields().as_bytes(), &[0x50, 0x01]);
    }

    #[test]
    fn test_merge_rejects_other_type() {
        let schema = schema();
        let mut promotion = schema.new_message("Promotion").unwrap();
        let account = schema.new_message("Account").unwrap();
        assert!(promotion.merge_from(account).is_err());
    }

    #[test]
    fn test_message_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Message>();
        assert_send_sync::<Schema>();
    }
}
