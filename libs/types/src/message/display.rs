//! Human-readable text form of a message
//!
//! `Content { status: ACTIVE, external_content_id: "ABC123" }`
//!
//! Enum values print by member name, or as the raw integer when unrecognized.
//! Bytes print as `0x`-prefixed hex. Retained unknown bytes are counted, not
//! dumped.

use std::fmt;

use super::{Message, Value};
use crate::schema::{FieldDescriptor, FieldKind};

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.type_name())?;

        let mut first = true;
        for (field, value) in self.fields() {
            f.write_str(if first { " " } else { ", " })?;
            first = false;
            write!(f, "{}: ", field.name)?;
            self.write_value(f, field, value)?;
        }

        if !self.unknown.is_empty() {
            f.write_str(if first { " " } else { ", " })?;
            first = false;
            write!(f, ".. {} unknown bytes", self.unknown.len())?;
        }

        f.write_str(if first { "}" } else { " }" })
    }
}

impl Message {
    fn write_value(&self, f: &mut fmt::Formatter<'_>, field: &FieldDescriptor, value: &Value) -> fmt::Result {
        match value {
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Bytes(v) => write!(f, "0x{}", hex::encode(v)),
            Value::Enum(raw) => match field.kind {
                FieldKind::Enum(id) => write!(f, "{}", self.schema.enumeration(id).resolve(*raw)),
                _ => write!(f, "{raw}"),
            },
            Value::Message(m) => write!(f, "{m}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    self.write_value(f, field, item)?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::{EnumDef, FieldDef, KindDef, MessageDef, SchemaDef};

    #[test]
    fn test_display_text_form() {
        let schema = SchemaDef::new()
            .enumeration(EnumDef::new("Status").value("UNKNOWN_STATUS", 0).value("ACTIVE", 1))
            .message(
                MessageDef::new("Content")
                    .field(FieldDef::enumeration(1, "status", "Status"))
                    .field(FieldDef::new(2, "external_content_id", KindDef::String))
                    .field(FieldDef::new(3, "thumbnail", KindDef::Bytes))
                    .field(FieldDef::new(4, "scores", KindDef::Double).repeated()),
            )
            .build()
            .unwrap();

        let mut content = schema.new_message("Content").unwrap();
        assert_eq!(content.to_string(), "Content {}");

        content.set_enum_raw(1, 1).unwrap();
        content.set(2, "ABC123").unwrap();
        assert_eq!(content.to_string(), r#"Content { status: ACTIVE, external_content_id: "ABC123" }"#);

        content.set_enum_raw(1, 9).unwrap();
        content.set(3, vec![0xde, 0xad]).unwrap();
        content.push(4, 1.5).unwrap();
        content.push(4, 2.0).unwrap();
        content.unknown_fields_mut().push_raw(&[0x28, 0x01]);
        assert_eq!(
            content.to_string(),
            r#"Content { status: 9, external_content_id: "ABC123", thumbnail: 0xdead, scores: [1.5, 2.0], .. 2 unknown bytes }"#
        );
    }
}
