//! # Encoder
//!
//! Serializes a [`Message`] into wire bytes:
//!
//! - present fields in ascending field-number order, then retained unknown
//!   bytes verbatim
//! - numeric repeated fields as one packed length-delimited run, other
//!   repeated fields as one tagged entry per item
//! - `int32`/`int64`/enum negatives sign-extended to a 10-byte varint,
//!   `sint*` zig-zag, `double` as 8 little-endian bytes
//!
//! Encoding cannot fail: every stored value was validated against its field
//! kind when it was set.

use bytes::{BufMut, Bytes, BytesMut};
use types::{FieldDescriptor, FieldKind, Message, Value};

use crate::wire::{
    encode_tag, encode_varint, encode_zigzag, encoded_len_tag, encoded_len_varint, WireType,
};

/// Append the encoding of `message` to `buf`
pub fn encode(message: &Message, buf: &mut impl BufMut) {
    for (field, value) in message.fields() {
        encode_field(field, value, buf);
    }
    buf.put_slice(message.unknown_fields().as_bytes());
}

pub fn encode_to_vec(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(message));
    encode(message, &mut buf);
    buf
}

pub fn encode_to_bytes(message: &Message) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_len(message));
    encode(message, &mut buf);
    buf.freeze()
}

/// Exact number of bytes [`encode`] would write
pub fn encoded_len(message: &Message) -> usize {
    let known: usize = message
        .fields()
        .map(|(field, value)| encoded_len_field(field, value))
        .sum();
    known + message.unknown_fields().len()
}

fn encode_field(field: &FieldDescriptor, value: &Value, buf: &mut impl BufMut) {
    match value {
        Value::List(items) if field.kind.is_packable() => {
            encode_tag(field.number, WireType::LengthDelimited, buf);
            let payload: usize = items.iter().map(|v| encoded_len_value(field.kind, v)).sum();
            encode_varint(payload as u64, buf);
            for item in items {
                encode_value(field.kind, item, buf);
            }
        }
        Value::List(items) => {
            for item in items {
                encode_tag(field.number, wire_type_of(field.kind), buf);
                encode_value(field.kind, item, buf);
            }
        }
        single => {
            encode_tag(field.number, wire_type_of(field.kind), buf);
            encode_value(field.kind, single, buf);
        }
    }
}

fn encoded_len_field(field: &FieldDescriptor, value: &Value) -> usize {
    let tag = encoded_len_tag(field.number);
    match value {
        Value::List(items) if field.kind.is_packable() => {
            let payload: usize = items.iter().map(|v| encoded_len_value(field.kind, v)).sum();
            tag + encoded_len_varint(payload as u64) + payload
        }
        Value::List(items) => items.iter().map(|v| tag + encoded_len_value(field.kind, v)).sum(),
        single => tag + encoded_len_value(field.kind, single),
    }
}

fn wire_type_of(kind: FieldKind) -> WireType {
    if kind.is_varint() {
        WireType::Varint
    } else if kind == FieldKind::Double {
        WireType::Fixed64
    } else {
        WireType::LengthDelimited
    }
}

fn int_to_wire(kind: FieldKind, v: i64) -> u64 {
    match kind {
        FieldKind::SInt32 | FieldKind::SInt64 => encode_zigzag(v),
        _ => v as u64,
    }
}

/// Encode one value without its tag
fn encode_value(kind: FieldKind, value: &Value, buf: &mut impl BufMut) {
    match value {
        Value::Int(v) => encode_varint(int_to_wire(kind, *v), buf),
        Value::UInt(v) => encode_varint(*v, buf),
        Value::Bool(v) => encode_varint(u64::from(*v), buf),
        Value::Enum(v) => encode_varint(i64::from(*v) as u64, buf),
        Value::Double(v) => buf.put_f64_le(*v),
        Value::String(s) => {
            encode_varint(s.len() as u64, buf);
            buf.put_slice(s.as_bytes());
        }
        Value::Bytes(b) => {
            encode_varint(b.len() as u64, buf);
            buf.put_slice(b);
        }
        Value::Message(m) => {
            encode_varint(encoded_len(m) as u64, buf);
            encode(m, buf);
        }
        // lists never nest
        Value::List(_) => {}
    }
}

fn encoded_len_value(kind: FieldKind, value: &Value) -> usize {
    match value {
        Value::Int(v) => encoded_len_varint(int_to_wire(kind, *v)),
        Value::UInt(v) => encoded_len_varint(*v),
        Value::Bool(_) => 1,
        Value::Enum(v) => encoded_len_varint(i64::from(*v) as u64),
        Value::Double(_) => 8,
        Value::String(s) => encoded_len_varint(s.len() as u64) + s.len(),
        Value::Bytes(b) => encoded_len_varint(b.len() as u64) + b.len(),
        Value::Message(m) => {
            let len = encoded_len(m);
            encoded_len_varint(len as u64) + len
        }
        Value::List(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::catalog::{self, fields, names, Status};
    use types::{FieldDef, KindDef, MessageDef, SchemaDef};

    #[test]
    fn test_content_external_id_bytes() {
        let schema = catalog::schema();
        let mut content = schema.new_message(names::CONTENT).unwrap();
        content.set(fields::content::EXTERNAL_CONTENT_ID, "ABC123").unwrap();

        assert_eq!(encode_to_vec(&content), vec![0x12, 0x06, b'A', b'B', b'C', b'1', b'2', b'3']);
    }

    #[test]
    fn test_empty_message_encodes_to_nothing() {
        let schema = catalog::schema();
        let mut content = schema.new_message(names::CONTENT).unwrap();
        content.set(fields::content::STATUS, Status::UnknownStatus).unwrap();
        content.set(fields::content::EXTERNAL_CONTENT_ID, "").unwrap();

        assert!(encode_to_vec(&content).is_empty());
        assert_eq!(encoded_len(&content), 0);
    }

    #[test]
    fn test_fields_in_number_order() {
        let schema = catalog::schema();
        let mut content = schema.new_message(names::CONTENT).unwrap();
        content.set(fields::content::EXTERNAL_CONTENT_ID, "X").unwrap();
        content.set(fields::content::STATUS, Status::Active).unwrap();

        assert_eq!(encode_to_vec(&content), vec![0x08, 0x01, 0x12, 0x01, b'X']);
    }

    #[test]
    fn test_present_empty_submessage_is_emitted() {
        let schema = catalog::schema();
        let mut promotion = schema.new_message(names::PROMOTION).unwrap();
        promotion.message_mut(fields::promotion::CONTENT).unwrap();

        assert_eq!(encode_to_vec(&promotion), vec![0x12, 0x00]);
    }

    #[test]
    fn test_double_fixed64_little_endian() {
        let schema = catalog::schema();
        let mut promotion = schema.new_message(names::PROMOTION).unwrap();
        promotion.set(fields::promotion::BID_AMOUNT, 1.5).unwrap();

        let mut expected = vec![0x21];
        expected.extend_from_slice(&1.5f64.to_le_bytes());
        assert_eq!(encode_to_vec(&promotion), expected);
    }

    #[test]
    fn test_negative_enum_sign_extended() {
        let schema = catalog::schema();
        let mut content = schema.new_message(names::CONTENT).unwrap();
        content.set_enum_raw(fields::content::STATUS, -1).unwrap();

        let bytes = encode_to_vec(&content);
        assert_eq!(bytes.len(), 1 + 10);
        assert_eq!(bytes[0], 0x08);
    }

    #[test]
    fn test_packed_and_unpacked_repeated() {
        let schema = SchemaDef::new()
            .message(
                MessageDef::new("Batch")
                    .field(FieldDef::new(1, "ids", KindDef::Sint32).repeated())
                    .field(FieldDef::new(2, "labels", KindDef::String).repeated()),
            )
            .build()
            .unwrap();
        let mut batch = schema.new_message("Batch").unwrap();
        batch.push(1, -1i64).unwrap();
        batch.push(1, 1i64).unwrap();
        batch.push(2, "a").unwrap();
        batch.push(2, "b").unwrap();

        assert_eq!(
            encode_to_vec(&batch),
            vec![0x0a, 0x02, 0x01, 0x02, 0x12, 0x01, b'a', 0x12, 0x01, b'b']
        );
        assert_eq!(encoded_len(&batch), 10);
    }

    #[test]
    fn test_unknown_bytes_appended() {
        let schema = catalog::schema();
        let mut content = schema.new_message(names::CONTENT).unwrap();
        content.set(fields::content::STATUS, Status::Active).unwrap();
        content.unknown_fields_mut().push_raw(&[0x18, 0x07]);

        assert_eq!(encode_to_vec(&content), vec![0x08, 0x01, 0x18, 0x07]);
        assert_eq!(encode_to_bytes(&content).as_ref(), &[0x08, 0x01, 0x18, 0x07]);
    }
}
