//! # Decoder
//!
//! Reconstructs a [`Message`] from wire bytes against a schema.
//!
//! ## Merge rules
//!
//! - singular scalars: last occurrence wins
//! - singular embedded messages: occurrences merge into one instance
//! - repeated fields: occurrences append; packed and unpacked runs both accepted
//! - undeclared fields, and declared fields arriving with a wire type that
//!   does not match their kind: raw bytes kept as unknown fields (or dropped,
//!   per [`UnknownFieldPolicy`])
//!
//! Any error aborts the whole decode; partial results are never returned.

use std::sync::Arc;

use tracing::{debug, warn};
use types::{FieldDescriptor, FieldKind, Message, MessageId, Schema, Value};

use crate::config::{CodecConfig, UnknownFieldPolicy};
use crate::error::{DecodeError, DecodeResult};
use crate::reader::WireReader;
use crate::wire::{decode_zigzag, WireType};

#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode `data` as one message of type `type_id`
    pub fn decode(&self, schema: &Arc<Schema>, type_id: MessageId, data: &[u8]) -> DecodeResult<Message> {
        check_type(schema, type_id)?;
        self.check_size(data.len())?;
        let mut message = Message::of(schema, type_id);
        self.decode_into(&mut message, &mut WireReader::new(data), 0)?;
        Ok(message)
    }

    /// Decode `data` as the message type called `name`
    pub fn decode_named(&self, schema: &Arc<Schema>, name: &str, data: &[u8]) -> DecodeResult<Message> {
        let type_id = schema
            .message_id(name)
            .ok_or_else(|| DecodeError::UnknownMessageType(name.to_string()))?;
        self.decode(schema, type_id, data)
    }

    /// Decode `data` on top of `target`, as if appended to its encoding
    ///
    /// On error `target` is left exactly as it was.
    pub fn merge(&self, target: &mut Message, data: &[u8]) -> DecodeResult<()> {
        self.check_size(data.len())?;
        let mut next = target.clone();
        self.decode_into(&mut next, &mut WireReader::new(data), 0)?;
        *target = next;
        Ok(())
    }

    /// Decode one varint-length-prefixed message from the front of `data`
    ///
    /// Returns the message and the total bytes consumed (prefix included);
    /// bytes after the frame are not examined.
    pub fn decode_length_delimited(
        &self,
        schema: &Arc<Schema>,
        type_id: MessageId,
        data: &[u8],
    ) -> DecodeResult<(Message, usize)> {
        check_type(schema, type_id)?;
        let mut reader = WireReader::new(data);
        let len = reader.read_varint()?;
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.check_size(len)?;

        let mut payload = WireReader::with_base(reader.read_bytes(len, 0)?, reader.offset() - len);
        let mut message = Message::of(schema, type_id);
        self.decode_into(&mut message, &mut payload, 0)?;
        Ok((message, reader.position()))
    }

    /// Decode back-to-back length-delimited messages until `data` is exhausted
    pub fn decode_stream(&self, schema: &Arc<Schema>, type_id: MessageId, data: &[u8]) -> DecodeResult<Vec<Message>> {
        let mut messages = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            let (message, consumed) = self
                .decode_length_delimited(schema, type_id, &data[offset..])
                .map_err(|e| shift_offset(e, offset))?;
            messages.push(message);
            offset += consumed;
        }
        debug!(frames = messages.len(), bytes = data.len(), "decoded delimited stream");
        Ok(messages)
    }

    fn check_size(&self, size: usize) -> DecodeResult<()> {
        if size > self.config.max_message_bytes {
            warn!(size, max = self.config.max_message_bytes, "rejecting oversized message");
            return Err(DecodeError::MessageTooLarge {
                size,
                max: self.config.max_message_bytes,
            });
        }
        Ok(())
    }

    fn decode_into(&self, message: &mut Message, reader: &mut WireReader<'_>, depth: usize) -> DecodeResult<()> {
        let schema = Arc::clone(message.schema());
        let descriptor = schema.message(message.type_id());

        while !reader.is_empty() {
            let start = reader.position();
            let (number, wire_type) = reader.read_tag()?;

            match descriptor.field(number) {
                Some(field) if accepts(field, wire_type) => {
                    self.decode_field(&schema, message, field, wire_type, reader, depth)?;
                }
                Some(field) => {
                    warn!(
                        message = descriptor.name(),
                        field = %field.name,
                        number,
                        wire_type = wire_type.name(),
                        kind = field.kind.name(),
                        "wire type does not match field kind, keeping as unknown"
                    );
                    reader.skip(number, wire_type)?;
                    self.keep_unknown(message, number, reader.consumed_since(start));
                }
                None => {
                    reader.skip(number, wire_type)?;
                    self.keep_unknown(message, number, reader.consumed_since(start));
                }
            }
        }
        Ok(())
    }

    fn decode_field(
        &self,
        schema: &Arc<Schema>,
        message: &mut Message,
        field: &FieldDescriptor,
        wire_type: WireType,
        reader: &mut WireReader<'_>,
        depth: usize,
    ) -> DecodeResult<()> {
        let number = field.number;

        // Packed run of numeric values
        if field.repeated && field.kind.is_packable() && wire_type == WireType::LengthDelimited {
            let mut run = reader.read_length_delimited(number)?;
            while !run.is_empty() {
                let item = read_numeric(field.kind, &mut run, number)?;
                message.push(number, item)?;
            }
            return Ok(());
        }

        let value = match field.kind {
            FieldKind::String => {
                let offset = reader.offset();
                let bytes = reader.read_length_delimited(number)?.rest();
                let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
                    message: message.type_name().to_string(),
                    field: field.name.clone(),
                    offset,
                })?;
                Value::String(text.to_string())
            }
            FieldKind::Bytes => Value::Bytes(reader.read_length_delimited(number)?.rest().to_vec()),
            FieldKind::Message(target) => {
                let child_depth = depth + 1;
                if child_depth > self.config.max_depth {
                    return Err(DecodeError::RecursionLimitExceeded {
                        depth: child_depth,
                        limit: self.config.max_depth,
                        offset: reader.offset(),
                    });
                }
                let mut payload = reader.read_length_delimited(number)?;
                if field.repeated {
                    let mut child = Message::of(schema, target);
                    self.decode_into(&mut child, &mut payload, child_depth)?;
                    Value::Message(child)
                } else {
                    // repeated occurrences merge into the existing instance
                    let child = message.message_mut(number)?;
                    return self.decode_into(child, &mut payload, child_depth);
                }
            }
            kind => read_numeric(kind, reader, number)?,
        };

        if field.repeated {
            message.push(number, value)?;
        } else {
            message.set(number, value)?;
        }
        Ok(())
    }

    fn keep_unknown(&self, message: &mut Message, number: u32, raw: &[u8]) {
        match self.config.unknown_fields {
            UnknownFieldPolicy::Preserve => {
                debug!(message = message.type_name(), number, bytes = raw.len(), "preserving unknown field");
                message.unknown_fields_mut().push_raw(raw);
            }
            UnknownFieldPolicy::Discard => {
                debug!(message = message.type_name(), number, bytes = raw.len(), "discarding unknown field");
            }
        }
    }
}

/// Reject ids issued by a different schema before they are used as indices
fn check_type(schema: &Schema, type_id: MessageId) -> DecodeResult<()> {
    match schema.get_message(type_id) {
        Some(_) => Ok(()),
        None => Err(DecodeError::UnknownMessageType(format!("{type_id:?}"))),
    }
}

/// Whether a field of this descriptor may arrive with `wire_type`
fn accepts(field: &FieldDescriptor, wire_type: WireType) -> bool {
    let natural = if field.kind.is_varint() {
        WireType::Varint
    } else if field.kind == FieldKind::Double {
        WireType::Fixed64
    } else {
        WireType::LengthDelimited
    };
    wire_type == natural
        || (field.repeated && field.kind.is_packable() && wire_type == WireType::LengthDelimited)
}

/// Read one varint- or fixed64-encoded value for a numeric kind
fn read_numeric(kind: FieldKind, reader: &mut WireReader<'_>, number: u32) -> DecodeResult<Value> {
    if kind == FieldKind::Double {
        return Ok(Value::Double(f64::from_bits(reader.read_fixed64(number)?)));
    }

    let raw = reader.read_varint()?;
    Ok(match kind {
        // 32-bit kinds keep only the low 32 bits
        FieldKind::Int32 => Value::Int(i64::from(raw as u32 as i32)),
        FieldKind::Int64 => Value::Int(raw as i64),
        FieldKind::UInt32 => Value::UInt(u64::from(raw as u32)),
        FieldKind::SInt32 => Value::Int(decode_zigzag(u64::from(raw as u32))),
        FieldKind::SInt64 => Value::Int(decode_zigzag(raw)),
        FieldKind::Bool => Value::Bool(raw != 0),
        FieldKind::Enum(_) => Value::Enum(raw as u32 as i32),
        _ => Value::UInt(raw),
    })
}

fn shift_offset(error: DecodeError, by: usize) -> DecodeError {
    match error {
        DecodeError::TruncatedVarint { offset, detail } => DecodeError::TruncatedVarint {
            offset: offset + by,
            detail,
        },
        DecodeError::BufferUnderrun { offset, need, remaining, field } => DecodeError::BufferUnderrun {
            offset: offset + by,
            need,
            remaining,
            field,
        },
        DecodeError::InvalidTag { tag, offset, reason } => DecodeError::InvalidTag {
            tag,
            offset: offset + by,
            reason,
        },
        DecodeError::InvalidUtf8 { message, field, offset } => DecodeError::InvalidUtf8 {
            message,
            field,
            offset: offset + by,
        },
        DecodeError::RecursionLimitExceeded { depth, limit, offset } => DecodeError::RecursionLimitExceeded {
            depth,
            limit,
            offset: offset + by,
        },
        other => other,
    }
}

/// Decode with the default configuration
pub fn decode(schema: &Arc<Schema>, type_id: MessageId, data: &[u8]) -> DecodeResult<Message> {
    Decoder::default().decode(schema, type_id, data)
}
