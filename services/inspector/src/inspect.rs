//! Payload decoding and schema listing for the inspector CLI

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use codec::Decoder;
use tracing::{debug, info};
use types::{catalog, FieldDescriptor, FieldKind, Schema, SchemaDef};

/// Catalog schema, optionally extended with types from a TOML definition
pub fn load_schema(extra: Option<&str>) -> Result<Arc<Schema>> {
    let Some(text) = extra else {
        return Ok(catalog::schema());
    };
    let def = SchemaDef::from_toml_str(text).context("Failed to parse schema definition")?;
    let schema = catalog::definition()
        .extend(def)
        .build()
        .context("Schema definition is inconsistent with the catalog")?;
    info!(messages = schema.messages().len(), "loaded extended schema");
    Ok(schema)
}

/// Hex text to bytes; whitespace and an optional `0x` prefix are ignored
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    let digits = compact.strip_prefix("0x").unwrap_or(&compact);
    hex::decode(digits).context("Payload is not valid hex")
}

/// Decode `data` as `type_name` and render each message in text form
pub fn render(decoder: &Decoder, schema: &Arc<Schema>, type_name: &str, data: &[u8], delimited: bool) -> Result<Vec<String>> {
    let Some(type_id) = schema.message_id(type_name) else {
        bail!("Unknown message type '{type_name}' (use --list to see available types)");
    };
    debug!(type_name, bytes = data.len(), delimited, "decoding payload");

    let messages = if delimited {
        decoder.decode_stream(schema, type_id, data)
    } else {
        decoder.decode(schema, type_id, data).map(|m| vec![m])
    }
    .with_context(|| format!("Failed to decode {} bytes as {type_name}", data.len()))?;

    Ok(messages.iter().map(ToString::to_string).collect())
}

/// Human-readable listing of every enum and message in `schema`
pub fn describe_schema(schema: &Schema) -> String {
    let mut out = String::new();

    for e in schema.enums() {
        let _ = writeln!(out, "enum {}", e.name());
        for (number, name) in e.values() {
            let _ = writeln!(out, "  {name} = {number}");
        }
    }

    for m in schema.messages() {
        let _ = writeln!(out, "message {}", m.name());
        for field in m.fields() {
            let _ = writeln!(out, "  {} {}: {}", field.number, field.name, describe_field(schema, field));
        }
    }

    out
}

fn describe_field(schema: &Schema, field: &FieldDescriptor) -> String {
    let kind = match field.kind {
        FieldKind::Message(id) => schema.message(id).name().to_string(),
        FieldKind::Enum(id) => format!("enum {}", schema.enumeration(id).name()),
        other => other.name().to_string(),
    };

    let mut flags = Vec::new();
    if field.repeated {
        flags.push("repeated");
    }
    if field.required {
        flags.push("required");
    }
    if field.tracks_presence() && !matches!(field.kind, FieldKind::Message(_)) {
        flags.push("optional");
    }

    if flags.is_empty() {
        kind
    } else {
        format!("{} {kind}", flags.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::encode_length_delimited;
    use types::catalog::{fields, names, Status};

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("12 06 41 42").unwrap(), vec![0x12, 0x06, 0x41, 0x42]);
        assert_eq!(parse_hex("0x0801").unwrap(), vec![0x08, 0x01]);
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_render_single() {
        let schema = catalog::schema();
        let data = parse_hex("08 01 12 06 41 42 43 31 32 33").unwrap();
        let lines = render(&Decoder::default(), &schema, names::CONTENT, &data, false).unwrap();
        assert_eq!(lines, vec![r#"Content { status: ACTIVE, external_content_id: "ABC123" }"#.to_string()]);
    }

    #[test]
    fn test_render_delimited() {
        let schema = catalog::schema();
        let mut data = Vec::new();
        for status in [Status::Active, Status::Archived] {
            let content = schema
                .new_message(names::CONTENT)
                .unwrap()
                .with(fields::content::STATUS, status)
                .unwrap();
            encode_length_delimited(&content, &mut data);
        }

        let lines = render(&Decoder::default(), &schema, names::CONTENT, &data, true).unwrap();
        assert_eq!(lines, vec!["Content { status: ACTIVE }", "Content { status: ARCHIVED }"]);
    }

    #[test]
    fn test_render_errors() {
        let schema = catalog::schema();
        let decoder = Decoder::default();
        assert!(render(&decoder, &schema, "Nope", &[], false).is_err());

        let err = render(&decoder, &schema, names::CONTENT, &[0x12, 0x06, 0x41], false).unwrap_err();
        assert!(format!("{err:#}").contains("Buffer underrun"));
    }

    #[test]
    fn test_describe_schema() {
        let listing = describe_schema(&catalog::schema());
        assert!(listing.contains("enum BidType\n  UNKNOWN_BID_TYPE = 0\n  CPM = 1\n  CPC = 2\n"));
        assert!(listing.contains("message Promotion\n  1 status: enum Status\n  2 content: Content\n"));
        assert!(listing.contains("  4 bid_amount: double\n"));
    }

    #[test]
    fn test_load_extended_schema() {
        let extra = r#"
[[messages]]
name = "ContentBatch"

[[messages.fields]]
number = 1
name = "items"
kind = "message"
type_name = "Content"
repeated = true
"#;
        let schema = load_schema(Some(extra)).unwrap();
        assert!(schema.message_by_name("ContentBatch").is_some());
        assert!(describe_schema(&schema).contains("1 items: repeated Content"));

        let clash = "[[messages]]\nname = \"Content\"\n";
        assert!(load_schema(Some(clash)).is_err());
    }
}
