//! Message instance and schema loading integration tests
//!
//! - TOML schema definitions load into the same descriptors as code-built ones
//! - presence follows the implicit/explicit rules for any value
//! - setting a value then reading it back yields the value

use proptest::prelude::*;
use types::{
    EnumSymbol, FieldKind, MessageError, Presence, SchemaDef, SchemaError, Value,
};

const PROMOTION_SCHEMA: &str = r#"
[[enums]]
name = "Status"
values = [
    { name = "UNKNOWN_STATUS", number = 0 },
    { name = "ACTIVE", number = 1 },
]

[[messages]]
name = "Content"
fields = [
    { number = 1, name = "status", kind = "enum", type_name = "Status" },
    { number = 2, name = "external_content_id", kind = "string" },
    { number = 3, name = "boost", kind = "int32", optional = true },
    { number = 4, name = "tags", kind = "string", repeated = true },
]
"#;

#[test]
fn test_toml_schema_loads() {
    let schema = SchemaDef::from_toml_str(PROMOTION_SCHEMA).unwrap().build().unwrap();

    let content = schema.message_by_name("Content").unwrap();
    assert_eq!(content.fields().len(), 4);
    assert_eq!(content.field(1).unwrap().kind, FieldKind::Enum(schema.enum_id("Status").unwrap()));
    assert_eq!(content.field(2).unwrap().presence, Presence::Implicit);
    assert_eq!(content.field(3).unwrap().presence, Presence::Explicit);
    assert!(content.field(4).unwrap().repeated);

    assert_eq!(schema.enum_symbol("Status", 1), EnumSymbol::Known("ACTIVE"));
}

#[test]
fn test_toml_schema_errors_surface() {
    let broken = PROMOTION_SCHEMA.replace("type_name = \"Status\"", "type_name = \"State\"");
    let err = SchemaDef::from_toml_str(&broken).unwrap().build().unwrap_err();
    assert!(matches!(err, SchemaError::UndefinedType { ref referenced, .. } if referenced == "State"));

    assert!(matches!(
        SchemaDef::from_toml_str("[[messages]]\nname = 3\n"),
        Err(SchemaError::Parse(_))
    ));
}

#[test]
fn test_field_access_by_name() {
    let schema = SchemaDef::from_toml_str(PROMOTION_SCHEMA).unwrap().build().unwrap();
    let mut content = schema.new_message("Content").unwrap();

    content.set_by_name("external_content_id", "ABC123").unwrap();
    assert_eq!(content.get_by_name("external_content_id").unwrap().as_ref(), &Value::from("ABC123"));
    assert!(matches!(
        content.set_by_name("headline", "x"),
        Err(MessageError::NoSuchFieldName { .. })
    ));
}

proptest! {
    #[test]
    fn prop_implicit_presence_tracks_value(v in any::<i32>()) {
        let schema = SchemaDef::from_toml_str(PROMOTION_SCHEMA).unwrap().build().unwrap();
        let mut content = schema.new_message("Content").unwrap();

        content.set_enum_raw(1, v).unwrap();
        prop_assert_eq!(content.has(1), v != 0);
        prop_assert_eq!(content.get_enum(1).unwrap().raw, v);
        prop_assert_eq!(content.get_enum(1).unwrap().is_valid(), v == 0 || v == 1);
    }

    #[test]
    fn prop_explicit_presence_survives_default(v in any::<i32>()) {
        let schema = SchemaDef::from_toml_str(PROMOTION_SCHEMA).unwrap().build().unwrap();
        let mut content = schema.new_message("Content").unwrap();

        content.set(3, v).unwrap();
        prop_assert!(content.has(3));
        prop_assert_eq!(content.get_i64(3).unwrap(), i64::from(v));

        content.clear_field(3);
        prop_assert!(!content.has(3));
        prop_assert_eq!(content.get_i64(3).unwrap(), 0);
    }

    #[test]
    fn prop_int32_range_enforced(v in any::<i64>()) {
        let schema = SchemaDef::from_toml_str(PROMOTION_SCHEMA).unwrap().build().unwrap();
        let mut content = schema.new_message("Content").unwrap();

        let result = content.set(3, v);
        if i32::try_from(v).is_ok() {
            prop_assert!(result.is_ok());
        } else {
            let out_of_range = matches!(result, Err(MessageError::OutOfRange { .. }));
            prop_assert!(out_of_range);
            prop_assert!(!content.has(3));
        }
    }

    #[test]
    fn prop_string_set_get(s in ".{0,32}") {
        let schema = SchemaDef::from_toml_str(PROMOTION_SCHEMA).unwrap().build().unwrap();
        let mut content = schema.new_message("Content").unwrap();

        content.set(2, s.as_str()).unwrap();
        prop_assert_eq!(content.get_str(2).unwrap(), s.as_str());
        prop_assert_eq!(content.has(2), !s.is_empty());
    }
}
