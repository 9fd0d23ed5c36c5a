//! Schema loading: name resolution and consistency checks

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::definition::{EnumDef, FieldDef, KindDef, MessageDef, SchemaDef};
use super::descriptor::{
    EnumDescriptor, EnumId, FieldDescriptor, FieldKind, MessageDescriptor, MessageId, Presence,
};
use super::{Schema, MAX_FIELD_NUMBER, RESERVED_FIELD_NUMBERS};
use crate::error::{SchemaError, SchemaResult};

struct TypeIndex {
    messages: HashMap<String, MessageId>,
    enums: HashMap<String, EnumId>,
}

pub(super) fn load(def: &SchemaDef) -> SchemaResult<Schema> {
    let index = index_names(def)?;

    let enums = def
        .enums
        .iter()
        .enumerate()
        .map(|(i, e)| build_enum(EnumId(i), e))
        .collect::<SchemaResult<Vec<_>>>()?;

    let messages = def
        .messages
        .iter()
        .enumerate()
        .map(|(i, m)| build_message(MessageId(i), m, &index))
        .collect::<SchemaResult<Vec<_>>>()?;

    check_required_cycles(&messages)?;

    debug!(
        messages = messages.len(),
        enums = enums.len(),
        "schema loaded"
    );

    Ok(Schema {
        messages,
        enums,
        message_index: index.messages,
        enum_index: index.enums,
    })
}

fn index_names(def: &SchemaDef) -> SchemaResult<TypeIndex> {
    let mut seen = HashSet::new();
    let mut index = TypeIndex {
        messages: HashMap::new(),
        enums: HashMap::new(),
    };

    for (i, e) in def.enums.iter().enumerate() {
        if !seen.insert(e.name.as_str()) {
            return Err(SchemaError::DuplicateTypeName { name: e.name.clone() });
        }
        index.enums.insert(e.name.clone(), EnumId(i));
    }
    for (i, m) in def.messages.iter().enumerate() {
        if !seen.insert(m.name.as_str()) {
            return Err(SchemaError::DuplicateTypeName { name: m.name.clone() });
        }
        index.messages.insert(m.name.clone(), MessageId(i));
    }

    Ok(index)
}

fn build_enum(id: EnumId, def: &EnumDef) -> SchemaResult<EnumDescriptor> {
    if def.values.is_empty() {
        return Err(SchemaError::EmptyEnum { name: def.name.clone() });
    }

    let mut by_number: HashMap<i32, usize> = HashMap::new();
    for (i, v) in def.values.iter().enumerate() {
        if let Some(&prev) = by_number.get(&v.number) {
            return Err(SchemaError::DuplicateEnumValue {
                name: def.name.clone(),
                number: v.number,
                first: def.values[prev].name.clone(),
                second: v.name.clone(),
            });
        }
        by_number.insert(v.number, i);
    }

    if !by_number.contains_key(&0) {
        return Err(SchemaError::MissingZeroValue { name: def.name.clone() });
    }

    Ok(EnumDescriptor {
        id,
        name: def.name.clone(),
        values: def.values.iter().map(|v| (v.number, v.name.clone())).collect(),
        by_number,
    })
}

fn build_message(id: MessageId, def: &MessageDef, index: &TypeIndex) -> SchemaResult<MessageDescriptor> {
    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(def.fields.len());
    let mut numbers: HashMap<u32, &str> = HashMap::new();
    let mut names = HashSet::new();

    for field in &def.fields {
        let number = field.number;
        if number == 0 || number > MAX_FIELD_NUMBER || RESERVED_FIELD_NUMBERS.contains(&number) {
            return Err(SchemaError::invalid_field_number(&def.name, &field.name, number));
        }
        if let Some(first) = numbers.insert(number, field.name.as_str()) {
            return Err(SchemaError::DuplicateFieldNumber {
                message: def.name.clone(),
                number,
                first: first.to_string(),
                second: field.name.clone(),
            });
        }
        if !names.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateFieldName {
                message: def.name.clone(),
                field: field.name.clone(),
            });
        }

        let kind = resolve_kind(&def.name, field, index)?;
        let presence = if matches!(kind, FieldKind::Message(_)) || field.optional {
            Presence::Explicit
        } else {
            Presence::Implicit
        };

        fields.push(FieldDescriptor {
            number,
            name: field.name.clone(),
            kind,
            repeated: field.repeated,
            presence,
            required: field.required,
        });
    }

    fields.sort_by_key(|f| f.number);
    let by_number = fields.iter().enumerate().map(|(i, f)| (f.number, i)).collect();
    let by_name = fields.iter().enumerate().map(|(i, f)| (f.name.clone(), i)).collect();

    Ok(MessageDescriptor {
        id,
        name: def.name.clone(),
        fields,
        by_number,
        by_name,
    })
}

fn resolve_kind(message: &str, field: &FieldDef, index: &TypeIndex) -> SchemaResult<FieldKind> {
    let kind = match field.kind {
        KindDef::Int32 => FieldKind::Int32,
        KindDef::Int64 => FieldKind::Int64,
        KindDef::Uint32 => FieldKind::UInt32,
        KindDef::Uint64 => FieldKind::UInt64,
        KindDef::Sint32 => FieldKind::SInt32,
        KindDef::Sint64 => FieldKind::SInt64,
        KindDef::Bool => FieldKind::Bool,
        KindDef::Double => FieldKind::Double,
        KindDef::String => FieldKind::String,
        KindDef::Bytes => FieldKind::Bytes,
        KindDef::Message | KindDef::Enum => {
            let referenced = field.type_name.as_deref().ok_or_else(|| SchemaError::MissingTypeReference {
                message: message.to_string(),
                field: field.name.clone(),
                kind: field.kind.name().to_string(),
            })?;
            return resolve_reference(message, field, referenced, index);
        }
    };
    Ok(kind)
}

fn resolve_reference(
    message: &str,
    field: &FieldDef,
    referenced: &str,
    index: &TypeIndex,
) -> SchemaResult<FieldKind> {
    let as_message = index.messages.get(referenced).copied();
    let as_enum = index.enums.get(referenced).copied();

    let wrong_category = |expected: &str, actual: &str| SchemaError::WrongTypeCategory {
        message: message.to_string(),
        field: field.name.clone(),
        referenced: referenced.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    };

    match (field.kind, as_message, as_enum) {
        (KindDef::Message, Some(id), _) => Ok(FieldKind::Message(id)),
        (KindDef::Enum, _, Some(id)) => Ok(FieldKind::Enum(id)),
        (KindDef::Message, None, Some(_)) => Err(wrong_category("a message", "an enum")),
        (KindDef::Enum, Some(_), None) => Err(wrong_category("an enum", "a message")),
        _ => Err(SchemaError::UndefinedType {
            message: message.to_string(),
            field: field.name.clone(),
            referenced: referenced.to_string(),
        }),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first search over singular `required` message edges
fn check_required_cycles(messages: &[MessageDescriptor]) -> SchemaResult<()> {
    let edges: Vec<Vec<usize>> = messages
        .iter()
        .map(|m| {
            m.fields
                .iter()
                .filter(|f| f.required && !f.repeated)
                .filter_map(|f| match f.kind {
                    FieldKind::Message(target) => Some(target.0),
                    _ => None,
                })
                .collect()
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; messages.len()];
    let mut stack = Vec::new();

    for start in 0..messages.len() {
        if marks[start] == Mark::Unvisited {
            if let Some(cycle) = visit(start, &edges, &mut marks, &mut stack) {
                let path = cycle.into_iter().map(|i| messages[i].name.clone()).collect();
                return Err(SchemaError::RequiredCycle { path });
            }
        }
    }
    Ok(())
}

fn visit(node: usize, edges: &[Vec<usize>], marks: &mut [Mark], stack: &mut Vec<usize>) -> Option<Vec<usize>> {
    marks[node] = Mark::InProgress;
    stack.push(node);

    for &next in &edges[node] {
        match marks[next] {
            Mark::InProgress => {
                let from = stack.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle = stack[from..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(next, edges, marks, stack) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }

    stack.pop();
    marks[node] = Mark::Done;
    None
}
