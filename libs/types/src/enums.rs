//! # Enum Validator
//!
//! Enum descriptors are closed sets at build time, but the wire stays open:
//! any integer decodes, and the raw value is never discarded. Symbolic lookup
//! of an integer that the descriptor does not know yields
//! [`EnumSymbol::Unrecognized`], which exists only in memory and has no wire
//! encoding of its own.

use std::fmt;

use crate::schema::{EnumDescriptor, Schema};

/// Name used when rendering an unrecognized enum value
pub const UNRECOGNIZED: &str = "UNRECOGNIZED";

/// Symbolic view of a raw enum integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumSymbol<'a> {
    Known(&'a str),
    Unrecognized,
}

impl<'a> EnumSymbol<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            EnumSymbol::Known(name) => name,
            EnumSymbol::Unrecognized => UNRECOGNIZED,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, EnumSymbol::Known(_))
    }
}

impl fmt::Display for EnumSymbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw integer of an enum field together with its resolved symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue<'a> {
    pub raw: i32,
    pub symbol: EnumSymbol<'a>,
}

impl EnumValue<'_> {
    pub fn is_valid(&self) -> bool {
        self.symbol.is_known()
    }

    /// Convert into a typed Rust enum; `None` when the value is unrecognized
    pub fn typed<T: TryFrom<i32>>(&self) -> Option<T> {
        T::try_from(self.raw).ok()
    }
}

impl fmt::Display for EnumValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol {
            EnumSymbol::Known(name) => f.write_str(name),
            EnumSymbol::Unrecognized => write!(f, "{}", self.raw),
        }
    }
}

impl EnumDescriptor {
    /// True iff `raw` is a declared member
    pub fn is_valid(&self, raw: i32) -> bool {
        self.by_number.contains_key(&raw)
    }

    pub fn to_symbol(&self, raw: i32) -> EnumSymbol<'_> {
        match self.by_number.get(&raw) {
            Some(&i) => EnumSymbol::Known(&self.values[i].1),
            None => EnumSymbol::Unrecognized,
        }
    }

    pub fn resolve(&self, raw: i32) -> EnumValue<'_> {
        EnumValue {
            raw,
            symbol: self.to_symbol(raw),
        }
    }

    /// Integer of a named member
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.values.iter().find(|(_, n)| n == name).map(|(v, _)| *v)
    }
}

impl Schema {
    /// Membership check by enum type name; unknown enum types are never valid
    pub fn is_valid_enum(&self, enum_type: &str, raw: i32) -> bool {
        self.enum_by_name(enum_type)
            .is_some_and(|e| e.is_valid(raw))
    }

    /// Symbol lookup by enum type name
    pub fn enum_symbol(&self, enum_type: &str, raw: i32) -> EnumSymbol<'_> {
        self.enum_by_name(enum_type)
            .map_or(EnumSymbol::Unrecognized, |e| e.to_symbol(raw))
    }
}
