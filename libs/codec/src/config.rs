//! # Codec Configuration
//!
//! Decode limits and unknown-field handling, tunable per deployment instead
//! of hardcoded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the decoder does with fields the schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Keep raw bytes and re-emit them on encode
    #[default]
    Preserve,
    /// Drop them after skipping
    Discard,
}

impl FromStr for UnknownFieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "discard" => Ok(Self::Discard),
            other => Err(format!("unknown field policy '{other}' (expected preserve or discard)")),
        }
    }
}

impl fmt::Display for UnknownFieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Preserve => "preserve",
            Self::Discard => "discard",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest input (or length-prefixed frame) accepted by the decoder
    pub max_message_bytes: usize,

    /// Deepest embedded-message nesting accepted by the decoder
    pub max_depth: usize,

    pub unknown_fields: UnknownFieldPolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: 64 * 1024 * 1024,
            max_depth: 100,
            unknown_fields: UnknownFieldPolicy::Preserve,
        }
    }
}

impl CodecConfig {
    /// Tight limits for untrusted input
    pub fn strict() -> Self {
        Self {
            max_message_bytes: 1024 * 1024,
            max_depth: 32,
            unknown_fields: UnknownFieldPolicy::Preserve,
        }
    }

    /// Loose limits for trusted batch processing
    pub fn permissive() -> Self {
        Self {
            max_message_bytes: 1024 * 1024 * 1024,
            max_depth: 1_000,
            unknown_fields: UnknownFieldPolicy::Preserve,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_message_bytes(mut self, max_message_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }
}
