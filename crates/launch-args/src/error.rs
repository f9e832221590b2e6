//! Parse errors for remapping and option strings.
//!
//! Every variant names the origin of the offending text ("cli",
//! "launch argument", a file path, ...) so the mistake can be located.

use serde::{Deserialize, Serialize};

/// A remapping token could not be turned into a `from:=to` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemapParseError {
    /// Token has no `:=` separator.
    #[error("remap token '{token}' from {origin} has no ':=' separator")]
    MissingSeparator { token: String, origin: String },

    /// Token has nothing before `:=`.
    #[error("remap token '{token}' from {origin} has an empty 'from' name")]
    EmptyFrom { token: String, origin: String },

    /// Token has nothing after `:=`.
    #[error("remap token '{token}' from {origin} has an empty 'to' name")]
    EmptyTo { token: String, origin: String },

    /// Two consecutive commas, or a leading/trailing comma.
    #[error("empty remap token at position {position} in {origin}")]
    EmptyToken { position: usize, origin: String },

    /// A structured (YAML) remap entry has an unsupported shape.
    #[error("invalid remap entry {entry} in {origin}: {reason}")]
    InvalidEntry {
        entry: String,
        origin: String,
        reason: String,
    },
}

impl RemapParseError {
    /// Machine-readable code, stable for automation.
    pub fn to_code(&self) -> String {
        match self {
            Self::MissingSeparator { token, .. } => format!("REMAP_MISSING_SEPARATOR:{}", token),
            Self::EmptyFrom { token, .. } => format!("REMAP_EMPTY_FROM:{}", token),
            Self::EmptyTo { token, .. } => format!("REMAP_EMPTY_TO:{}", token),
            Self::EmptyToken { position, .. } => format!("REMAP_EMPTY_TOKEN:{}", position),
            Self::InvalidEntry { entry, .. } => format!("REMAP_INVALID_ENTRY:{}", entry),
        }
    }

    /// The origin the offending token came from.
    pub fn origin(&self) -> &str {
        match self {
            Self::MissingSeparator { origin, .. }
            | Self::EmptyFrom { origin, .. }
            | Self::EmptyTo { origin, .. }
            | Self::EmptyToken { origin, .. }
            | Self::InvalidEntry { origin, .. } => origin,
        }
    }
}

/// An option string (node options, ROS arguments, log options) is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionParseError {
    /// A delimited piece is empty after trimming.
    #[error("empty option token at position {position} in {origin}")]
    EmptyToken { position: usize, origin: String },

    /// A key/value token has nothing before its separator.
    #[error("option token '{token}' from {origin} has an empty key")]
    EmptyKey { token: String, origin: String },

    /// A known option key carries a value outside its accepted set.
    #[error("invalid value '{value}' for option '{key}': expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}

impl OptionParseError {
    /// Machine-readable code, stable for automation.
    pub fn to_code(&self) -> String {
        match self {
            Self::EmptyToken { position, .. } => format!("OPTION_EMPTY_TOKEN:{}", position),
            Self::EmptyKey { token, .. } => format!("OPTION_EMPTY_KEY:{}", token),
            Self::InvalidValue { key, value, .. } => {
                format!("OPTION_INVALID_VALUE:{}={}", key, value)
            }
        }
    }
}
