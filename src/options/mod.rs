//! Option list resolution
//!
//! Node options, ROS arguments and log options all resolve the same way: a
//! default string and an override string are tokenized, then folded into an
//! [`OptionList`] where
//! - a key/value token replaces an earlier token with the same key in place
//! - a bare flag appears once, at its first-seen position

mod log;
mod node;

use std::fmt;

use launch_args::{tokenize_options, Delimiter, OptionParseError, OptionToken};
use serde::{Deserialize, Serialize};

use crate::config::{default_log_options_str, default_node_options_str, ITEM_SEPARATOR, KEY_VALUE_SEPARATOR};

pub use log::{LogLevel, LogOptions};
pub use node::{NodeOptions, NodeOutput};

/// Ordered, de-duplicated option tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionList {
    tokens: Vec<OptionToken>,
}

impl OptionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token following the override rules.
    ///
    /// A key/value token also replaces a bare flag with the same name; a bare
    /// flag whose name is already present (as flag or key) is dropped.
    pub fn push(&mut self, token: OptionToken) {
        let identity = token.identity();
        let existing = self.tokens.iter().position(|t| t.identity() == identity);

        match (existing, token.is_flag()) {
            (Some(_), true) => {}
            (Some(index), false) => self.tokens[index] = token,
            (None, _) => self.tokens.push(token),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionToken> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Value of the key/value token with this identity.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|t| t.identity() == key)
            .and_then(OptionToken::value)
    }

    pub fn contains_flag(&self, name: &str) -> bool {
        self.tokens
            .iter()
            .any(|t| t.is_flag() && t.identity() == name)
    }

    /// One string per token (`"--use_sim_time false"`, `"--verbose"`).
    pub fn to_args(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.to_string()).collect()
    }

    /// Process argv words (`["--use_sim_time", "false", "--verbose"]`).
    pub fn to_argv(&self) -> Vec<String> {
        self.tokens.iter().flat_map(|t| t.to_argv()).collect()
    }

    /// Join tokens back into a single string.
    pub fn join(&self, separator: &str) -> String {
        self.to_args().join(separator)
    }
}

impl FromIterator<OptionToken> for OptionList {
    fn from_iter<I: IntoIterator<Item = OptionToken>>(iter: I) -> Self {
        let mut list = Self::new();
        for token in iter {
            list.push(token);
        }
        list
    }
}

impl fmt::Display for OptionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join(" "))
    }
}

/// Which option family a string belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    NodeOptions,
    RosArguments,
    LogOptions,
}

impl OptionKind {
    pub fn delimiter(&self) -> Delimiter {
        match self {
            Self::RosArguments => Delimiter::Whitespace,
            Self::NodeOptions | Self::LogOptions => Delimiter::Comma,
        }
    }

    /// Built-in default string, used when the caller gives none.
    pub fn builtin_defaults(&self) -> String {
        match self {
            Self::NodeOptions => default_node_options_str(ITEM_SEPARATOR, KEY_VALUE_SEPARATOR),
            Self::LogOptions => default_log_options_str(ITEM_SEPARATOR, KEY_VALUE_SEPARATOR),
            Self::RosArguments => String::new(),
        }
    }

    /// Node option keys are case-insensitive and fold to lowercase, so
    /// `OUTPUT=log` overrides `output=screen`.
    fn normalize(&self, token: OptionToken) -> OptionToken {
        match (self, token) {
            (
                Self::NodeOptions,
                OptionToken::KeyValue {
                    flag: None,
                    key,
                    separator,
                    value,
                },
            ) => OptionToken::key_value(key.to_ascii_lowercase(), separator, value),
            (_, token) => token,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NodeOptions => "node options",
            Self::RosArguments => "ros arguments",
            Self::LogOptions => "log options",
        }
    }
}

/// Parse `true` / `false` (any case) for a known boolean option.
fn parse_bool(key: &str, value: &str) -> Result<bool, OptionParseError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(OptionParseError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "true or false".to_string(),
        })
    }
}

/// Tokenize both strings, then fold them. A malformed token in either
/// yields an error and no partial list.
fn fold_options(
    defaults: &str,
    overrides: &str,
    delimiter: Delimiter,
    label: &str,
    normalize: impl Fn(OptionToken) -> OptionToken,
) -> Result<OptionList, OptionParseError> {
    let default_tokens = tokenize_options(defaults, delimiter, &format!("default {}", label))?;
    let override_tokens = tokenize_options(overrides, delimiter, label)?;

    Ok(default_tokens
        .into_iter()
        .chain(override_tokens)
        .map(normalize)
        .collect())
}

/// Resolve a default string and an override string into one list.
pub fn resolve_options(
    defaults: &str,
    overrides: &str,
    delimiter: Delimiter,
) -> Result<OptionList, OptionParseError> {
    fold_options(defaults, overrides, delimiter, "options", |token| token)
}

fn resolve_kind(
    kind: OptionKind,
    defaults: Option<&str>,
    overrides: &str,
) -> Result<OptionList, OptionParseError> {
    let builtin;
    let defaults = match defaults {
        Some(d) => d,
        None => {
            builtin = kind.builtin_defaults();
            &builtin
        }
    };

    fold_options(defaults, overrides, kind.delimiter(), kind.label(), |token| {
        kind.normalize(token)
    })
}

/// Node options (`name=x,output=screen,...`). `None` defaults use the
/// built-in node option defaults.
pub fn resolve_node_options(
    defaults: Option<&str>,
    overrides: &str,
) -> Result<OptionList, OptionParseError> {
    resolve_kind(OptionKind::NodeOptions, defaults, overrides)
}

/// ROS arguments (`--ros-args -r a:=b -p x:=1`).
pub fn resolve_ros_arguments(defaults: &str, overrides: &str) -> Result<OptionList, OptionParseError> {
    resolve_kind(OptionKind::RosArguments, Some(defaults), overrides)
}

/// Log options (`log-level=info,disable-stdout-logs=false,...`). `None`
/// defaults use the built-in log option defaults.
pub fn resolve_log_options(
    defaults: Option<&str>,
    overrides: &str,
) -> Result<OptionList, OptionParseError> {
    resolve_kind(OptionKind::LogOptions, defaults, overrides)
}
