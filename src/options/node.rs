//! Typed view of node options.

use std::fmt;

use launch_args::{OptionParseError, OptionToken};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{parse_bool, OptionList};

/// Where a node's stdout/stderr goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOutput {
    #[default]
    Screen,
    Log,
    Both,
}

impl NodeOutput {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Log => "log",
            Self::Both => "both",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "screen" => Some(Self::Screen),
            "log" => Some(Self::Log),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

impl fmt::Display for NodeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Node launch options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOptions {
    /// Node name override; `None` keeps the executable's default name
    pub name: Option<String>,
    pub output: NodeOutput,
    pub emulate_tty: bool,
    pub respawn: bool,
    /// Seconds to wait before respawning
    pub respawn_delay: f64,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            name: None,
            output: NodeOutput::Screen,
            emulate_tty: true,
            respawn: false,
            respawn_delay: 0.0,
        }
    }
}

impl NodeOptions {
    /// Build from a resolved option list.
    ///
    /// Keys match case-insensitively. Unknown keys and bare flags are skipped.
    /// `name` keeps its case; an empty name or `default` means no override.
    pub fn from_option_list(list: &OptionList) -> Result<Self, OptionParseError> {
        let mut options = Self::default();

        for token in list.iter() {
            let OptionToken::KeyValue {
                flag: None, key, value, ..
            } = token
            else {
                debug!(token = %token, "ignoring node option token");
                continue;
            };

            match key.to_ascii_lowercase().as_str() {
                "name" => {
                    options.name = match value.as_str() {
                        "" => None,
                        v if v.eq_ignore_ascii_case("default") => None,
                        v => Some(v.to_string()),
                    };
                }
                "output" => {
                    options.output = NodeOutput::parse(value).ok_or_else(|| {
                        OptionParseError::InvalidValue {
                            key: key.clone(),
                            value: value.clone(),
                            expected: "one of screen, log, both".to_string(),
                        }
                    })?;
                }
                "emulate_tty" => options.emulate_tty = parse_bool(key, value)?,
                "respawn" => options.respawn = parse_bool(key, value)?,
                "respawn_delay" => {
                    options.respawn_delay = value
                        .parse::<f64>()
                        .ok()
                        .filter(|d| d.is_finite() && *d >= 0.0)
                        .ok_or_else(|| OptionParseError::InvalidValue {
                            key: key.clone(),
                            value: value.clone(),
                            expected: "a non-negative number of seconds".to_string(),
                        })?;
                }
                _ => debug!(key = %key, "ignoring unknown node option"),
            }
        }

        Ok(options)
    }
}
