//! Remapping rule parser.
//!
//! Parses comma-delimited `from:=to` lists (`/a:=/b,c:=d`) into ordered
//! [`RemapEntry`] values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RemapParseError;

/// Separator between the two names of a remapping rule.
pub const REMAP_SEPARATOR: &str = ":=";

/// Separator between rules in a remapping list.
pub const REMAP_ITEM_SEPARATOR: char = ',';

/// A single remapping rule redirecting `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemapEntry {
    pub from: String,
    pub to: String,
}

impl RemapEntry {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Render as a `from:=to` rule.
    pub fn to_rule(&self) -> String {
        format!("{}{}{}", self.from, REMAP_SEPARATOR, self.to)
    }
}

impl fmt::Display for RemapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.from, REMAP_SEPARATOR, self.to)
    }
}

impl From<(String, String)> for RemapEntry {
    fn from((from, to): (String, String)) -> Self {
        Self { from, to }
    }
}

impl From<(&str, &str)> for RemapEntry {
    fn from((from, to): (&str, &str)) -> Self {
        Self::new(from, to)
    }
}

/// Parse one `from:=to` token.
///
/// The token is split on the first `:=`; both sides are trimmed and must be
/// non-empty.
pub fn parse_remap_token(token: &str, origin: &str) -> Result<RemapEntry, RemapParseError> {
    let token = token.trim();

    let Some((from, to)) = token.split_once(REMAP_SEPARATOR) else {
        return Err(RemapParseError::MissingSeparator {
            token: token.to_string(),
            origin: origin.to_string(),
        });
    };

    let from = from.trim();
    let to = to.trim();

    if from.is_empty() {
        return Err(RemapParseError::EmptyFrom {
            token: token.to_string(),
            origin: origin.to_string(),
        });
    }
    if to.is_empty() {
        return Err(RemapParseError::EmptyTo {
            token: token.to_string(),
            origin: origin.to_string(),
        });
    }

    Ok(RemapEntry::new(from, to))
}

/// Parse a comma-delimited list of remapping rules.
///
/// A blank input yields no rules. Otherwise every piece must be a valid rule;
/// the first malformed piece aborts the whole list.
pub fn parse_remap_list(input: &str, origin: &str) -> Result<Vec<RemapEntry>, RemapParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }

    input
        .split(REMAP_ITEM_SEPARATOR)
        .enumerate()
        .map(|(position, piece)| {
            if piece.trim().is_empty() {
                Err(RemapParseError::EmptyToken {
                    position,
                    origin: origin.to_string(),
                })
            } else {
                parse_remap_token(piece, origin)
            }
        })
        .collect()
}
