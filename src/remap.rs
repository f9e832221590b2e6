//! Remapping resolution
//!
//! Folds remapping rules from four origins, in precedence order:
//! 1. Defaults supplied by the launch file
//! 2. A YAML remap file
//! 3. The CLI string
//! 4. The explicit launch argument
//!
//! A later rule for the same `from` name overwrites the destination but keeps
//! the position where that name was first seen.

use indexmap::IndexMap;
use launch_args::{parse_remap_list, parse_remap_token, RemapEntry, RemapParseError};
use serde::{Deserialize, Serialize};

use crate::value::ParamValue;

/// Origin label for built-in default rules.
pub const ORIGIN_DEFAULTS: &str = "defaults";
/// Origin label for the CLI remap string.
pub const ORIGIN_CLI: &str = "cli";
/// Origin label for the explicit launch argument.
pub const ORIGIN_LAUNCH_ARG: &str = "launch argument";

/// Resolved remapping table: at most one destination per source name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemapSet {
    entries: IndexMap<String, String>,
}

impl RemapSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule. An existing `from` keeps its position and gets the new
    /// destination.
    pub fn insert(&mut self, entry: RemapEntry) {
        self.entries.insert(entry.from, entry.to);
    }

    pub fn extend<I: IntoIterator<Item = RemapEntry>>(&mut self, entries: I) {
        for entry in entries {
            self.insert(entry);
        }
    }

    pub fn get(&self, from: &str) -> Option<&str> {
        self.entries.get(from).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rules as `(from, to)` pairs, in table order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn entries(&self) -> Vec<RemapEntry> {
        self.iter().map(|(from, to)| RemapEntry::new(from, to)).collect()
    }

    /// Rules as `from:=to` strings.
    pub fn to_rules(&self) -> Vec<String> {
        self.iter().map(|(from, to)| format!("{}:={}", from, to)).collect()
    }
}

impl FromIterator<RemapEntry> for RemapSet {
    fn from_iter<I: IntoIterator<Item = RemapEntry>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

fn invalid_entry(entry: &ParamValue, origin: &str, reason: &str) -> RemapParseError {
    RemapParseError::InvalidEntry {
        entry: serde_json::to_string(entry).unwrap_or_else(|_| entry.kind().to_string()),
        origin: origin.to_string(),
        reason: reason.to_string(),
    }
}

fn remap_from_item(item: &ParamValue, origin: &str) -> Result<RemapEntry, RemapParseError> {
    match item {
        ParamValue::String(rule) => parse_remap_token(rule, origin),

        ParamValue::List(pair) => match pair.as_slice() {
            [ParamValue::String(from), ParamValue::String(to)] => {
                parse_remap_token(&format!("{}:={}", from, to), origin)
            }
            _ => Err(invalid_entry(item, origin, "expected a [from, to] pair of strings")),
        },

        ParamValue::Table(table) => {
            match (
                table.get("from").and_then(ParamValue::as_str),
                table.get("to").and_then(ParamValue::as_str),
            ) {
                (Some(from), Some(to)) if table.len() == 2 => {
                    parse_remap_token(&format!("{}:={}", from, to), origin)
                }
                _ => Err(invalid_entry(
                    item,
                    origin,
                    "expected a mapping with exactly 'from' and 'to' strings",
                )),
            }
        }

        _ => Err(invalid_entry(
            item,
            origin,
            "expected a 'from:=to' string, a [from, to] pair or a {from, to} mapping",
        )),
    }
}

/// Extract remapping rules from a parsed YAML document.
///
/// Accepted shapes:
/// - a list of `"from:=to"` strings, `[from, to]` pairs or `{from, to}` mappings
/// - a mapping with a `remappings` key holding such a list
/// - a plain `from: to` mapping
/// - an empty document (no rules)
pub fn remaps_from_yaml(doc: &ParamValue, origin: &str) -> Result<Vec<RemapEntry>, RemapParseError> {
    match doc {
        ParamValue::Null => Ok(Vec::new()),

        ParamValue::List(items) => items
            .iter()
            .map(|item| remap_from_item(item, origin))
            .collect(),

        ParamValue::Table(table) => {
            if let Some(list) = table.get("remappings") {
                return match list {
                    ParamValue::List(_) | ParamValue::Null => remaps_from_yaml(list, origin),
                    other => Err(invalid_entry(other, origin, "'remappings' must be a list")),
                };
            }
            table
                .iter()
                .map(|(from, to)| match to {
                    ParamValue::String(to) => parse_remap_token(&format!("{}:={}", from, to), origin),
                    other => Err(invalid_entry(other, origin, "destination must be a string")),
                })
                .collect()
        }

        other => Err(invalid_entry(other, origin, "expected a list or mapping of remappings")),
    }
}

/// Resolve remapping rules from all origins.
///
/// Every origin is parsed before anything is folded, so a malformed token
/// anywhere yields an error and no partial table.
pub fn resolve_remappings(
    defaults: &[RemapEntry],
    yaml: Option<(&ParamValue, &str)>,
    cli: &str,
    launch_arg: &str,
) -> Result<RemapSet, RemapParseError> {
    let defaults = defaults
        .iter()
        .map(|entry| parse_remap_token(&entry.to_rule(), ORIGIN_DEFAULTS))
        .collect::<Result<Vec<_>, _>>()?;
    let from_yaml = match yaml {
        Some((doc, origin)) => remaps_from_yaml(doc, origin)?,
        None => Vec::new(),
    };
    let from_cli = parse_remap_list(cli, ORIGIN_CLI)?;
    let from_launch_arg = parse_remap_list(launch_arg, ORIGIN_LAUNCH_ARG)?;

    Ok(defaults
        .into_iter()
        .chain(from_yaml)
        .chain(from_cli)
        .chain(from_launch_arg)
        .collect())
}
