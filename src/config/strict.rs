//! Type-checked overlay merge
//!
//! Unlike [`deep_merge`](super::deep_merge), a strict merge only lets an
//! overlay change leaves that already exist in the defaults, and only with a
//! value of the same type. Overlay keys the defaults don't know are reported
//! as ignored rather than added.

use serde::{Deserialize, Serialize};

use crate::value::{ParamValue, ParameterMapping};

/// Knobs for [`merge_strict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrictOptions {
    /// A null overlay value sets the leaf to null (otherwise the default is
    /// kept and the key reported as ignored).
    pub allow_none: bool,

    /// Integers and floats may replace each other. Booleans never count as
    /// numbers.
    pub numeric_compat: bool,
}

impl Default for StrictOptions {
    fn default() -> Self {
        Self {
            allow_none: true,
            numeric_compat: false,
        }
    }
}

/// Outcome of a strict merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrictMerge {
    /// Defaults with the accepted overrides applied
    pub merged: ParameterMapping,

    /// Dotted key paths whose value came from the overlay
    pub applied: Vec<String>,

    /// Dotted key paths present in the overlay but not applied
    pub ignored: Vec<String>,
}

/// Strict merge failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("{path}: type mismatch (default={expected}, override={found})")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Collect leaf paths. Lists and empty tables are leaves.
fn flatten<'a>(
    table: &'a ParameterMapping,
    prefix: &mut Vec<&'a str>,
    out: &mut Vec<(Vec<&'a str>, &'a ParamValue)>,
) {
    for (key, value) in table {
        prefix.push(key);
        match value {
            ParamValue::Table(inner) if !inner.is_empty() => flatten(inner, prefix, out),
            leaf => out.push((prefix.clone(), leaf)),
        }
        prefix.pop();
    }
}

fn leaf_at<'a>(table: &'a ParameterMapping, path: &[&str]) -> Option<&'a ParamValue> {
    let (first, rest) = path.split_first()?;
    let mut current = table.get(*first)?;
    for part in rest {
        current = current.as_table()?.get(*part)?;
    }
    Some(current)
}

fn set_leaf(table: &mut ParameterMapping, path: &[&str], value: ParamValue) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    match (table.get_mut(*first), rest.is_empty()) {
        (Some(slot), true) => *slot = value,
        (Some(ParamValue::Table(inner)), false) => set_leaf(inner, rest, value),
        _ => {}
    }
}

fn same_type(default: &ParamValue, incoming: &ParamValue, numeric_compat: bool) -> bool {
    use ParamValue::{Float, Integer};

    if std::mem::discriminant(default) == std::mem::discriminant(incoming) {
        return true;
    }
    numeric_compat
        && matches!(
            (default, incoming),
            (Integer(_), Float(_)) | (Float(_), Integer(_))
        )
}

/// Overlay `overlay` onto `defaults`, checking types leaf by leaf.
pub fn merge_strict(
    defaults: &ParameterMapping,
    overlay: &ParameterMapping,
    options: StrictOptions,
) -> Result<StrictMerge, MergeError> {
    let mut default_leaves = Vec::new();
    flatten(defaults, &mut Vec::new(), &mut default_leaves);
    let mut overlay_leaves = Vec::new();
    flatten(overlay, &mut Vec::new(), &mut overlay_leaves);

    let mut merged = defaults.clone();
    let mut applied = Vec::new();
    let mut ignored = Vec::new();

    for (path, default) in &default_leaves {
        let Some(incoming) = leaf_at(overlay, path) else {
            continue;
        };
        // An empty default table declares no keys; its overlay contents are
        // reported as ignored below.
        if default.as_table().is_some()
            && matches!(incoming, ParamValue::Table(inner) if !inner.is_empty())
        {
            continue;
        }
        let dotted = path.join(".");

        if incoming.is_null() {
            if options.allow_none {
                set_leaf(&mut merged, path, ParamValue::Null);
                applied.push(dotted);
            } else {
                ignored.push(dotted);
            }
            continue;
        }

        if !same_type(default, incoming, options.numeric_compat) {
            return Err(MergeError::TypeMismatch {
                path: dotted,
                expected: default.kind(),
                found: incoming.kind(),
            });
        }

        set_leaf(&mut merged, path, incoming.clone());
        applied.push(dotted);
    }

    for (path, _) in &overlay_leaves {
        let known = default_leaves.iter().any(|(d, _)| d == path);
        if !known {
            ignored.push(path.join("."));
        }
    }

    Ok(StrictMerge {
        merged,
        applied,
        ignored,
    })
}
