//! Parameter merge logic
//!
//! Layers are applied left to right with:
//! - Tables: deep-merge by key
//! - Lists: REPLACE (last wins, never concatenated)
//! - Scalars: override (last wins)
//! - Null in an overlay: no override (key skipped)

use crate::value::{ParamValue, ParameterMapping};

/// Deep merge `overlay` on top of `base`.
///
/// Keys already present keep their position; new keys are appended in the
/// overlay's order. A table that replaces a non-table (or is introduced
/// fresh) has its own null entries dropped, as if merged onto nothing.
pub fn deep_merge(mut base: ParameterMapping, overlay: ParameterMapping) -> ParameterMapping {
    for (key, incoming) in overlay {
        match incoming {
            // Absent and null are the same thing for an overlay
            ParamValue::Null => {}

            ParamValue::Table(incoming) => match base.get_mut(&key) {
                Some(ParamValue::Table(existing)) => {
                    let current = std::mem::take(existing);
                    *existing = deep_merge(current, incoming);
                }
                _ => {
                    base.insert(
                        key,
                        ParamValue::Table(deep_merge(ParameterMapping::new(), incoming)),
                    );
                }
            },

            // Lists and scalars: incoming wins
            other => {
                base.insert(key, other);
            }
        }
    }
    base
}

/// Merge layers in order (first is base, last has highest precedence).
///
/// The first layer is taken as is, so `merge_layers([a]) == a` even when `a`
/// holds null values. No layers give an empty mapping.
pub fn merge_layers<I>(layers: I) -> ParameterMapping
where
    I: IntoIterator<Item = ParameterMapping>,
{
    let mut layers = layers.into_iter();
    match layers.next() {
        Some(base) => layers.fold(base, deep_merge),
        None => ParameterMapping::new(),
    }
}

/// Borrowing form of [`merge_layers`].
pub fn merge(layers: &[ParameterMapping]) -> ParameterMapping {
    merge_layers(layers.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::mapping_from_json;
    use serde_json::json;

    fn map(value: serde_json::Value) -> ParameterMapping {
        mapping_from_json(value)
    }

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(map(json!({"timeout": 100})), map(json!({"timeout": 200})));
        assert_eq!(result, map(json!({"timeout": 200})));
    }

    #[test]
    fn test_last_wins_for_scalars_and_lists() {
        let a = map(json!({"x": 1, "y": [1, 2]}));
        let b = map(json!({"x": 2, "y": [3]}));
        assert_eq!(merge(&[a, b]), map(json!({"x": 2, "y": [3]})));
    }

    #[test]
    fn test_table_deep_merge() {
        let a = map(json!({"n": {"a": 1, "b": 2}}));
        let b = map(json!({"n": {"b": 3, "c": 4}}));
        assert_eq!(merge(&[a, b]), map(json!({"n": {"a": 1, "b": 3, "c": 4}})));
    }

    #[test]
    fn test_nested_deep_merge() {
        let base = map(json!({
            "controller": {
                "ros__parameters": {
                    "gains": {"p": 1.0, "i": 0.1},
                    "rate": 50
                }
            }
        }));
        let overlay = map(json!({
            "controller": {
                "ros__parameters": {
                    "gains": {"i": 0.2, "d": 0.01}
                }
            }
        }));
        let result = deep_merge(base, overlay);
        assert_eq!(
            result,
            map(json!({
                "controller": {
                    "ros__parameters": {
                        "gains": {"p": 1.0, "i": 0.2, "d": 0.01},
                        "rate": 50
                    }
                }
            }))
        );
    }

    #[test]
    fn test_null_is_no_override() {
        let base = map(json!({"value": 100, "keep": "x"}));
        let overlay = map(json!({"value": null}));
        assert_eq!(deep_merge(base.clone(), overlay), base);
    }

    #[test]
    fn test_empty_string_is_an_override() {
        let result = deep_merge(map(json!({"frame": "map"})), map(json!({"frame": ""})));
        assert_eq!(result, map(json!({"frame": ""})));
    }

    #[test]
    fn test_scalar_replaces_table_and_back() {
        let a = map(json!({"n": {"a": 1}}));
        let b = map(json!({"n": 5}));
        let c = map(json!({"n": {"z": null, "b": 2}}));

        assert_eq!(merge(&[a.clone(), b.clone()]), map(json!({"n": 5})));
        assert_eq!(merge(&[a, b, c]), map(json!({"n": {"b": 2}})));
    }

    #[test]
    fn test_empty_and_single() {
        assert!(merge(&[]).is_empty());

        let a = map(json!({"a": null, "b": [1, {"c": 2}], "d": {"e": null}}));
        assert_eq!(merge(&[a.clone()]), a);
    }

    #[test]
    fn test_regrouping_is_equivalent() {
        let a = map(json!({"x": 1, "n": {"a": 1, "b": [1]}}));
        let b = map(json!({"n": {"b": [2, 3], "c": null}, "y": true}));
        let c = map(json!({"n": {"a": {"deep": 1}}, "x": null}));

        let flat = merge(&[a.clone(), b.clone(), c.clone()]);
        let grouped = merge(&[merge(&[a, b]), c]);
        assert_eq!(flat, grouped);
    }

    #[test]
    fn test_key_order_is_stable() {
        let a = map(json!({"a": 1, "b": 2}));
        let mut overlay = ParameterMapping::new();
        overlay.insert("c".to_string(), ParamValue::Integer(3));
        overlay.insert("a".to_string(), ParamValue::Integer(10));

        let keys: Vec<_> = deep_merge(a, overlay).keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
