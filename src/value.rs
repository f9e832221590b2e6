//! Parameter value tree.
//!
//! Parameter files are tree shaped: every value is a scalar, a sequence or a
//! nested mapping. Mapping equality ignores key order.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Mapping from parameter name to value.
pub type ParameterMapping = IndexMap<String, ParamValue>;

/// A single parameter value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ParamValue>),
    Table(ParameterMapping),
}

impl ParamValue {
    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Table(_) => "table",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    pub fn as_table(&self) -> Option<&ParameterMapping> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; integers widen to float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert a parsed YAML document.
    ///
    /// Tags are dropped. Mapping keys must be strings, numbers or booleans.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, String> {
        use serde_yaml::Value as Y;

        Ok(match value {
            Y::Null => Self::Null,
            Y::Bool(b) => Self::Bool(b),
            Y::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    return Err(format!("unsupported number '{}'", n));
                }
            }
            Y::String(s) => Self::String(s),
            Y::Sequence(seq) => Self::List(
                seq.into_iter()
                    .map(Self::from_yaml)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Y::Mapping(map) => {
                let mut table = ParameterMapping::with_capacity(map.len());
                for (k, v) in map {
                    let key = match k {
                        Y::String(s) => s,
                        Y::Number(n) => n.to_string(),
                        Y::Bool(b) => b.to_string(),
                        other => {
                            return Err(format!(
                                "mapping keys must be scalars, found {:?}",
                                other
                            ))
                        }
                    };
                    table.insert(key, Self::from_yaml(v)?);
                }
                Self::Table(table)
            }
            Y::Tagged(tagged) => Self::from_yaml(tagged.value)?,
        })
    }

    /// Convert a parsed TOML value. Datetimes become strings.
    pub fn from_toml(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::String(s),
            toml::Value::Integer(i) => Self::Integer(i),
            toml::Value::Float(f) => Self::Float(f),
            toml::Value::Boolean(b) => Self::Bool(b),
            toml::Value::Datetime(dt) => Self::String(dt.to_string()),
            toml::Value::Array(arr) => Self::List(arr.into_iter().map(Self::from_toml).collect()),
            toml::Value::Table(table) => Self::Table(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_toml(v)))
                    .collect(),
            ),
        }
    }

    /// Parse a scalar the way a YAML plain scalar would be typed
    /// (`true`, `3`, `0.5`, `~`, anything else is a string).
    pub fn parse_scalar(text: &str) -> Self {
        match serde_yaml::from_str::<serde_yaml::Value>(text) {
            Ok(v @ (serde_yaml::Value::Null
            | serde_yaml::Value::Bool(_)
            | serde_yaml::Value::Number(_)
            | serde_yaml::Value::String(_))) => {
                Self::from_yaml(v).unwrap_or_else(|_| Self::String(text.to_string()))
            }
            _ => Self::String(text.to_string()),
        }
    }
}

/// Floats compare by total order, so `.nan` equals itself and builds from
/// identical inputs compare equal.
impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b).is_eq(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Table(a), Self::Table(b)) => a == b,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as J;

        match value {
            J::Null => Self::Null,
            J::Bool(b) => Self::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Self::String(s),
            J::Array(arr) => Self::List(arr.into_iter().map(Self::from).collect()),
            J::Object(map) => Self::Table(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<ParameterMapping> for ParamValue {
    fn from(t: ParameterMapping) -> Self {
        Self::Table(t)
    }
}

/// Build a mapping from a JSON object. Non-objects give an empty mapping.
pub fn mapping_from_json(value: serde_json::Value) -> ParameterMapping {
    match ParamValue::from(value) {
        ParamValue::Table(t) => t,
        _ => ParameterMapping::new(),
    }
}

/// Serializes a mapping for JSON output, keeping key order. Non-finite
/// floats, which JSON cannot hold, become their YAML spellings (`.inf`,
/// `-.inf`, `.nan`) instead of `null`.
#[derive(Debug, Clone, Copy)]
pub struct JsonMapping<'a>(pub &'a ParameterMapping);

struct JsonValue<'a>(&'a ParamValue);

impl Serialize for JsonMapping<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, &JsonValue(value))?;
        }
        map.end()
    }
}

impl Serialize for JsonValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            ParamValue::Float(f) if f.is_nan() => serializer.serialize_str(".nan"),
            ParamValue::Float(f) if f.is_infinite() => {
                serializer.serialize_str(if *f > 0.0 { ".inf" } else { "-.inf" })
            }
            ParamValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&JsonValue(item))?;
                }
                seq.end()
            }
            ParamValue::Table(table) => JsonMapping(table).serialize(serializer),
            other => other.serialize(serializer),
        }
    }
}

/// Look up a value by dot-separated path.
pub fn lookup<'a>(mapping: &'a ParameterMapping, path: &str) -> Option<&'a ParamValue> {
    let mut parts = path.split('.');
    let mut current = mapping.get(parts.next()?)?;
    for part in parts {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

/// Insert a value at a dot-separated path, creating (or replacing
/// non-table values with) intermediate tables as needed.
pub fn insert_path(mapping: &mut ParameterMapping, path: &[&str], value: ParamValue) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = mapping;
    for part in parents {
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| ParamValue::Table(ParameterMapping::new()));
        if !slot.is_table() {
            *slot = ParamValue::Table(ParameterMapping::new());
        }
        let ParamValue::Table(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(last.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_yaml_types() {
        let doc: serde_yaml::Value = serde_yaml::from_str(
            "a: 1\nb: 2.5\nc: true\nd: hello\ne: [1, two]\nf: ~\n3: numeric_key\n",
        )
        .unwrap();
        let value = ParamValue::from_yaml(doc).unwrap();
        let table = value.as_table().unwrap();

        assert_eq!(table["a"], ParamValue::Integer(1));
        assert_eq!(table["b"], ParamValue::Float(2.5));
        assert_eq!(table["c"], ParamValue::Bool(true));
        assert_eq!(table["d"], ParamValue::from("hello"));
        assert_eq!(
            table["e"],
            ParamValue::List(vec![ParamValue::Integer(1), ParamValue::from("two")])
        );
        assert!(table["f"].is_null());
        assert_eq!(table["3"], ParamValue::from("numeric_key"));
    }

    #[test]
    fn test_from_yaml_rejects_sequence_keys() {
        let doc: serde_yaml::Value = serde_yaml::from_str("? [a, b]\n: 1\n").unwrap();
        assert!(ParamValue::from_yaml(doc).is_err());
    }

    #[test]
    fn test_from_toml() {
        let table: toml::Table = toml::from_str("rate = 10\n[sub]\nname = \"x\"\n").unwrap();
        let value = ParamValue::from_toml(toml::Value::Table(table));
        let table = value.as_table().unwrap();
        assert_eq!(table["rate"], ParamValue::Integer(10));
        assert_eq!(lookup(table, "sub.name"), Some(&ParamValue::from("x")));
    }

    #[test]
    fn test_integer_and_float_are_distinct() {
        assert_ne!(ParamValue::Integer(1), ParamValue::Float(1.0));
        assert_eq!(ParamValue::Integer(1).as_f64(), Some(1.0));
    }

    #[test]
    fn test_equality_ignores_key_order() {
        let a = mapping_from_json(json!({"x": 1, "y": 2}));
        let mut b = ParameterMapping::new();
        b.insert("y".to_string(), ParamValue::Integer(2));
        b.insert("x".to_string(), ParamValue::Integer(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(ParamValue::parse_scalar("true"), ParamValue::Bool(true));
        assert_eq!(ParamValue::parse_scalar("42"), ParamValue::Integer(42));
        assert_eq!(ParamValue::parse_scalar("0.25"), ParamValue::Float(0.25));
        assert_eq!(ParamValue::parse_scalar("~"), ParamValue::Null);
        assert_eq!(ParamValue::parse_scalar("base_link"), ParamValue::from("base_link"));
        assert_eq!(ParamValue::parse_scalar("[1, 2]"), ParamValue::from("[1, 2]"));
    }

    #[test]
    fn test_insert_path() {
        let mut mapping = mapping_from_json(json!({"a": 1}));
        insert_path(&mut mapping, &["a", "b", "c"], ParamValue::Integer(3));
        assert_eq!(lookup(&mapping, "a.b.c"), Some(&ParamValue::Integer(3)));
    }

    #[test]
    fn test_serialize_untagged() {
        let mapping = mapping_from_json(json!({"n": {"a": [1, 2.5, "s", null]}}));
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json, json!({"n": {"a": [1, 2.5, "s", null]}}));
    }

    #[test]
    fn test_nan_equals_itself() {
        assert_eq!(ParamValue::Float(f64::NAN), ParamValue::Float(f64::NAN));
        assert_ne!(ParamValue::Float(f64::INFINITY), ParamValue::Null);
        assert_ne!(ParamValue::Float(1.0), ParamValue::Integer(1));
    }

    #[test]
    fn test_json_keeps_non_finite_floats() {
        let mut mapping = mapping_from_json(json!({"z": 1, "range": null}));
        mapping.insert("max".to_string(), ParamValue::Float(f64::INFINITY));
        mapping.insert("min".to_string(), ParamValue::Float(f64::NEG_INFINITY));
        mapping.insert(
            "l".to_string(),
            ParamValue::List(vec![ParamValue::Float(f64::NAN), ParamValue::Float(0.5)]),
        );

        let text = serde_json::to_string(&JsonMapping(&mapping)).unwrap();
        assert_eq!(
            text,
            r#"{"z":1,"range":null,"max":".inf","min":"-.inf","l":[".nan",0.5]}"#
        );
    }
}
