//! Typed attribute values.
//!
//! Recorded state and change-sets carry every leaf as a string. This module
//! turns those strings into typed values and gives each value a canonical
//! text form used for content-addressed hashing.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{OverlayError, ReadError, Result};
use crate::schema::ValueType;
use crate::set::ContentSet;

/// Text form of a value that is only known after apply.
pub const UNKNOWN_VALUE: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String.
    String(String),
    /// Ordered list.
    List(Vec<FieldValue>),
    /// Content-addressed set.
    Set(ContentSet),
    /// String-keyed map.
    Map(BTreeMap<String, FieldValue>),
    /// Nested object.
    Object(BTreeMap<String, FieldValue>),
    /// Placeholder for a value resolved only by apply.
    Unknown,
}

impl FieldValue {
    /// Name of the variant, for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this is the unknown placeholder.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list elements, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the set, if this is one.
    #[must_use]
    pub const fn as_set(&self) -> Option<&ContentSet> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Returns the entries of a map or object.
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(entries) | Self::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Canonical text form. Equal values always normalize identically.
    #[must_use]
    pub fn normalized(&self) -> String {
        let mut out = String::new();
        self.write_normalized(&mut out);
        out
    }

    fn write_normalized(&self, out: &mut String) {
        match self {
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Int(i) => out.push_str(&i.to_string()),
            Self::Float(f) => out.push_str(&f.to_string()),
            Self::String(s) => out.push_str(s),
            Self::Unknown => out.push_str(UNKNOWN_VALUE),
            Self::List(items) => {
                out.push('[');
                for item in items {
                    item.write_normalized(out);
                    out.push(';');
                }
                out.push(']');
            }
            Self::Set(set) => {
                out.push('[');
                for item in set.values() {
                    item.write_normalized(out);
                    out.push(';');
                }
                out.push(']');
            }
            Self::Map(entries) | Self::Object(entries) => {
                out.push('{');
                for (key, value) in entries {
                    out.push_str(key);
                    out.push(':');
                    value.write_normalized(out);
                    out.push(';');
                }
                out.push('}');
            }
        }
    }
}

/// Decodes a raw string into the given primitive type.
///
/// An empty string is "no value" for bool, int and float.
///
/// # Errors
///
/// Returns a decode error if the string does not parse, or an internal error
/// if `value_type` is not primitive.
pub fn decode_primitive(value_type: ValueType, raw: &str, address: &str) -> Result<Option<FieldValue>> {
    if raw == UNKNOWN_VALUE {
        return Ok(Some(FieldValue::Unknown));
    }
    if value_type == ValueType::String {
        return Ok(Some(FieldValue::String(raw.to_string())));
    }
    if raw.is_empty() {
        return Ok(None);
    }

    let value = match value_type {
        ValueType::Bool => FieldValue::Bool(
            parse_bool(raw).ok_or_else(|| ReadError::decode(address, raw, "bool"))?,
        ),
        ValueType::Int => FieldValue::Int(
            raw.parse()
                .map_err(|_| ReadError::decode(address, raw, "int"))?,
        ),
        ValueType::Float => FieldValue::Float(
            raw.parse()
                .map_err(|_| ReadError::decode(address, raw, "float"))?,
        ),
        other => {
            return Err(OverlayError::internal(format!(
                "cannot decode {} at {address} as a primitive",
                other.name()
            )));
        }
    };

    Ok(Some(value))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

/// Weakly coerces an opaque extra payload to a string.
///
/// Returns `None` for `null`, meaning the caller keeps its own value.
///
/// # Errors
///
/// Returns a decode error for arrays and objects.
pub fn weak_decode_string(extra: &serde_json::Value, address: &str) -> Result<Option<String>> {
    use serde_json::Value;

    match extra {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Array(_) | Value::Object(_) => {
            Err(ReadError::decode(address, extra.to_string(), "string").into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_primitives() {
        assert_eq!(
            decode_primitive(ValueType::Int, "42", "port").expect("int"),
            Some(FieldValue::Int(42))
        );
        assert_eq!(
            decode_primitive(ValueType::Bool, "True", "enabled").expect("bool"),
            Some(FieldValue::Bool(true))
        );
        assert_eq!(
            decode_primitive(ValueType::Float, "0.5", "ratio").expect("float"),
            Some(FieldValue::Float(0.5))
        );
        assert_eq!(
            decode_primitive(ValueType::String, "", "name").expect("string"),
            Some(FieldValue::String(String::new()))
        );
        assert_eq!(decode_primitive(ValueType::Int, "", "port").expect("empty"), None);
        assert_eq!(
            decode_primitive(ValueType::Int, UNKNOWN_VALUE, "port").expect("unknown"),
            Some(FieldValue::Unknown)
        );
    }

    #[test]
    fn test_decode_failure_is_an_error() {
        let err = decode_primitive(ValueType::Int, "eighty", "port").unwrap_err();
        assert!(err.is_recoverable());

        assert!(decode_primitive(ValueType::Bool, "yes", "enabled").is_err());
        assert!(decode_primitive(ValueType::List, "1", "ports").is_err());
    }

    #[test]
    fn test_weak_decode_string() {
        assert_eq!(weak_decode_string(&json!("abc"), "a").expect("string"), Some("abc".to_string()));
        assert_eq!(weak_decode_string(&json!(true), "a").expect("bool"), Some("1".to_string()));
        assert_eq!(weak_decode_string(&json!(12), "a").expect("number"), Some("12".to_string()));
        assert_eq!(weak_decode_string(&json!(null), "a").expect("null"), None);
        assert!(weak_decode_string(&json!(["x"]), "a").is_err());
    }

    #[test]
    fn test_normalized_is_order_stable_for_maps() {
        let mut first = BTreeMap::new();
        first.insert("b".to_string(), FieldValue::Int(2));
        first.insert("a".to_string(), FieldValue::Int(1));

        let mut second = BTreeMap::new();
        second.insert("a".to_string(), FieldValue::Int(1));
        second.insert("b".to_string(), FieldValue::Int(2));

        assert_eq!(
            FieldValue::Object(first).normalized(),
            FieldValue::Object(second).normalized()
        );
        assert_eq!(
            FieldValue::List(vec![FieldValue::Int(1), FieldValue::Bool(false)]).normalized(),
            "[1;false;]"
        );
    }

    #[test]
    fn test_serializes_as_plain_json() {
        let value = FieldValue::List(vec![
            FieldValue::String("a".to_string()),
            FieldValue::Int(3),
        ]);
        assert_eq!(serde_json::to_value(&value).expect("serialize"), json!(["a", 3]));
        assert_eq!(
            serde_json::to_value(FieldValue::Unknown).expect("serialize"),
            json!(null)
        );
    }
}
