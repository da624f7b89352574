//! Recorded instance state.
//!
//! Recorded state is a flat map of dotted attribute paths to strings, using
//! the same counter conventions as change-sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::address::{LIST_COUNT, MAP_COUNT};
use crate::value::FieldValue;

/// Last known state of one resource instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceState {
    /// Provider-assigned identifier.
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Flattened attributes keyed by dotted path.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl InstanceState {
    /// Creates an empty state for the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Sets a single flattened attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Flattens a typed value under `key` and records it.
    #[must_use]
    pub fn with_value(mut self, key: &str, value: &FieldValue) -> Self {
        self.set_value(key, value);
        self
    }

    /// Flattens a typed value under `key` and records it.
    ///
    /// Lists and sets write a `#` counter, maps a `%` counter. Set elements
    /// are keyed by their membership hash.
    pub fn set_value(&mut self, key: &str, value: &FieldValue) {
        match value {
            FieldValue::List(items) => {
                self.attributes
                    .insert(format!("{key}.{LIST_COUNT}"), items.len().to_string());
                for (index, item) in items.iter().enumerate() {
                    self.set_value(&format!("{key}.{index}"), item);
                }
            }
            FieldValue::Set(set) => {
                self.attributes
                    .insert(format!("{key}.{LIST_COUNT}"), set.len().to_string());
                for (code, item) in set.as_map() {
                    self.set_value(&format!("{key}.{code}"), item);
                }
            }
            FieldValue::Map(entries) => {
                self.attributes
                    .insert(format!("{key}.{MAP_COUNT}"), entries.len().to_string());
                for (name, item) in entries {
                    self.set_value(&format!("{key}.{name}"), item);
                }
            }
            FieldValue::Object(fields) => {
                for (name, item) in fields {
                    self.set_value(&format!("{key}.{name}"), item);
                }
            }
            primitive => {
                self.attributes.insert(key.to_string(), primitive.normalized());
            }
        }
    }

    /// Looks up a flattened attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::{ContentSet, hash_value};

    #[test]
    fn test_flatten_collections() {
        let mut tags = BTreeMap::new();
        tags.insert("env".to_string(), FieldValue::String("prod".to_string()));

        let state = InstanceState::new("i-123")
            .with_value(
                "ports",
                &FieldValue::List(vec![FieldValue::Int(80), FieldValue::Int(443)]),
            )
            .with_value("tags", &FieldValue::Map(tags));

        assert_eq!(state.attribute("ports.#"), Some("2"));
        assert_eq!(state.attribute("ports.1"), Some("443"));
        assert_eq!(state.attribute("tags.%"), Some("1"));
        assert_eq!(state.attribute("tags.env"), Some("prod"));
    }

    #[test]
    fn test_flatten_set_uses_hash_keys() {
        let element = FieldValue::String("a".to_string());
        let state = InstanceState::new("i-123").with_value(
            "zones",
            &FieldValue::Set(ContentSet::from_values([element.clone()])),
        );

        let key = format!("zones.{}", hash_value(&element));
        assert_eq!(state.attribute("zones.#"), Some("1"));
        assert_eq!(state.attribute(&key), Some("a"));
    }

    #[test]
    fn test_wire_shape() {
        let state = InstanceState::new("i-123").with_attribute("name", "web");
        let encoded = serde_json::to_value(&state).expect("serialize");
        assert_eq!(
            encoded,
            serde_json::json!({"ID": "i-123", "Attributes": {"name": "web"}})
        );
    }
}
