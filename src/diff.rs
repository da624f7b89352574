//! Change-set types.
//!
//! A change-set is a flat, ordered mapping from dotted attribute paths to
//! attribute-level change records. Collection sizes travel as sibling counter
//! keys (`<path>.#` for lists and sets, `<path>.%` for maps). The serialized
//! field names are part of the interchange format with the planning stage and
//! must not change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Change to a single attribute.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDiff {
    /// Value in recorded state.
    #[serde(default)]
    pub old: String,
    /// Value after apply.
    #[serde(default)]
    pub new: String,
    /// The new value is unknown until apply.
    #[serde(default)]
    pub new_computed: bool,
    /// The attribute is removed.
    #[serde(default)]
    pub new_removed: bool,
    /// Provider payload that supersedes `new` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_extra: Option<serde_json::Value>,
    /// Changing this attribute forces replacement.
    #[serde(default)]
    pub requires_new: bool,
    /// The value must not be displayed.
    #[serde(default)]
    pub sensitive: bool,
}

/// Pending changes for one resource instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceDiff {
    /// Change records keyed by dotted path.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeDiff>,
    /// The instance is destroyed.
    #[serde(default)]
    pub destroy: bool,
    /// The instance is destroyed because it is tainted.
    #[serde(default)]
    pub destroy_tainted: bool,
}

/// Overall effect of a change-set on its instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// Nothing changes.
    None,
    /// A new instance is created.
    Create,
    /// The instance is updated in place.
    Update,
    /// The instance is destroyed.
    Destroy,
    /// The instance is destroyed, then created again.
    DestroyCreate,
}

impl AttributeDiff {
    /// A change to a known value.
    #[must_use]
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
            ..Self::default()
        }
    }

    /// A change to a value that is only known after apply.
    #[must_use]
    pub fn computed(old: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new_computed: true,
            ..Self::default()
        }
    }

    /// Removal of an existing value.
    #[must_use]
    pub fn removed(old: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new_removed: true,
            ..Self::default()
        }
    }

    /// Attaches a provider payload.
    #[must_use]
    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.new_extra = Some(extra);
        self
    }

    /// Marks the change as forcing replacement.
    #[must_use]
    pub const fn forcing_new(mut self) -> Self {
        self.requires_new = true;
        self
    }
}

impl InstanceDiff {
    /// Creates an empty change-set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a change record.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, diff: AttributeDiff) -> Self {
        self.attributes.insert(key.into(), diff);
        self
    }

    /// Looks up the change record at a dotted key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&AttributeDiff> {
        self.attributes.get(key)
    }

    /// Whether the change-set does nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.destroy && !self.destroy_tainted && self.attributes.is_empty()
    }

    /// Whether any record lives below the top-level field `first`.
    #[must_use]
    pub fn contains_field(&self, first: &str) -> bool {
        let prefix = format!("{first}.");
        self.attributes.keys().any(|k| k.starts_with(&prefix))
    }

    /// Records whose key starts with `prefix`, in key order.
    pub fn keys_under<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a AttributeDiff)> + 'a {
        self.attributes
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Whether any change forces replacement.
    #[must_use]
    pub fn requires_new(&self) -> bool {
        self.attributes.values().any(|a| a.requires_new)
    }

    /// Overall effect of the change-set.
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        if self.is_empty() {
            return ChangeType::None;
        }
        let destroying = self.destroy || self.destroy_tainted;
        match (self.requires_new(), destroying) {
            (true, true) => ChangeType::DestroyCreate,
            (false, true) => ChangeType::Destroy,
            (true, false) => ChangeType::Create,
            (false, false) => ChangeType::Update,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "no change",
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::DestroyCreate => "destroy/create",
        };
        write!(f, "{s}")
    }
}
