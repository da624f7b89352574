//! Schema declaration types.
//!
//! A schema catalog maps top-level attribute names to their declarations.
//! Declarations nest: lists and sets carry an element schema or a nested
//! resource, maps carry an optional primitive element schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::set::ContentSet;
use crate::value::FieldValue;

/// A catalog of attribute declarations keyed by field name.
pub type SchemaMap = BTreeMap<String, Schema>;

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    String,
    /// Ordered list.
    List,
    /// Unordered, content-addressed set.
    Set,
    /// String-keyed map.
    Map,
}

/// Declaration of a single attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    /// Declared type.
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// The attribute may be set by the user.
    #[serde(default)]
    pub optional: bool,
    /// The attribute must be set by the user.
    #[serde(default)]
    pub required: bool,
    /// The attribute may be filled in by the provider after apply.
    #[serde(default)]
    pub computed: bool,
    /// Element declaration for lists, sets and maps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<Elem>,
    /// Minimum number of elements (lists and sets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u32>,
    /// Maximum number of elements (lists and sets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Element declaration of a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Elem {
    /// Each element is an object with its own fields.
    Resource {
        /// Fields of the nested object.
        fields: SchemaMap,
    },
    /// Each element follows a single schema.
    Schema(Box<Schema>),
}

impl ValueType {
    /// Returns true for bool, int, float and string.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        matches!(self, Self::Bool | Self::Int | Self::Float | Self::String)
    }

    /// Returns true for lists and sets.
    #[must_use]
    pub const fn is_counted(self) -> bool {
        matches!(self, Self::List | Self::Set)
    }

    /// Lowercase type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
        }
    }

    /// Zero value of a primitive or empty value of a collection.
    #[must_use]
    pub fn zero_value(self) -> FieldValue {
        match self {
            Self::Bool => FieldValue::Bool(false),
            Self::Int => FieldValue::Int(0),
            Self::Float => FieldValue::Float(0.0),
            Self::String => FieldValue::String(String::new()),
            Self::List => FieldValue::List(Vec::new()),
            Self::Set => FieldValue::Set(ContentSet::new()),
            Self::Map => FieldValue::Map(BTreeMap::new()),
        }
    }
}

impl Schema {
    /// Creates a bare declaration of the given type.
    #[must_use]
    pub const fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            optional: false,
            required: false,
            computed: false,
            elem: None,
            min_items: None,
            max_items: None,
            description: None,
        }
    }

    /// Creates a list whose elements follow `elem`.
    #[must_use]
    pub fn list_of(elem: Self) -> Self {
        Self::new(ValueType::List).with_elem(elem)
    }

    /// Creates a set whose elements follow `elem`.
    #[must_use]
    pub fn set_of(elem: Self) -> Self {
        Self::new(ValueType::Set).with_elem(elem)
    }

    /// Creates a map whose values follow `elem`.
    #[must_use]
    pub fn map_of(elem: Self) -> Self {
        Self::new(ValueType::Map).with_elem(elem)
    }

    /// Marks the attribute optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the attribute required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the attribute computed.
    #[must_use]
    pub const fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Sets a single-schema element.
    #[must_use]
    pub fn with_elem(mut self, elem: Self) -> Self {
        self.elem = Some(Elem::Schema(Box::new(elem)));
        self
    }

    /// Sets a nested resource element.
    #[must_use]
    pub fn with_fields(mut self, fields: SchemaMap) -> Self {
        self.elem = Some(Elem::Resource { fields });
        self
    }

    /// Sets the element count bounds.
    #[must_use]
    pub const fn with_items(mut self, min_items: Option<u32>, max_items: Option<u32>) -> Self {
        self.min_items = min_items;
        self.max_items = max_items;
        self
    }

    /// Type of map values; undeclared map elements are strings.
    #[must_use]
    pub fn map_value_type(&self) -> ValueType {
        match &self.elem {
            Some(Elem::Schema(inner)) if inner.value_type.is_primitive() => inner.value_type,
            _ => ValueType::String,
        }
    }

    /// Value reported for this attribute when it was never set.
    #[must_use]
    pub fn zero_value(&self) -> FieldValue {
        self.value_type.zero_value()
    }
}

/// Zero value of a nested object: every field at its own zero value.
#[must_use]
pub fn object_zero_value(fields: &SchemaMap) -> FieldValue {
    FieldValue::Object(
        fields
            .iter()
            .map(|(name, schema)| (name.clone(), schema.zero_value()))
            .collect(),
    )
}
