//! Address-to-schema resolution.
//!
//! Walks an address through the catalog and yields the kind of the innermost
//! attribute. Counter segments resolve to integers; collection element keys
//! descend into the element declaration.

use crate::address::{FieldAddress, LIST_COUNT, MAP_COUNT};
use crate::value::FieldValue;

use super::spec::{Elem, Schema, SchemaMap, ValueType, object_zero_value};

/// Resolved kind of an addressed attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind<'a> {
    /// A bool, int, float or string.
    Primitive(ValueType),
    /// An ordered list with its declaration.
    List(&'a Schema),
    /// A content-addressed set with its declaration.
    Set(&'a Schema),
    /// A string-keyed map with its declaration.
    Map(&'a Schema),
    /// A nested object with its fields.
    Object(&'a SchemaMap),
}

impl<'a> FieldKind<'a> {
    /// Kind of a declared attribute.
    #[must_use]
    pub const fn of(schema: &'a Schema) -> Self {
        match schema.value_type {
            ValueType::List => Self::List(schema),
            ValueType::Set => Self::Set(schema),
            ValueType::Map => Self::Map(schema),
            primitive => Self::Primitive(primitive),
        }
    }

    /// Value reported for an attribute of this kind that was never set.
    #[must_use]
    pub fn zero_value(&self) -> FieldValue {
        match self {
            Self::Primitive(value_type) => value_type.zero_value(),
            Self::List(schema) | Self::Set(schema) | Self::Map(schema) => schema.zero_value(),
            Self::Object(fields) => object_zero_value(fields),
        }
    }
}

/// Resolves the kind of the attribute at `address`.
///
/// Returns `None` when the address leaves the declared tree. The empty
/// address resolves to the top-level object.
#[must_use]
pub fn resolve_address<'a>(fields: &'a SchemaMap, address: &FieldAddress) -> Option<FieldKind<'a>> {
    resolve_in_object(fields, address.segments())
}

fn resolve_in_object<'a>(fields: &'a SchemaMap, segments: &[String]) -> Option<FieldKind<'a>> {
    let Some((name, rest)) = segments.split_first() else {
        return Some(FieldKind::Object(fields));
    };
    let schema = fields.get(name)?;
    resolve_in_schema(schema, rest)
}

fn resolve_in_schema<'a>(schema: &'a Schema, segments: &[String]) -> Option<FieldKind<'a>> {
    let Some((next, rest)) = segments.split_first() else {
        return Some(FieldKind::of(schema));
    };

    match schema.value_type {
        ValueType::Bool | ValueType::Int | ValueType::Float | ValueType::String => None,
        ValueType::List | ValueType::Set => {
            if next == LIST_COUNT {
                return rest
                    .is_empty()
                    .then_some(FieldKind::Primitive(ValueType::Int));
            }
            match &schema.elem {
                Some(Elem::Resource { fields }) => resolve_in_object(fields, rest),
                Some(Elem::Schema(inner)) => resolve_in_schema(inner, rest),
                // Undeclared elements can only be read as strings by index.
                None => (rest.is_empty() && next.parse::<u64>().is_ok())
                    .then_some(FieldKind::Primitive(ValueType::String)),
            }
        }
        ValueType::Map => {
            if next == MAP_COUNT {
                return rest
                    .is_empty()
                    .then_some(FieldKind::Primitive(ValueType::Int));
            }
            match &schema.elem {
                Some(Elem::Schema(inner)) => resolve_in_schema(inner, rest),
                Some(Elem::Resource { .. }) => None,
                None => rest
                    .is_empty()
                    .then_some(FieldKind::Primitive(ValueType::String)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SchemaMap {
        let mut rule = SchemaMap::new();
        rule.insert("from".to_string(), Schema::new(ValueType::Int));
        rule.insert(
            "cidrs".to_string(),
            Schema::list_of(Schema::new(ValueType::String)),
        );

        let mut fields = SchemaMap::new();
        fields.insert("name".to_string(), Schema::new(ValueType::String));
        fields.insert("rule".to_string(), Schema::new(ValueType::Set).with_fields(rule));
        fields.insert("tags".to_string(), Schema::new(ValueType::Map));
        fields.insert(
            "limits".to_string(),
            Schema::map_of(Schema::new(ValueType::Int)),
        );
        fields.insert("raw".to_string(), Schema::new(ValueType::List));
        fields
    }

    fn resolve<'a>(fields: &'a SchemaMap, key: &str) -> Option<FieldKind<'a>> {
        resolve_address(fields, &FieldAddress::from_dotted(key))
    }

    #[test]
    fn test_resolve_primitive() {
        let fields = catalog();
        assert_eq!(
            resolve(&fields, "name"),
            Some(FieldKind::Primitive(ValueType::String))
        );
        assert_eq!(resolve(&fields, "name.extra"), None);
        assert_eq!(resolve(&fields, "missing"), None);
    }

    #[test]
    fn test_resolve_through_set_element() {
        let fields = catalog();
        assert!(matches!(resolve(&fields, "rule"), Some(FieldKind::Set(_))));
        assert!(matches!(resolve(&fields, "rule.1234"), Some(FieldKind::Object(_))));
        assert_eq!(
            resolve(&fields, "rule.1234.from"),
            Some(FieldKind::Primitive(ValueType::Int))
        );
        assert_eq!(
            resolve(&fields, "rule.1234.cidrs.0"),
            Some(FieldKind::Primitive(ValueType::String))
        );
        assert_eq!(resolve(&fields, "rule.1234.nope"), None);
    }

    #[test]
    fn test_resolve_counters() {
        let fields = catalog();
        assert_eq!(
            resolve(&fields, "rule.#"),
            Some(FieldKind::Primitive(ValueType::Int))
        );
        assert_eq!(
            resolve(&fields, "tags.%"),
            Some(FieldKind::Primitive(ValueType::Int))
        );
        assert_eq!(resolve(&fields, "rule.#.extra"), None);
    }

    #[test]
    fn test_resolve_map_values() {
        let fields = catalog();
        assert_eq!(
            resolve(&fields, "tags.env"),
            Some(FieldKind::Primitive(ValueType::String))
        );
        assert_eq!(
            resolve(&fields, "limits.cpu"),
            Some(FieldKind::Primitive(ValueType::Int))
        );
    }

    #[test]
    fn test_resolve_untyped_list_index() {
        let fields = catalog();
        assert_eq!(
            resolve(&fields, "raw.3"),
            Some(FieldKind::Primitive(ValueType::String))
        );
        assert_eq!(resolve(&fields, "raw.x"), None);
    }

    #[test]
    fn test_resolve_empty_address() {
        let fields = catalog();
        assert!(matches!(
            resolve_address(&fields, &FieldAddress::default()),
            Some(FieldKind::Object(_))
        ));
    }
}
