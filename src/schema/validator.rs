//! Schema catalog validation.
//!
//! Catches declarations the reader cannot interpret consistently before any
//! state or change-set is read against them.

use crate::error::{OverlayError, Result, SchemaError};
use tracing::debug;

use super::spec::{Elem, Schema, SchemaMap, ValueType};

/// Validator for schema catalogs.
#[derive(Debug, Default)]
pub struct SchemaValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl SchemaValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a schema catalog.
    ///
    /// # Errors
    ///
    /// Returns the first error found if validation fails.
    pub fn validate(&self, fields: &SchemaMap) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();
        Self::validate_fields(fields, "", &mut result);

        if result.errors.is_empty() {
            debug!("Schema validation passed");
            return Ok(result);
        }

        let first_error = &result.errors[0];
        Err(OverlayError::Schema(SchemaError::validation(
            first_error.message.clone(),
            first_error.field.clone(),
        )))
    }

    /// Validates every attribute of an object.
    fn validate_fields(fields: &SchemaMap, parent: &str, result: &mut ValidationResult) {
        for (name, schema) in fields {
            let path = if parent.is_empty() {
                name.clone()
            } else {
                format!("{parent}.{name}")
            };

            if !is_valid_field_name(name) {
                result.push_error(
                    &path,
                    format!(
                        "Field name '{name}' is invalid. Must be lowercase alphanumeric with underscores."
                    ),
                );
            }

            Self::validate_flags(schema, &path, result);
            Self::validate_schema(schema, &path, result);
        }
    }

    /// Validates the optional/required/computed combination of an attribute.
    fn validate_flags(schema: &Schema, path: &str, result: &mut ValidationResult) {
        if schema.required && schema.optional {
            result.push_error(path, "Required and optional are mutually exclusive");
        }
        if schema.required && schema.computed {
            result.push_error(path, "Required and computed are mutually exclusive");
        }
        if !schema.required && !schema.optional && !schema.computed {
            result.push_error(path, "One of required, optional or computed must be set");
        }
    }

    /// Validates type-specific constraints, recursing into elements.
    fn validate_schema(schema: &Schema, path: &str, result: &mut ValidationResult) {
        let counted = schema.value_type.is_counted();

        if !counted && (schema.min_items.is_some() || schema.max_items.is_some()) {
            result.push_error(path, "min_items and max_items are only valid on lists and sets");
        }
        if let (Some(min), Some(max)) = (schema.min_items, schema.max_items) {
            if min > max {
                result.push_error(
                    path,
                    format!("min_items ({min}) is greater than max_items ({max})"),
                );
            }
        }

        match (schema.value_type, &schema.elem) {
            (primitive, Some(_)) if primitive.is_primitive() => {
                result.push_error(path, format!("Type {} cannot declare an elem", primitive.name()));
            }
            (ValueType::List | ValueType::Set, None) => {
                result.push_error(path, "Lists and sets must declare an elem");
            }
            (ValueType::Map, Some(Elem::Resource { .. })) => {
                result.push_error(path, "Map values cannot be nested objects");
            }
            (ValueType::Map, Some(Elem::Schema(inner))) if !inner.value_type.is_primitive() => {
                result.push_error(path, "Map values must be a primitive type");
            }
            (value_type, Some(Elem::Schema(inner))) => {
                if value_type == ValueType::Set && inner.value_type == ValueType::Set {
                    result
                        .warnings
                        .push(format!("{path}: set of sets hashes nested sets by content"));
                }
                Self::validate_schema(inner, path, result);
            }
            (_, Some(Elem::Resource { fields })) => {
                Self::validate_fields(fields, path, result);
            }
            _ => {}
        }
    }
}

/// Validates that a field name follows the naming convention.
/// Names must be lowercase alphanumeric with underscores, starting with a letter.
fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl ValidationResult {
    fn push_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(name: &str, schema: Schema) -> SchemaMap {
        let mut fields = SchemaMap::new();
        fields.insert(name.to_string(), schema);
        fields
    }

    #[test]
    fn test_valid_field_name() {
        assert!(is_valid_field_name("name"));
        assert!(is_valid_field_name("ingress_rule_2"));
        assert!(!is_valid_field_name(""));
        assert!(!is_valid_field_name("Name"));
        assert!(!is_valid_field_name("2name"));
        assert!(!is_valid_field_name("in-gress"));
    }

    #[test]
    fn test_valid_catalog() {
        let mut rule = SchemaMap::new();
        rule.insert("from".to_string(), Schema::new(ValueType::Int).required());

        let mut fields = single(
            "rule",
            Schema::new(ValueType::Set).optional().with_fields(rule),
        );
        fields.insert(
            "ports".to_string(),
            Schema::list_of(Schema::new(ValueType::Int))
                .optional()
                .with_items(Some(1), Some(4)),
        );

        let result = SchemaValidator::new().validate(&fields).expect("valid catalog");
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_flag_conflicts() {
        let fields = single("id", Schema::new(ValueType::String).required().computed());
        let err = SchemaValidator::new().validate(&fields).unwrap_err();
        assert!(err.to_string().contains("Required and computed"));

        let fields = single("id", Schema::new(ValueType::String));
        assert!(SchemaValidator::new().validate(&fields).is_err());
    }

    #[test]
    fn test_collection_elem_rules() {
        let validator = SchemaValidator::new();

        let fields = single("ports", Schema::new(ValueType::List).optional());
        assert!(validator.validate(&fields).is_err());

        let fields = single(
            "name",
            Schema::new(ValueType::String)
                .optional()
                .with_elem(Schema::new(ValueType::Int)),
        );
        assert!(validator.validate(&fields).is_err());

        let fields = single(
            "tags",
            Schema::map_of(Schema::list_of(Schema::new(ValueType::Int))).optional(),
        );
        assert!(validator.validate(&fields).is_err());
    }

    #[test]
    fn test_nested_field_errors_use_dotted_path() {
        let mut rule = SchemaMap::new();
        rule.insert("From".to_string(), Schema::new(ValueType::Int).required());
        let fields = single("rule", Schema::new(ValueType::Set).optional().with_fields(rule));

        let err = SchemaValidator::new().validate(&fields).unwrap_err();
        let OverlayError::Schema(SchemaError::ValidationError { field, .. }) = err else {
            panic!("expected validation error");
        };
        assert_eq!(field.as_deref(), Some("rule.From"));
    }

    #[test]
    fn test_items_bounds() {
        let fields = single(
            "ports",
            Schema::list_of(Schema::new(ValueType::Int))
                .optional()
                .with_items(Some(3), Some(1)),
        );
        assert!(SchemaValidator::new().validate(&fields).is_err());

        let fields = single(
            "name",
            Schema::new(ValueType::String)
                .optional()
                .with_items(None, Some(1)),
        );
        assert!(SchemaValidator::new().validate(&fields).is_err());
    }

    #[test]
    fn test_set_of_sets_warns() {
        let fields = single(
            "groups",
            Schema::set_of(Schema::set_of(Schema::new(ValueType::String))).optional(),
        );
        let result = SchemaValidator::new().validate(&fields).expect("valid catalog");
        assert_eq!(result.warning_count(), 1);
    }
}
