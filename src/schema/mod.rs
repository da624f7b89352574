//! Schema catalog module.
//!
//! This module handles everything about attribute declarations:
//! - Declaration types and their YAML representation
//! - Loading catalogs from `YAML` documents
//! - Validation of declarations
//! - Resolving an attribute address to its declared kind

mod spec;
mod parser;
mod validator;
mod resolve;

pub use spec::{Elem, Schema, SchemaMap, ValueType, object_zero_value};
pub use parser::SchemaParser;
pub use validator::{SchemaValidator, ValidationError, ValidationResult};
pub use resolve::{FieldKind, resolve_address};
