//! Schema catalog parser.
//!
//! Loads attribute declarations from YAML documents. Each top-level key is a
//! field name mapped to its declaration.

use crate::error::{OverlayError, Result, SchemaError};
use std::path::Path;
use tracing::{debug, info};

use super::spec::SchemaMap;
use super::validator::SchemaValidator;

/// Parser for schema catalog documents.
#[derive(Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
    /// Creates a new schema parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<SchemaMap> {
        let path = path.as_ref();
        info!("Loading schema catalog from: {}", path.display());

        if !path.exists() {
            return Err(OverlayError::Schema(SchemaError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            OverlayError::Schema(SchemaError::parse(
                format!("Failed to read file: {e}"),
                Some(path.display().to_string()),
            ))
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses a catalog from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<SchemaMap> {
        debug!("Parsing YAML schema catalog");

        let fields: SchemaMap = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            OverlayError::Schema(SchemaError::parse(format!("YAML parse error: {e}"), location))
        })?;

        debug!("Parsed schema catalog with {} top-level fields", fields.len());
        Ok(fields)
    }

    /// Loads a catalog from a YAML file and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or fails validation.
    pub fn load_validated(&self, path: impl AsRef<Path>) -> Result<SchemaMap> {
        let fields = self.load_file(path)?;
        SchemaValidator::new().validate(&fields)?;
        Ok(fields)
    }
}
