//! Error types for the field overlay system.
//!
//! This module provides the error hierarchy for schema catalog loading and
//! for reading merged attribute values out of state and change-sets.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the field overlay system.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Schema catalog errors.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Field read errors.
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Schema catalog errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file was not found.
    #[error("Schema file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The schema document could not be parsed.
    #[error("Failed to parse schema: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Schema validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Errors raised while reading a field.
#[derive(Debug, Error)]
pub enum ReadError {
    /// A recorded or pending value could not be decoded into its declared type.
    #[error("Cannot decode {value:?} as {expected} at {address}")]
    Decode {
        /// Dotted address of the field.
        address: String,
        /// The raw value.
        value: String,
        /// Name of the declared type.
        expected: &'static str,
    },

    /// The change-set implies an element that cannot be read back.
    #[error("Corrupt diff: element {address} is implied but missing")]
    CorruptDiff {
        /// Dotted address of the missing element.
        address: String,
    },

    /// A reader level that was never registered.
    #[error("Unknown reader level: {level}")]
    UnknownLevel {
        /// Name of the requested level.
        level: String,
    },
}

/// Result type alias for field overlay operations.
pub type Result<T> = std::result::Result<T, OverlayError>;

impl OverlayError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if the error signals an internally inconsistent change-set.
    #[must_use]
    pub const fn is_corrupt_diff(&self) -> bool {
        matches!(self, Self::Read(ReadError::CorruptDiff { .. }))
    }

    /// Returns true if the caller may continue reading other addresses.
    ///
    /// Decode failures only poison the address that was read; a corrupt
    /// diff poisons the whole change-set.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Read(ReadError::Decode { .. } | ReadError::UnknownLevel { .. })
        )
    }
}

impl SchemaError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a parse error with an optional location.
    #[must_use]
    pub fn parse(message: impl Into<String>, location: Option<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }
}

impl ReadError {
    /// Creates a decode error.
    #[must_use]
    pub fn decode(address: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self::Decode {
            address: address.into(),
            value: value.into(),
            expected,
        }
    }

    /// Creates a corrupt diff error.
    #[must_use]
    pub fn corrupt(address: impl Into<String>) -> Self {
        Self::CorruptDiff {
            address: address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let decode: OverlayError = ReadError::decode("count", "abc", "int").into();
        assert!(decode.is_recoverable());
        assert!(!decode.is_corrupt_diff());

        let corrupt: OverlayError = ReadError::corrupt("rule.12").into();
        assert!(corrupt.is_corrupt_diff());
        assert!(!corrupt.is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = OverlayError::from(ReadError::decode("port", "eighty", "int"));
        assert_eq!(
            err.to_string(),
            "Read error: Cannot decode \"eighty\" as int at port"
        );

        let err = OverlayError::from(SchemaError::validation("bad", "ports"));
        assert_eq!(err.to_string(), "Schema error: Schema validation failed: bad");
    }
}
