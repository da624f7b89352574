// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![warn(dead_code)]                   // Unused code is flagged
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![warn(unused_imports)]              // Unused imports are flagged
#![warn(unused_variables)]            // Unused variables are flagged
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Field Overlay
//!
//! Typed reads of resource attributes as they will look once a pending
//! change-set is applied to recorded state.
//!
//! ## Overview
//!
//! An orchestration engine records each resource instance as a flat map of
//! dotted attribute paths to strings, and plans changes as a change-set
//! keyed the same way. This crate answers typed questions about the merged
//! view without materializing it:
//!
//! - Primitives, lists, content-addressed sets, maps and nested objects
//! - Exact existence: "explicitly emptied" differs from "never set"
//! - Values only known after apply are surfaced as unknown
//!
//! ## Architecture
//!
//! 1. **Schema**: a catalog of attribute declarations, loaded from YAML
//! 2. **Base reader**: reads recorded state ([`MapFieldReader`])
//! 3. **Overlay**: layers a change-set over any base ([`DiffFieldReader`])
//! 4. **Stack**: named levels merged bottom-up ([`MultiLevelFieldReader`])
//!
//! ## Modules
//!
//! - [`schema`]: Catalog types, YAML loading, validation and address resolution
//! - [`reader`]: The reader trait and its implementations
//! - [`diff`]: Change-set types
//! - [`state`]: Recorded instance state
//! - [`value`]: Typed values and primitive decoding
//! - [`set`]: Content-addressed sets
//! - [`address`]: Attribute addresses
//!
//! ## Example
//!
//! ```yaml
//! name:
//!   type: string
//!   required: true
//! ports:
//!   type: list
//!   optional: true
//!   elem:
//!     type: int
//! tags:
//!   type: map
//!   optional: true
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod address;
pub mod diff;
pub mod error;
pub mod reader;
pub mod schema;
pub mod set;
pub mod state;
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use address::FieldAddress;
pub use diff::{AttributeDiff, ChangeType, InstanceDiff};
pub use error::{OverlayError, ReadError, Result, SchemaError};
pub use reader::{DiffFieldReader, FieldReadResult, FieldReader, MapFieldReader, MultiLevelFieldReader};
pub use schema::{Schema, SchemaMap, SchemaParser, SchemaValidator, ValueType};
pub use set::ContentSet;
pub use state::InstanceState;
pub use value::{FieldValue, UNKNOWN_VALUE};
