//! Field readers.
//!
//! A field reader answers "what is the value at this address" for one source
//! of data. Readers compose: the diff reader overlays a change-set on top of
//! any base reader, and the multi-level reader stacks named readers.

mod diff;
mod map;
mod multi;

pub use diff::DiffFieldReader;
pub use map::MapFieldReader;
pub use multi::MultiLevelFieldReader;

use serde::Serialize;

use crate::address::FieldAddress;
use crate::error::Result;
use crate::schema::{SchemaMap, resolve_address, FieldKind};
use crate::value::FieldValue;

/// Answer to a single address read.
///
/// `exists == false` means the attribute was never set at any layer.
/// `exists == true` with an empty collection means it was explicitly set to
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldReadResult {
    /// The value, or `None` when absent or not decodable to a value.
    pub value: Option<FieldValue>,
    /// Raw value a provider payload was decoded from, if any.
    pub value_processed: Option<FieldValue>,
    /// Whether the attribute is set at any layer.
    pub exists: bool,
    /// Whether the value is only known after apply.
    pub computed: bool,
}

impl FieldReadResult {
    /// A result for an attribute that was never set.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            value: None,
            value_processed: None,
            exists: false,
            computed: false,
        }
    }

    /// A result carrying `value` without claiming existence.
    #[must_use]
    pub const fn absent_with(value: FieldValue) -> Self {
        Self {
            value: Some(value),
            value_processed: None,
            exists: false,
            computed: false,
        }
    }

    /// A result for an attribute that is set.
    #[must_use]
    pub const fn present(value: FieldValue) -> Self {
        Self {
            value: Some(value),
            value_processed: None,
            exists: true,
            computed: false,
        }
    }

    /// The value, or `zero` when there is none.
    #[must_use]
    pub fn value_or(self, zero: FieldValue) -> FieldValue {
        self.value.unwrap_or(zero)
    }
}

/// Source of attribute values.
///
/// Implementations must behave as a frozen snapshot for the duration of a
/// read: the same address always yields the same result.
#[cfg_attr(test, mockall::automock)]
pub trait FieldReader {
    /// Reads the attribute at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value cannot be decoded or the data is
    /// internally inconsistent.
    fn read_field(&self, address: &FieldAddress) -> Result<FieldReadResult>;
}

impl<R: FieldReader + ?Sized> FieldReader for &R {
    fn read_field(&self, address: &FieldAddress) -> Result<FieldReadResult> {
        (**self).read_field(address)
    }
}

impl<R: FieldReader + ?Sized> FieldReader for Box<R> {
    fn read_field(&self, address: &FieldAddress) -> Result<FieldReadResult> {
        (**self).read_field(address)
    }
}

/// Reads every field of a nested object through `reader`.
///
/// Unset fields take their zero value; the object exists if any field does.
pub(crate) fn read_object_field<R: FieldReader + ?Sized>(
    reader: &R,
    address: &FieldAddress,
    fields: &SchemaMap,
) -> Result<FieldReadResult> {
    let mut object = std::collections::BTreeMap::new();
    let mut exists = false;

    for (name, schema) in fields {
        let raw = reader.read_field(&address.child(name.as_str()))?;
        exists |= raw.exists;
        object.insert(name.clone(), raw.value_or(schema.zero_value()));
    }

    Ok(FieldReadResult {
        value: Some(FieldValue::Object(object)),
        value_processed: None,
        exists,
        computed: false,
    })
}

/// Zero value of whatever is declared at `address`.
pub(crate) fn zero_value_at(schema: &SchemaMap, address: &FieldAddress) -> FieldValue {
    resolve_address(schema, address)
        .as_ref()
        .map_or_else(|| FieldValue::String(String::new()), FieldKind::zero_value)
}

/// Parses a collection counter, treating anything unparseable as zero.
pub(crate) fn parse_count(raw: &str) -> Option<usize> {
    raw.parse().ok()
}
