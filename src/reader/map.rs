//! Reader over a flat recorded-state attribute map.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use tracing::debug;

use crate::address::{FieldAddress, LIST_COUNT, MAP_COUNT};
use crate::error::Result;
use crate::schema::{FieldKind, Schema, SchemaMap, ValueType, resolve_address};
use crate::set::ContentSet;
use crate::state::InstanceState;
use crate::value::{FieldValue, decode_primitive};

use super::{FieldReadResult, FieldReader, read_object_field, zero_value_at};

/// Reads typed values out of flattened recorded state.
#[derive(Debug, Clone, Copy)]
pub struct MapFieldReader<'a> {
    /// Flattened attributes keyed by dotted path.
    attributes: &'a BTreeMap<String, String>,
    /// Schema catalog.
    schema: &'a SchemaMap,
}

impl<'a> MapFieldReader<'a> {
    /// Creates a reader over a flat attribute map.
    #[must_use]
    pub const fn new(attributes: &'a BTreeMap<String, String>, schema: &'a SchemaMap) -> Self {
        Self { attributes, schema }
    }

    /// Creates a reader over recorded instance state.
    #[must_use]
    pub const fn from_state(state: &'a InstanceState, schema: &'a SchemaMap) -> Self {
        Self::new(&state.attributes, schema)
    }

    /// Entries whose key starts with `prefix`, with the prefix stripped.
    fn entries_under<'p>(&'p self, prefix: &'p str) -> impl Iterator<Item = (&'p str, &'p str)> + 'p {
        self.attributes
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(move |(k, v)| (&k[prefix.len()..], v.as_str()))
    }

    fn read_primitive(&self, address: &FieldAddress, value_type: ValueType) -> Result<FieldReadResult> {
        let key = address.join();
        let Some(raw) = self.attributes.get(&key) else {
            return Ok(FieldReadResult::absent());
        };

        let value = decode_primitive(value_type, raw, &key)?;
        Ok(FieldReadResult {
            computed: value.as_ref().is_some_and(FieldValue::is_unknown),
            value,
            value_processed: None,
            exists: true,
        })
    }

    /// Reads the `#` counter below `address`.
    fn read_count(&self, address: &FieldAddress) -> Result<(FieldReadResult, usize)> {
        let count = self.read_primitive(&address.count_key(), ValueType::Int)?;
        let len = count
            .value
            .as_ref()
            .and_then(FieldValue::as_int)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        Ok((count, len))
    }

    fn read_list(&self, address: &FieldAddress) -> Result<FieldReadResult> {
        let (count, len) = self.read_count(address)?;
        if !count.exists || count.computed || len == 0 {
            return Ok(FieldReadResult {
                value: Some(FieldValue::List(Vec::new())),
                value_processed: None,
                exists: count.exists,
                computed: count.computed,
            });
        }

        let mut items = Vec::with_capacity(len);
        for index in 0..len {
            let element = address.child(index.to_string());
            let raw = self.read_field(&element)?;
            if !raw.exists {
                debug!(address = %element, "List element missing from recorded state");
            }
            items.push(raw.value_or(zero_value_at(self.schema, &element)));
        }

        Ok(FieldReadResult::present(FieldValue::List(items)))
    }

    fn read_set(&self, address: &FieldAddress) -> Result<FieldReadResult> {
        let (count, len) = self.read_count(address)?;
        let mut set = ContentSet::new();
        if !count.exists || count.computed || len == 0 {
            return Ok(FieldReadResult {
                value: Some(FieldValue::Set(set)),
                value_processed: None,
                exists: count.exists,
                computed: count.computed,
            });
        }

        let prefix = address.prefix();
        let codes: BTreeSet<&str> = self
            .entries_under(&prefix)
            .filter(|(rest, _)| !rest.starts_with(LIST_COUNT))
            .filter_map(|(rest, _)| rest.split('.').next())
            .collect();

        for code in codes {
            let element = address.child(code);
            let raw = self.read_field(&element)?;
            if !raw.exists {
                continue;
            }
            if let Some(value) = raw.value {
                set.add(value);
            }
        }

        Ok(FieldReadResult::present(FieldValue::Set(set)))
    }

    fn read_map(&self, address: &FieldAddress, schema: &Schema) -> Result<FieldReadResult> {
        let value_type = schema.map_value_type();
        let prefix = address.prefix();
        let mut entries = BTreeMap::new();
        let mut exists = false;
        let mut computed = false;

        for (key, raw) in self.entries_under(&prefix) {
            exists = true;
            if key == MAP_COUNT || key == LIST_COUNT {
                continue;
            }
            let value = decode_primitive(value_type, raw, &format!("{prefix}{key}"))?
                .unwrap_or_else(|| value_type.zero_value());
            computed |= value.is_unknown();
            entries.insert(key.to_string(), value);
        }

        Ok(FieldReadResult {
            value: exists.then_some(FieldValue::Map(entries)),
            value_processed: None,
            exists,
            computed,
        })
    }
}

impl FieldReader for MapFieldReader<'_> {
    fn read_field(&self, address: &FieldAddress) -> Result<FieldReadResult> {
        let Some(kind) = resolve_address(self.schema, address) else {
            return Ok(FieldReadResult::absent());
        };

        match kind {
            FieldKind::Primitive(value_type) => self.read_primitive(address, value_type),
            FieldKind::List(_) => self.read_list(address),
            FieldKind::Set(_) => self.read_set(address),
            FieldKind::Map(schema) => self.read_map(address, schema),
            FieldKind::Object(fields) => read_object_field(self, address, fields),
        }
    }
}
