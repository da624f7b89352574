//! Diff-overlay field reader.
//!
//! Reads attributes as they will be once a change-set is applied on top of a
//! base reader. The base reader must read the data the change-set was
//! computed from; any other pairing gives undefined results.
//!
//! Existence is tracked exactly. A collection the change-set explicitly
//! empties exists; a collection the change-set never mentions is reported as
//! absent, even if the base reader still holds a stale count for it.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, warn};

use crate::address::{FieldAddress, LIST_COUNT, MAP_COUNT};
use crate::diff::InstanceDiff;
use crate::error::{OverlayError, ReadError, Result};
use crate::schema::{FieldKind, Schema, SchemaMap, ValueType, resolve_address};
use crate::set::ContentSet;
use crate::state::InstanceState;
use crate::value::{FieldValue, decode_primitive, weak_decode_string};

use super::{FieldReadResult, FieldReader, parse_count, read_object_field, zero_value_at};

/// Reads fields out of a change-set layered over a base reader.
#[derive(Debug, Clone)]
pub struct DiffFieldReader<'a, R> {
    /// Pending changes.
    diff: &'a InstanceDiff,
    /// Reader over the data the change-set was computed from.
    source: R,
    /// Schema catalog.
    schema: &'a SchemaMap,
}

impl<'a, R: FieldReader> DiffFieldReader<'a, R> {
    /// Creates a reader overlaying `diff` on `source`.
    #[must_use]
    pub const fn new(diff: &'a InstanceDiff, source: R, schema: &'a SchemaMap) -> Self {
        Self {
            diff,
            source,
            schema,
        }
    }

    /// The base reader.
    #[must_use]
    pub const fn source(&self) -> &R {
        &self.source
    }

    /// The change-set being overlaid.
    #[must_use]
    pub const fn diff(&self) -> &'a InstanceDiff {
        self.diff
    }

    /// Whether the change-set mentions anything below the top-level field of
    /// `address`.
    fn touches_field(&self, address: &FieldAddress) -> bool {
        address
            .first()
            .is_some_and(|first| self.diff.contains_field(first))
    }

    /// Whether the change-set replaces the base set element stored at `key`.
    ///
    /// That is the case for a record at the element key itself, or when every
    /// leaf of the element is removed. Counter records never count as leaves.
    fn overrides_element(&self, key: &str, element: &FieldValue) -> bool {
        if self.diff.attribute(key).is_some() {
            return true;
        }
        let flattened = InstanceState::default().with_value(key, element);
        let mut leaves = flattened
            .attributes
            .keys()
            .filter(|leaf| !is_counter_key(leaf))
            .peekable();
        leaves.peek().is_some() && leaves.all(|leaf| self.is_removed(leaf))
    }

    fn is_removed(&self, key: &str) -> bool {
        self.diff.attribute(key).is_some_and(|attr| attr.new_removed)
    }

    fn corrupt(key: String) -> OverlayError {
        error!("Change-set implies element {key} but it cannot be read");
        ReadError::corrupt(key).into()
    }

    fn read_primitive(&self, address: &FieldAddress, value_type: ValueType) -> Result<FieldReadResult> {
        let mut result = self.source.read_field(address)?;

        let key = address.join();
        let Some(attr) = self.diff.attribute(&key) else {
            return Ok(result);
        };

        let value = if attr.new_computed {
            Some(FieldValue::Unknown)
        } else {
            let mut raw = attr.new.clone();
            if let Some(extra) = &attr.new_extra {
                result.value_processed = Some(FieldValue::String(attr.new.clone()));
                if let Some(coerced) = weak_decode_string(extra, &key)? {
                    raw = coerced;
                }
            }
            decode_primitive(value_type, &raw, &key)?
        };

        result.value = value;
        result.computed = attr.new_computed;
        result.exists = true;
        Ok(result)
    }

    /// Resolves a list or set counter: the change-set first, then the base.
    ///
    /// Returns the count and whether the counter is computed.
    fn read_count(&self, count_key: &FieldAddress) -> Result<(usize, bool)> {
        if let Some(attr) = self.diff.attribute(&count_key.join()) {
            if attr.new_computed {
                return Ok((0, true));
            }
            let count = parse_count(&attr.new).unwrap_or_else(|| {
                warn!("Ignoring malformed counter {count_key} = {:?}", attr.new);
                0
            });
            return Ok((count, false));
        }

        let base = self.source.read_field(count_key)?;
        let count = base
            .value
            .as_ref()
            .and_then(FieldValue::as_int)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        Ok((count, base.computed))
    }

    fn read_list(&self, address: &FieldAddress) -> Result<FieldReadResult> {
        let count_key = address.count_key();
        let (count, computed) = self.read_count(&count_key)?;

        if !self.touches_field(address) {
            debug!("Change-set does not touch {address}, list is absent");
            return Ok(FieldReadResult::absent_with(FieldValue::List(Vec::new())));
        }

        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            let element = address.child(index.to_string());
            let key = element.join();
            if self.is_removed(&key) {
                continue;
            }

            let raw = self.read_field(&element)?;
            if !raw.exists {
                return Err(Self::corrupt(key));
            }
            items.push(raw.value_or(zero_value_at(self.schema, &element)));
        }

        let exists = !items.is_empty() || self.diff.attribute(&count_key.join()).is_some();
        Ok(FieldReadResult {
            value: Some(FieldValue::List(items)),
            value_processed: None,
            exists,
            computed,
        })
    }

    fn read_map(&self, address: &FieldAddress, schema: &Schema) -> Result<FieldReadResult> {
        let mut entries = BTreeMap::new();
        let mut exists = false;
        let mut computed = false;

        let counter = self.diff.attribute(&address.map_count_key().join());
        let cleared = counter.is_some_and(|c| !c.new_computed && c.new == "0");
        if let Some(counter) = counter {
            exists = true;
            computed = counter.new_computed;
        }

        let source = self.source.read_field(address)?;
        if source.exists {
            exists = true;
            if let Some(FieldValue::Map(base)) = source.value {
                if !cleared {
                    entries = base;
                }
            }
        }

        let prefix = address.prefix();
        let value_type = schema.map_value_type();
        for (key, attr) in self.diff.keys_under(&prefix) {
            let map_key = &key[prefix.len()..];
            if map_key.starts_with(MAP_COUNT) {
                continue;
            }

            exists = true;
            if attr.new_removed {
                entries.remove(map_key);
                continue;
            }
            if attr.new_computed {
                computed = true;
                entries.insert(map_key.to_string(), FieldValue::Unknown);
                continue;
            }

            let value = decode_primitive(value_type, &attr.new, key)?
                .unwrap_or_else(|| value_type.zero_value());
            entries.insert(map_key.to_string(), value);
        }

        Ok(FieldReadResult {
            value: exists.then_some(FieldValue::Map(entries)),
            value_processed: None,
            exists,
            computed,
        })
    }

    fn read_set(&self, address: &FieldAddress) -> Result<FieldReadResult> {
        let prefix = address.prefix();
        let count_key = address.count_key().join();
        let counter = self.diff.attribute(&count_key);
        let mut set = ContentSet::new();

        if counter.is_some_and(|c| c.new == "0") {
            debug!("Change-set clears set {address}");
            return Ok(FieldReadResult::present(FieldValue::Set(set)));
        }

        if !self.touches_field(address) {
            debug!("Change-set does not touch {address}, set is absent");
            return Ok(FieldReadResult::absent_with(FieldValue::Set(set)));
        }

        let mut candidates: BTreeSet<String> = self
            .diff
            .keys_under(&prefix)
            .map(|(key, _)| key.to_string())
            .collect();

        let base = self.source.read_field(address)?;
        if base.exists {
            if let Some(FieldValue::Set(base_set)) = &base.value {
                for (code, element) in base_set.as_map() {
                    let key = format!("{prefix}{code}");
                    if !self.overrides_element(&key, element) {
                        candidates.insert(key);
                    }
                }
            }
        }

        let mut seen = BTreeSet::new();
        for key in &candidates {
            if self.is_removed(key) || key.ends_with(LIST_COUNT) {
                continue;
            }

            let rest = &key[prefix.len()..];
            let code = rest.split('.').next().unwrap_or(rest);
            if !seen.insert(code) {
                continue;
            }

            let element = address.child(code);
            let raw = self.read_field(&element)?;
            if !raw.exists {
                return Err(Self::corrupt(element.join()));
            }
            set.add(raw.value_or(zero_value_at(self.schema, &element)));
        }

        let exists = !set.is_empty() || counter.is_some();
        Ok(FieldReadResult {
            value: Some(FieldValue::Set(set)),
            value_processed: None,
            exists,
            computed: counter.is_some_and(|c| c.new_computed),
        })
    }
}

/// Whether the last segment of a dotted key is a collection counter.
fn is_counter_key(key: &str) -> bool {
    key.rsplit('.')
        .next()
        .is_some_and(|last| last == LIST_COUNT || last == MAP_COUNT)
}

impl<R: FieldReader> FieldReader for DiffFieldReader<'_, R> {
    fn read_field(&self, address: &FieldAddress) -> Result<FieldReadResult> {
        let Some(kind) = resolve_address(self.schema, address) else {
            debug!("No schema for {address}, treating as absent");
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
