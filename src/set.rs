//! Content-addressed sets.
//!
//! Set membership is keyed by a hash of each element's normalized value, not
//! by position. Keys are rendered as decimal strings, the same form they take
//! as address segments in recorded state and change-sets, and iteration
//! follows the lexicographic order of those keys.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::value::FieldValue;

/// Function computing the membership code of an element.
pub type SetHashFn = fn(&FieldValue) -> u32;

/// Default membership hash: SHA-256 of the normalized value, truncated to a
/// non-negative 31-bit code.
#[must_use]
pub fn hash_value(value: &FieldValue) -> u32 {
    hash_code(&value.normalized())
}

/// Hashes a string to a non-negative 31-bit code.
#[must_use]
pub fn hash_code(s: &str) -> u32 {
    let digest = Sha256::digest(s.as_bytes());
    let code = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    code & 0x7fff_ffff
}

/// Unordered collection keyed by element content.
#[derive(Debug, Clone)]
pub struct ContentSet {
    /// Hash function used on insert.
    hash_fn: SetHashFn,
    /// Elements by membership key.
    items: BTreeMap<String, FieldValue>,
}

impl ContentSet {
    /// Creates an empty set using [`hash_value`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_hasher(hash_value)
    }

    /// Creates an empty set with a custom hash function.
    #[must_use]
    pub const fn with_hasher(hash_fn: SetHashFn) -> Self {
        Self {
            hash_fn,
            items: BTreeMap::new(),
        }
    }

    /// Creates a set from values.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = FieldValue>) -> Self {
        let mut set = Self::new();
        for value in values {
            set.add(value);
        }
        set
    }

    /// Membership key the value would be stored under.
    #[must_use]
    pub fn key_for(&self, value: &FieldValue) -> String {
        (self.hash_fn)(value).to_string()
    }

    /// Adds a value and returns its membership key. Re-adding an equal value
    /// replaces it in place.
    pub fn add(&mut self, value: FieldValue) -> String {
        let key = self.key_for(&value);
        self.items.insert(key.clone(), value);
        key
    }

    /// Removes a value by content.
    pub fn remove(&mut self, value: &FieldValue) -> Option<FieldValue> {
        let key = self.key_for(value);
        self.items.remove(&key)
    }

    /// Whether an equal value is a member.
    #[must_use]
    pub fn contains(&self, value: &FieldValue) -> bool {
        self.items.contains_key(&self.key_for(value))
    }

    /// Whether a membership key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Looks up an element by membership key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.items.get(key)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Membership keys in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Elements in iteration order.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.items.values()
    }

    /// Elements by membership key.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, FieldValue> {
        &self.items
    }

    /// Elements present in either set.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for value in other.values() {
            result.add(value.clone());
        }
        result
    }

    /// Elements present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.filtered(|value| other.contains(value))
    }

    /// Elements of this set absent from `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.filtered(|value| !other.contains(value))
    }

    fn filtered(&self, keep: impl Fn(&FieldValue) -> bool) -> Self {
        let mut result = Self::with_hasher(self.hash_fn);
        for value in self.values().filter(|value| keep(*value)) {
            result.add(value.clone());
        }
        result
    }

    /// Hex digest over the membership keys, for cheap whole-set comparison.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for key in self.keys() {
            hasher.update(key.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

impl Default for ContentSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ContentSet {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Serialize for ContentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values())
    }
}

impl FromIterator<FieldValue> for ContentSet {
    fn from_iter<I: IntoIterator<Item = FieldValue>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}
