//! Attribute addresses.
//!
//! An address is the ordered list of segments naming one attribute or
//! sub-attribute: field names, list indices and set element keys. The dotted
//! join of an address is the key used by change-sets and recorded state.

use std::fmt;

/// Counter segment for lists and sets.
pub const LIST_COUNT: &str = "#";

/// Counter segment for maps.
pub const MAP_COUNT: &str = "%";

/// Segmented path to an attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldAddress {
    segments: Vec<String>,
}

impl FieldAddress {
    /// Creates an address from its segments.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a dotted key into an address.
    #[must_use]
    pub fn from_dotted(key: &str) -> Self {
        if key.is_empty() {
            return Self::default();
        }
        Self::new(key.split('.'))
    }

    /// Returns a new address extended by one segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment.into());
        Self { segments }
    }

    /// Address of the list/set counter below this address.
    #[must_use]
    pub fn count_key(&self) -> Self {
        self.child(LIST_COUNT)
    }

    /// Address of the map counter below this address.
    #[must_use]
    pub fn map_count_key(&self) -> Self {
        self.child(MAP_COUNT)
    }

    /// The segments of this address.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// The last segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the address has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Dotted form, used as the change-set and state key.
    #[must_use]
    pub fn join(&self) -> String {
        self.segments.join(".")
    }

    /// Dotted form with a trailing separator, for prefix scans.
    #[must_use]
    pub fn prefix(&self) -> String {
        let mut prefix = self.join();
        prefix.push('.');
        prefix
    }
}

impl fmt::Display for FieldAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join())
    }
}

impl From<&str> for FieldAddress {
    fn from(key: &str) -> Self {
        Self::from_dotted(key)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldAddress {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
