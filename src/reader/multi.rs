//! Stacked readers.

use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::address::FieldAddress;
use crate::error::{ReadError, Result};

use super::{FieldReadResult, FieldReader};

/// Reads through an ordered stack of named readers.
///
/// Levels are ordered lowest first. A level may be declared without a reader;
/// it is then skipped when merging.
#[derive(Default)]
pub struct MultiLevelFieldReader<'a> {
    levels: Vec<String>,
    readers: HashMap<String, Box<dyn FieldReader + 'a>>,
}

impl<'a> MultiLevelFieldReader<'a> {
    /// Creates a stack with the given levels, lowest first.
    #[must_use]
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
            readers: HashMap::new(),
        }
    }

    /// Attaches a reader to `level`, declaring the level on top if needed.
    pub fn set_reader(&mut self, level: impl Into<String>, reader: impl FieldReader + 'a) {
        let level = level.into();
        if !self.levels.contains(&level) {
            self.levels.push(level.clone());
        }
        self.readers.insert(level, Box::new(reader));
    }

    /// Builder form of [`set_reader`](Self::set_reader).
    #[must_use]
    pub fn with_reader(mut self, level: impl Into<String>, reader: impl FieldReader + 'a) -> Self {
        self.set_reader(level, reader);
        self
    }

    /// Declared levels, lowest first.
    #[must_use]
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    fn check_level(&self, level: &str) -> Result<()> {
        if self.levels.iter().any(|l| l == level) {
            Ok(())
        } else {
            Err(ReadError::UnknownLevel {
                level: level.to_string(),
            }
            .into())
        }
    }

    /// Reads `address` from exactly one level.
    ///
    /// # Errors
    ///
    /// Returns an error if the level has no reader, or if the read fails.
    pub fn read_field_exact(&self, address: &FieldAddress, level: &str) -> Result<FieldReadResult> {
        let Some(reader) = self.readers.get(level) else {
            return Err(ReadError::UnknownLevel {
                level: level.to_string(),
            }
            .into());
        };
        reader.read_field(address)
    }

    /// Reads `address` through every level up to and including `level`.
    ///
    /// The highest level at which the attribute exists wins. If it exists
    /// nowhere, the result is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if `level` is not declared, or if any read fails.
    pub fn read_field_merge(&self, address: &FieldAddress, level: &str) -> Result<FieldReadResult> {
        self.check_level(level)?;

        let mut result = FieldReadResult::absent();
        for current in &self.levels {
            if let Some(reader) = self.readers.get(current) {
                let out = reader.read_field(address)?;
                if out.exists {
                    debug!("{address} found at level {current}");
                    result = out;
                }
            }
            if current == level {
                break;
            }
        }
        Ok(result)
    }
}

impl fmt::Debug for MultiLevelFieldReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attached: Vec<&str> = self.readers.keys().map(String::as_str).collect();
        attached.sort_unstable();
        f.debug_struct("MultiLevelFieldReader")
            .field("levels", &self.levels)
            .field("attached", &attached)
            .finish()
    }
}

impl FieldReader for MultiLevelFieldReader<'_> {
    /// Merges through the top level. An empty stack reads as absent.
    fn read_field(&self, address: &FieldAddress) -> Result<FieldReadResult> {
        match self.levels.last() {
            Some(top) => self.read_field_merge(address, top),
            None => Ok(FieldReadResult::absent()),
        }
    }
}
