//! Lazily compiled validation patterns
//!
//! Catalog rows such as `MandatePropertyType` and `TaxNumberType` store a
//! regular expression as text. The compiled `Regex` is built on first use
//! and cached on the row, so every later call hands back the same instance.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A stored regular expression plus its memoized compilation
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompiledPattern {
    source: Option<String>,
    #[serde(skip)]
    compiled: OnceCell<Regex>,
    #[serde(skip)]
    anchored: OnceCell<Regex>,
}

impl CompiledPattern {
    pub fn new(source: Option<String>) -> Self {
        Self {
            source: source.filter(|s| !s.is_empty()),
            compiled: OnceCell::new(),
            anchored: OnceCell::new(),
        }
    }

    /// Returns the stored pattern text
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Replaces the pattern and drops any cached compilation
    pub fn set_source(&mut self, source: Option<String>) {
        *self = Self::new(source);
    }

    /// Returns the compiled pattern, compiling it on first call
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no pattern is stored, otherwise the cached `Regex`.
    /// The same instance is returned on every successful call.
    pub fn compiled(&self) -> Result<Option<&Regex>, regex::Error> {
        match &self.source {
            None => Ok(None),
            Some(source) => self.compiled.get_or_try_init(|| Regex::new(source)).map(Some),
        }
    }

    /// Returns true if `value` matches the whole pattern
    ///
    /// A row without a pattern accepts every value.
    pub fn accepts(&self, value: &str) -> Result<bool, regex::Error> {
        match &self.source {
            None => Ok(true),
            Some(source) => {
                let anchored = self
                    .anchored
                    .get_or_try_init(|| Regex::new(&format!("^(?:{})$", source)))?;
                Ok(anchored.is_match(value))
            }
        }
    }
}

impl Clone for CompiledPattern {
    fn clone(&self) -> Self {
        Self::new(self.source.clone())
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CompiledPattern {}
