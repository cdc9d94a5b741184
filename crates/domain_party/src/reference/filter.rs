//! Party-type filters for reference data
//!
//! Several catalogs restrict which kind of party a code may be used for. The
//! list is persisted as a single comma-delimited column (`"PERSON,ORGANIZATION"`)
//! and exposed on the wire as an array of codes.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::party::PartyType;

const SEPARATOR: char = ',';

/// The set of party types a catalog code is valid for
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PartyTypeFilter {
    stored: Option<String>,
}

impl PartyTypeFilter {
    /// Builds a filter from individual codes
    ///
    /// Codes are trimmed and blank codes dropped. A code containing the
    /// separator is split. An empty result stores nothing.
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        let joined = codes
            .iter()
            .flat_map(|code| code.as_ref().split(SEPARATOR))
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        Self::from_joined(joined)
    }

    /// Builds a filter for the given party types
    pub fn for_party_types(types: &[PartyType]) -> Self {
        let codes: Vec<&str> = types.iter().map(PartyType::code).collect();
        Self::from_codes(&codes)
    }

    /// Restores a filter from its persisted column value
    pub fn from_stored(stored: Option<String>) -> Self {
        match stored {
            Some(value) => Self::from_codes(&[value]),
            None => Self::default(),
        }
    }

    fn from_joined(joined: String) -> Self {
        if joined.is_empty() {
            Self { stored: None }
        } else {
            Self { stored: Some(joined) }
        }
    }

    /// Returns the persisted comma-delimited form
    pub fn as_stored(&self) -> Option<&str> {
        self.stored.as_deref()
    }

    /// Returns the codes in stored order
    pub fn codes(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.stored
            .as_deref()
            .into_iter()
            .flat_map(|stored| stored.split(SEPARATOR))
    }

    pub fn is_empty(&self) -> bool {
        self.stored.is_none()
    }

    /// Returns true if `code` is one of the stored party types
    ///
    /// Matching is exact and case-sensitive. A filter with no codes accepts
    /// nothing.
    pub fn is_valid_for_party_type(&self, code: &str) -> bool {
        self.iter().any(|stored| stored == code)
    }

    /// Typed variant of `is_valid_for_party_type`
    pub fn allows(&self, party_type: PartyType) -> bool {
        self.is_valid_for_party_type(party_type.code())
    }
}

impl Serialize for PartyTypeFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireFilter {
    Codes(Vec<String>),
    Joined(String),
}

impl<'de> Deserialize<'de> for PartyTypeFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Option::<WireFilter>::deserialize(deserializer)?;
        Ok(match wire {
            Some(WireFilter::Codes(codes)) => Self::from_codes(&codes),
            Some(WireFilter::Joined(joined)) => Self::from_stored(Some(joined)),
            None => Self::default(),
        })
    }
}
