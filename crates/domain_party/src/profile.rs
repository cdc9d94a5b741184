//! Skills and languages of persons, industry classifications of
//! organizations

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use core_kernel::{EffectivePeriod, PartyId};

use crate::child::{impl_party_child, impl_time_bound};

/// A qualification held by a person
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of a `QualificationType` row
    pub qualification_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl Skill {
    pub fn new(party_id: PartyId, qualification_type: impl Into<String>) -> Self {
        Self {
            party_id,
            qualification_type: qualification_type.into(),
            level: None,
            institution: None,
            period: EffectivePeriod::open(),
        }
    }
}

/// Command of a language in one of its modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProficiencyLevel {
    None,
    Basic,
    Intermediate,
    Advanced,
    Fluent,
}

/// How well a person reads, writes and speaks a language
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageProficiency {
    #[serde(default)]
    pub party_id: PartyId,
    pub language: LanguageIdentifier,
    pub reading: ProficiencyLevel,
    pub writing: ProficiencyLevel,
    pub speaking: ProficiencyLevel,
    #[serde(default)]
    pub native: bool,
}

impl LanguageProficiency {
    pub fn native(party_id: PartyId, language: LanguageIdentifier) -> Self {
        Self {
            party_id,
            language,
            reading: ProficiencyLevel::Fluent,
            writing: ProficiencyLevel::Fluent,
            speaking: ProficiencyLevel::Fluent,
            native: true,
        }
    }

    pub fn new(party_id: PartyId, language: LanguageIdentifier, level: ProficiencyLevel) -> Self {
        Self {
            party_id,
            language,
            reading: level,
            writing: level,
            speaking: level,
            native: false,
        }
    }
}

/// Classification of an organization under an industry scheme (NACE, SIC, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryClassification {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of an `IndustryClassificationCategory` row, naming the scheme
    pub category: String,
    pub code: String,
    #[serde(default)]
    pub primary: bool,
}

impl IndustryClassification {
    pub fn new(party_id: PartyId, category: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            party_id,
            category: category.into(),
            code: code.into(),
            primary: false,
        }
    }
}

impl_party_child!(Skill { qualification_type: String });
impl_party_child!(LanguageProficiency { language: LanguageIdentifier });
impl_party_child!(IndustryClassification { category: String });
impl_time_bound!(Skill);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::ChildSet;

    #[test]
    fn test_language_key() {
        let party = PartyId::new();
        let mut languages = ChildSet::new();
        languages.upsert(LanguageProficiency::new(party, "nl-BE".parse().unwrap(), ProficiencyLevel::Basic));
        languages.upsert(LanguageProficiency::native(party, "nl-BE".parse().unwrap()));
        languages.upsert(LanguageProficiency::native(party, "fr".parse().unwrap()));

        assert_eq!(languages.len(), 2);
        let dutch = languages.get(&(party, "nl-BE".parse().unwrap())).unwrap();
        assert!(dutch.native);
    }

    #[test]
    fn test_proficiency_ordering() {
        assert!(ProficiencyLevel::Fluent > ProficiencyLevel::Basic);
    }
}
