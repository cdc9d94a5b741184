//! Consents and preferences

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{EffectivePeriod, PartyId};

use crate::child::{impl_party_child, impl_time_bound};

/// A consent a party has granted or withheld (marketing, data sharing, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of a `ConsentType` row
    pub consent_type: String,
    pub granted: bool,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl Consent {
    pub fn granted(party_id: PartyId, consent_type: impl Into<String>) -> Self {
        Self {
            party_id,
            consent_type: consent_type.into(),
            granted: true,
            recorded_at: Utc::now(),
            period: EffectivePeriod::starting(Utc::now().date_naive()),
        }
    }

    /// Records a withdrawal effective from `date`
    ///
    /// The consent stays on file with `granted = false` and its period
    /// closed the day before `date`.
    pub fn withdraw(&mut self, date: NaiveDate) {
        self.granted = false;
        self.recorded_at = Utc::now();
        let last_day = date.pred_opt().unwrap_or(date);
        match self.period.from {
            Some(start) if last_day < start => self.period.to = Some(start),
            _ => self.period.to = Some(last_day),
        }
    }

    /// Returns true if consent is granted and effective on `date`
    pub fn is_given_on(&self, date: NaiveDate) -> bool {
        self.granted && self.period.contains(date)
    }
}

/// A preference a party has expressed, such as a preferred channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of a `PreferenceType` row
    pub preference_type: String,
    pub value: String,
}

impl Preference {
    pub fn new(party_id: PartyId, preference_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            party_id,
            preference_type: preference_type.into(),
            value: value.into(),
        }
    }
}

impl_party_child!(Consent { consent_type: String });
impl_party_child!(Preference { preference_type: String });
impl_time_bound!(Consent);
