//! Effective-date periods and lifecycle stamps
//!
//! Time-bound facts (locks, roles, statuses, mandates) carry an
//! `EffectivePeriod`: a pair of optional calendar dates, inclusive at both
//! ends, where a missing bound means "unbounded".
//!
//! Every aggregate also carries `AuditStamps`, which the service layer
//! refreshes on each write.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Period is already closed on {0}")]
    AlreadyClosed(String),
}

/// The validity window of a time-bound fact
///
/// Both bounds are inclusive. A period with neither bound is always
/// effective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePeriod {
    /// First day the fact holds, None means since forever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    /// Last day the fact holds, None means until further notice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl EffectivePeriod {
    /// Creates a new period, rejecting a start after the end
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, TemporalError> {
        if let (Some(start), Some(end)) = (from, to) {
            if start > end {
                return Err(TemporalError::InvalidPeriod {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(Self { from, to })
    }

    /// A period with no bounds at all
    pub fn open() -> Self {
        Self::default()
    }

    /// An open-ended period starting on the given date
    pub fn starting(from: NaiveDate) -> Self {
        Self { from: Some(from), to: None }
    }

    /// A closed period between two dates
    pub fn between(from: NaiveDate, to: NaiveDate) -> Result<Self, TemporalError> {
        Self::new(Some(from), Some(to))
    }

    /// Returns true if the bounds are consistent
    ///
    /// Deserialized periods bypass `new`, so validators call this.
    pub fn is_valid(&self) -> bool {
        match (self.from, self.to) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }

    /// Returns true if this period contains the given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |start| date >= start) && self.to.map_or(true, |end| date <= end)
    }

    /// Alias of `contains` that reads better at call sites
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.contains(date)
    }

    /// Returns true if the period contains today's date (UTC)
    pub fn is_current(&self) -> bool {
        self.contains(Utc::now().date_naive())
    }

    /// Returns true if the two periods share at least one day
    pub fn overlaps(&self, other: &EffectivePeriod) -> bool {
        let starts_before_other_ends = match (self.from, other.to) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        };
        let other_starts_before_end = match (other.from, self.to) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        };
        starts_before_other_ends && other_starts_before_end
    }

    /// Returns true if the period has no end date
    pub fn is_open_ended(&self) -> bool {
        self.to.is_none()
    }

    /// Closes the period on the given date (inclusive)
    pub fn close_on(&mut self, date: NaiveDate) -> Result<(), TemporalError> {
        if let Some(end) = self.to {
            return Err(TemporalError::AlreadyClosed(end.to_string()));
        }
        if let Some(start) = self.from {
            if date < start {
                return Err(TemporalError::InvalidPeriod {
                    start: start.to_string(),
                    end: date.to_string(),
                });
            }
        }
        self.to = Some(date);
        Ok(())
    }
}

/// Lifecycle timestamps stamped on every write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl AuditStamps {
    /// Creates stamps for a record created now
    pub fn new(actor: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            created_by: actor.map(str::to_string),
            updated_by: actor.map(str::to_string),
        }
    }

    /// Marks the record as modified now
    pub fn touch(&mut self, actor: Option<&str>) {
        self.updated_at = Utc::now();
        if let Some(actor) = actor {
            self.updated_by = Some(actor.to_string());
        }
    }
}

impl Default for AuditStamps {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        let result = EffectivePeriod::new(Some(date(2024, 2, 1)), Some(date(2024, 1, 1)));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_single_day_period_is_valid() {
        let period = EffectivePeriod::between(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert!(period.contains(date(2024, 1, 1)));
        assert!(!period.contains(date(2024, 1, 2)));
    }

    #[test]
    fn test_open_period_contains_everything() {
        let period = EffectivePeriod::open();
        assert!(period.contains(date(1900, 1, 1)));
        assert!(period.contains(date(2999, 12, 31)));
        assert!(period.is_current());
    }

    #[test]
    fn test_overlaps() {
        let a = EffectivePeriod::between(date(2024, 1, 1), date(2024, 6, 30)).unwrap();
        let b = EffectivePeriod::starting(date(2024, 6, 30));
        let c = EffectivePeriod::starting(date(2024, 7, 1));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_close_on() {
        let mut period = EffectivePeriod::starting(date(2024, 1, 1));
        assert!(period.close_on(date(2023, 12, 31)).is_err());
        period.close_on(date(2024, 3, 31)).unwrap();
        assert_eq!(period.to, Some(date(2024, 3, 31)));
        assert!(matches!(
            period.close_on(date(2024, 4, 30)),
            Err(TemporalError::AlreadyClosed(_))
        ));
    }

    #[test]
    fn test_touch_updates_actor() {
        let mut stamps = AuditStamps::new(Some("alice"));
        let created = stamps.created_at;
        stamps.touch(Some("bob"));
        assert_eq!(stamps.created_at, created);
        assert!(stamps.updated_at >= created);
        assert_eq!(stamps.created_by.as_deref(), Some("alice"));
        assert_eq!(stamps.updated_by.as_deref(), Some("bob"));
    }
}
