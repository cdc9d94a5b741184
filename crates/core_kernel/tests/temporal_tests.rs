//! Unit tests for effective periods and audit stamps

use chrono::{Days, NaiveDate, Utc};
use core_kernel::{AuditStamps, EffectivePeriod, TemporalError};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod effective_period {
    use super::*;

    mod creation {
        use super::*;

        #[test]
        fn test_new_with_both_bounds() {
            let period = EffectivePeriod::new(Some(date(2024, 1, 1)), Some(date(2024, 12, 31))).unwrap();

            assert_eq!(period.from, Some(date(2024, 1, 1)));
            assert_eq!(period.to, Some(date(2024, 12, 31)));
            assert!(!period.is_open_ended());
        }

        #[test]
        fn test_new_fails_when_start_after_end() {
            let result = EffectivePeriod::new(Some(date(2024, 12, 31)), Some(date(2024, 1, 1)));

            assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
        }

        #[test]
        fn test_starting_is_open_ended() {
            let period = EffectivePeriod::starting(date(2024, 1, 1));

            assert!(period.is_open_ended());
            assert!(period.is_valid());
        }

        #[test]
        fn test_deserialized_inverted_period_is_invalid() {
            let period: EffectivePeriod =
                serde_json::from_str(r#"{"from":"2024-02-01","to":"2024-01-01"}"#).unwrap();

            assert!(!period.is_valid());
        }

        #[test]
        fn test_open_period_serializes_to_empty_object() {
            let json = serde_json::to_string(&EffectivePeriod::open()).unwrap();

            assert_eq!(json, "{}");
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn test_bounds_are_inclusive() {
            let period = EffectivePeriod::between(date(2024, 1, 1), date(2024, 1, 31)).unwrap();

            assert!(period.contains(date(2024, 1, 1)));
            assert!(period.contains(date(2024, 1, 31)));
            assert!(!period.contains(date(2023, 12, 31)));
            assert!(!period.contains(date(2024, 2, 1)));
        }

        #[test]
        fn test_is_current_for_expired_period() {
            let today = Utc::now().date_naive();
            let ended = today.checked_sub_days(Days::new(1)).unwrap();
            let period = EffectivePeriod::new(None, Some(ended)).unwrap();

            assert!(!period.is_current());
        }

        #[test]
        fn test_is_current_for_future_period() {
            let today = Utc::now().date_naive();
            let starts = today.checked_add_days(Days::new(10)).unwrap();

            assert!(!EffectivePeriod::starting(starts).is_current());
        }

        #[test]
        fn test_open_periods_overlap_everything() {
            let open = EffectivePeriod::open();
            let closed = EffectivePeriod::between(date(2020, 1, 1), date(2020, 1, 2)).unwrap();

            assert!(open.overlaps(&closed));
            assert!(closed.overlaps(&open));
        }
    }
}

mod audit_stamps {
    use super::*;

    #[test]
    fn test_new_stamps_share_timestamp() {
        let stamps = AuditStamps::new(None);

        assert_eq!(stamps.created_at, stamps.updated_at);
        assert!(stamps.created_by.is_none());
    }

    #[test]
    fn test_touch_without_actor_keeps_previous_actor() {
        let mut stamps = AuditStamps::new(Some("importer"));
        stamps.touch(None);

        assert_eq!(stamps.updated_by.as_deref(), Some("importer"));
    }
}

proptest! {
    #[test]
    fn prop_contains_matches_bounds(start in 0u64..3650, len in 0u64..3650, probe in 0u64..8000) {
        let base = date(2000, 1, 1);
        let from = base.checked_add_days(Days::new(start)).unwrap();
        let to = from.checked_add_days(Days::new(len)).unwrap();
        let day = base.checked_add_days(Days::new(probe)).unwrap();
        let period = EffectivePeriod::between(from, to).unwrap();

        prop_assert_eq!(period.contains(day), day >= from && day <= to);
    }

    #[test]
    fn prop_overlap_is_symmetric(a in 0u64..1000, b in 0u64..1000, c in 0u64..1000, d in 0u64..1000) {
        let base = date(2010, 1, 1);
        let p1 = EffectivePeriod::between(
            base.checked_add_days(Days::new(a.min(b))).unwrap(),
            base.checked_add_days(Days::new(a.max(b))).unwrap(),
        ).unwrap();
        let p2 = EffectivePeriod::between(
            base.checked_add_days(Days::new(c.min(d))).unwrap(),
            base.checked_add_days(Days::new(c.max(d))).unwrap(),
        ).unwrap();

        prop_assert_eq!(p1.overlaps(&p2), p2.overlaps(&p1));
    }
}
