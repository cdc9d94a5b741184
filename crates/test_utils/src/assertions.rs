//! Custom Test Assertions
//!
//! Assertion helpers for party types that give more meaningful failure
//! messages than a plain `assert_eq!` on large aggregates.

use chrono::NaiveDate;

use core_kernel::{EffectivePeriod, Page};
use domain_party::{ChildEntity, ChildSet, Party, PartyError};

/// Asserts a page's size, total and offset
pub fn assert_page<T>(page: &Page<T>, expected_len: usize, expected_total: u64) {
    assert_eq!(
        page.items.len(),
        expected_len,
        "Expected {} items on the page, got {}",
        expected_len,
        page.items.len()
    );
    assert_eq!(
        page.total_count, expected_total,
        "Expected total count {}, got {}",
        expected_total, page.total_count
    );
}

/// Asserts that a period contains a date
pub fn assert_period_contains(period: &EffectivePeriod, date: NaiveDate) {
    assert!(
        period.contains(date),
        "Expected {} to be within {:?}..{:?}",
        date,
        period.from,
        period.to
    );
}

/// Asserts that two child sets hold the same keys in the same order
pub fn assert_same_keys<T: ChildEntity>(actual: &ChildSet<T>, expected: &ChildSet<T>)
where
    T::Key: std::fmt::Debug + PartialEq,
{
    let actual_keys: Vec<_> = actual.iter().map(|c| c.key()).collect();
    let expected_keys: Vec<_> = expected.iter().map(|c| c.key()).collect();
    assert_eq!(actual_keys, expected_keys, "Child sets differ");
}

/// Asserts that a stored party kept the identity and child facts it was
/// written with
pub fn assert_same_party(actual: &Party, expected: &Party) {
    assert_eq!(actual.id, expected.id, "Party IDs differ");
    assert_eq!(actual.tenant_id, expected.tenant_id, "Tenants differ");
    assert_eq!(actual.details, expected.details, "Details differ");
    assert_same_keys(&actual.attributes, &expected.attributes);
    assert_same_keys(&actual.contact_mechanisms, &expected.contact_mechanisms);
    assert_same_keys(&actual.identity_documents, &expected.identity_documents);
    assert_same_keys(&actual.tax_numbers, &expected.tax_numbers);
    assert_same_keys(&actual.external_references, &expected.external_references);
    assert_same_keys(&actual.segments, &expected.segments);
    assert_same_keys(&actual.roles, &expected.roles);
    assert_same_keys(&actual.statuses, &expected.statuses);
}

/// Asserts that a result failed validation with a message containing `fragment`
pub fn assert_validation_error<T: std::fmt::Debug>(result: &Result<T, PartyError>, fragment: &str) {
    match result {
        Err(PartyError::ValidationFailed(errors)) => assert!(
            errors.iter().any(|e| e.contains(fragment)),
            "No validation error contains '{}': {:?}",
            fragment,
            errors
        ),
        other => panic!("Expected a validation failure, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::PartyBuilder;
    use crate::fixtures::TemporalFixtures;
    use core_kernel::{PageRequest, TenantId};

    #[test]
    fn test_assert_page() {
        let page = Page::from_vec(vec![1, 2, 3], &PageRequest::new(1, 1));
        assert_page(&page, 1, 3);
    }

    #[test]
    #[should_panic(expected = "Expected total count")]
    fn test_assert_page_reports_total() {
        let page = Page::from_vec(vec![1, 2, 3], &PageRequest::new(0, 10));
        assert_page(&page, 3, 4);
    }

    #[test]
    fn test_assert_period_contains() {
        assert_period_contains(&TemporalFixtures::year_2024(), TemporalFixtures::date(2024, 7, 1));
    }

    #[test]
    fn test_same_party_after_clone() {
        let party = PartyBuilder::organization(TenantId::new())
            .with_segment("RETAIL")
            .with_external_reference("CRM", "42")
            .build();
        assert_same_party(&party.clone(), &party);
    }

    #[test]
    fn test_validation_error_helper() {
        let result: Result<(), PartyError> =
            Err(PartyError::validation_failed(vec!["Organization name is required".into()]));
        assert_validation_error(&result, "name is required");
    }
}
