//! Property-Based Test Generators
//!
//! Proptest strategies for parties and periods that respect the structural
//! rules of the party validator.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use core_kernel::{EffectivePeriod, TenantId};
use domain_party::{Organization, Party, PartySegment, PartyType, Person};

/// Strategy for dates between 1900 and 2020
pub fn past_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..(120 * 365)).prop_map(|days| {
        NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default() + Duration::days(days)
    })
}

/// Strategy for well-formed periods, open-ended on either side or both
pub fn period_strategy() -> impl Strategy<Value = EffectivePeriod> {
    (
        proptest::option::of(past_date_strategy()),
        proptest::option::of(0i64..3650),
    )
        .prop_map(|(from, length)| match (from, length) {
            (Some(from), Some(days)) => EffectivePeriod {
                from: Some(from),
                to: Some(from + Duration::days(days)),
            },
            (from, _) => EffectivePeriod { from, to: None },
        })
}

/// Strategy for human-looking names
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,15}"
}

/// Strategy for catalog codes
pub fn code_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z_]{1,19}"
}

/// Strategy for ISO 3166-1 alpha-2 country codes used in tests
pub fn country_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("CH".to_string()),
        Just("DE".to_string()),
        Just("FR".to_string()),
        Just("GB".to_string()),
        Just("US".to_string()),
    ]
}

pub fn party_type_strategy() -> impl Strategy<Value = PartyType> {
    prop_oneof![Just(PartyType::Person), Just(PartyType::Organization)]
}

/// Strategy for valid persons
pub fn person_strategy() -> impl Strategy<Value = Person> {
    (
        name_strategy(),
        name_strategy(),
        proptest::option::of(past_date_strategy()),
        proptest::option::of(country_strategy()),
    )
        .prop_map(|(given, family, birth, nationality)| {
            let mut person = Person::new(given, family);
            person.date_of_birth = birth;
            person.nationality = nationality;
            person
        })
}

/// Strategy for valid organizations
pub fn organization_strategy() -> impl Strategy<Value = Organization> {
    (name_strategy(), proptest::option::of(country_strategy())).prop_map(|(name, country)| {
        let mut organization = Organization::new(name);
        organization.incorporation_country = country;
        organization
    })
}

/// Strategy for parties of either type with up to three segments
pub fn party_strategy(tenant_id: TenantId) -> impl Strategy<Value = Party> {
    let details = prop_oneof![
        person_strategy().prop_map(move |person| Party::new_person(tenant_id, person)),
        organization_strategy().prop_map(move |org| Party::new_organization(tenant_id, org)),
    ];
    (details, proptest::collection::vec(code_strategy(), 0..3)).prop_map(|(mut party, segments)| {
        for segment in segments {
            party.segments.upsert(PartySegment::new(party.id, segment));
        }
        party
    })
}
