//! Composite-key child entities
//!
//! Facts attached to a party (attributes, contact mechanisms, roles, ...) are
//! identified by their owner plus a type code and, for some kinds, an extra
//! discriminator. Two child records with the same key are the same fact, even
//! if their values differ, so equality and hashing are defined on the key
//! alone and a `ChildSet` holds at most one record per key.

use std::fmt::Debug;
use std::hash::Hash;

use chrono::NaiveDate;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use core_kernel::EffectivePeriod;

/// A record identified by a composite key
pub trait ChildEntity {
    /// The identity of the record, usually `(owner, type_code[, discriminator])`
    type Key: Clone + Debug + Eq + Hash;
    /// The aggregate id the record hangs off
    type Owner: Copy;

    /// Returns the composite key
    fn key(&self) -> Self::Key;

    /// Returns the owning aggregate id
    fn owner(&self) -> Self::Owner;

    /// Re-parents the record
    fn set_owner(&mut self, owner: Self::Owner);
}

/// A record with an effective-date range
pub trait TimeBound {
    fn period(&self) -> &EffectivePeriod;

    /// Returns true if the record holds on the given date
    fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.period().contains(date)
    }
}

/// Implements `PartialEq`, `Eq` and `Hash` over `ChildEntity::key`
macro_rules! impl_key_identity {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    $crate::child::ChildEntity::key(self) == $crate::child::ChildEntity::key(other)
                }
            }

            impl Eq for $ty {}

            impl std::hash::Hash for $ty {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    std::hash::Hash::hash(&$crate::child::ChildEntity::key(self), state);
                }
            }
        )+
    };
}

pub(crate) use impl_key_identity;

/// Implements `ChildEntity` for a record owned by a party through its
/// `party_id` field, keyed by `party_id` plus the listed fields
macro_rules! impl_party_child {
    ($ty:ident { $($field:ident: $field_ty:ty),+ $(,)? }) => {
        impl $crate::child::ChildEntity for $ty {
            type Key = (core_kernel::PartyId, $($field_ty),+);
            type Owner = core_kernel::PartyId;

            fn key(&self) -> Self::Key {
                (self.party_id, $(self.$field.clone()),+)
            }

            fn owner(&self) -> core_kernel::PartyId {
                self.party_id
            }

            fn set_owner(&mut self, owner: core_kernel::PartyId) {
                self.party_id = owner;
            }
        }

        $crate::child::impl_key_identity!($ty);
    };
}

pub(crate) use impl_party_child;

/// Implements `TimeBound` over a `period` field
macro_rules! impl_time_bound {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $crate::child::TimeBound for $ty {
                fn period(&self) -> &core_kernel::EffectivePeriod {
                    &self.period
                }
            }
        )+
    };
}

pub(crate) use impl_time_bound;

/// An owned collection of child records, unique by key
///
/// Insertion order is preserved. On the wire the set is a plain array;
/// when an array repeats a key the last record wins.
#[derive(Debug, Clone)]
pub struct ChildSet<T> {
    items: Vec<T>,
}

impl<T> Default for ChildSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: ChildEntity> ChildSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the record, replacing any record with the same key
    ///
    /// # Returns
    ///
    /// The replaced record, if one existed
    pub fn upsert(&mut self, item: T) -> Option<T> {
        let key = item.key();
        match self.items.iter().position(|existing| existing.key() == key) {
            Some(index) => Some(std::mem::replace(&mut self.items[index], item)),
            None => {
                self.items.push(item);
                None
            }
        }
    }

    /// Looks up a record by key
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.key() == *key)
    }

    /// Removes and returns the record with the given key
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let index = self.items.iter().position(|item| item.key() == *key)?;
        Some(self.items.remove(index))
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.get(key).is_some()
    }

    /// Re-parents every record onto `owner`
    ///
    /// Records that collapse onto the same key after re-parenting are
    /// deduplicated, keeping the later one.
    pub fn claim(&mut self, owner: T::Owner) {
        let items = std::mem::take(&mut self.items);
        for mut item in items {
            item.set_owner(owner);
            self.upsert(item);
        }
    }
}

impl<T> ChildSet<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: TimeBound> ChildSet<T> {
    /// Returns the records effective on the given date
    pub fn effective_on(&self, date: NaiveDate) -> impl Iterator<Item = &T> {
        self.items.iter().filter(move |item| item.is_effective_on(date))
    }
}

impl<T: ChildEntity> FromIterator<T> for ChildSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.upsert(item);
        }
        set
    }
}

impl<T: ChildEntity> Extend<T> for ChildSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.upsert(item);
        }
    }
}

impl<T> IntoIterator for ChildSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ChildSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for ChildSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for ChildSet<T>
where
    T: ChildEntity + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Tag {
        owner: u32,
        code: String,
        value: i64,
        #[serde(default)]
        period: EffectivePeriod,
    }

    impl ChildEntity for Tag {
        type Key = (u32, String);
        type Owner = u32;

        fn key(&self) -> Self::Key {
            (self.owner, self.code.clone())
        }

        fn owner(&self) -> u32 {
            self.owner
        }

        fn set_owner(&mut self, owner: u32) {
            self.owner = owner;
        }
    }

    impl TimeBound for Tag {
        fn period(&self) -> &EffectivePeriod {
            &self.period
        }
    }

    impl_key_identity!(Tag);

    fn tag(owner: u32, code: &str, value: i64) -> Tag {
        Tag { owner, code: code.to_string(), value, period: EffectivePeriod::open() }
    }

    #[test]
    fn test_equality_ignores_value_fields() {
        assert_eq!(tag(1, "A", 10), tag(1, "A", 99));
        assert_ne!(tag(1, "A", 10), tag(2, "A", 10));
        assert_ne!(tag(1, "A", 10), tag(1, "B", 10));
    }

    #[test]
    fn test_upsert_replaces_by_key() {
        let mut set = ChildSet::new();
        assert!(set.upsert(tag(1, "A", 10)).is_none());
        let replaced = set.upsert(tag(1, "A", 20)).unwrap();
        assert_eq!(replaced.value, 10);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&(1, "A".to_string())).unwrap().value, 20);
    }

    #[test]
    fn test_remove() {
        let mut set: ChildSet<Tag> = vec![tag(1, "A", 1), tag(1, "B", 2)].into_iter().collect();
        assert!(set.remove(&(1, "A".to_string())).is_some());
        assert!(set.remove(&(1, "A".to_string())).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_claim_reparents_and_dedupes() {
        let mut set: ChildSet<Tag> = vec![tag(1, "A", 1), tag(2, "A", 2), tag(3, "B", 3)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);

        set.claim(9);
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|t| t.owner == 9));
        assert_eq!(set.get(&(9, "A".to_string())).unwrap().value, 2);
    }

    #[test]
    fn test_deserialize_last_duplicate_wins() {
        let json = r#"[
            {"owner": 1, "code": "A", "value": 1},
            {"owner": 1, "code": "A", "value": 2}
        ]"#;
        let set: ChildSet<Tag> = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().value, 2);
    }

    #[test]
    fn test_effective_on() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let mut expired = tag(1, "OLD", 0);
        expired.period = EffectivePeriod::between(day(1), day(10)).unwrap();
        let current = tag(1, "NEW", 0);

        let set: ChildSet<Tag> = vec![expired, current].into_iter().collect();
        let codes: Vec<_> = set.effective_on(day(20)).map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["NEW"]);
    }
}
