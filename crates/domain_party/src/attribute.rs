//! Typed attributes attached to a party

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{EffectivePeriod, PartyId};

use crate::child::{impl_party_child, impl_time_bound};

/// The value type an attribute code expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeDataType {
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
}

impl AttributeDataType {
    pub fn code(&self) -> &'static str {
        match self {
            AttributeDataType::Text => "TEXT",
            AttributeDataType::Integer => "INTEGER",
            AttributeDataType::Decimal => "DECIMAL",
            AttributeDataType::Boolean => "BOOLEAN",
            AttributeDataType::Date => "DATE",
        }
    }
}

/// An attribute value, tagged with its type on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
}

impl AttributeValue {
    pub fn data_type(&self) -> AttributeDataType {
        match self {
            AttributeValue::Text(_) => AttributeDataType::Text,
            AttributeValue::Integer(_) => AttributeDataType::Integer,
            AttributeValue::Decimal(_) => AttributeDataType::Decimal,
            AttributeValue::Boolean(_) => AttributeDataType::Boolean,
            AttributeValue::Date(_) => AttributeDataType::Date,
        }
    }
}

/// A typed fact about a party, keyed by attribute type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    #[serde(default)]
    pub party_id: PartyId,
    pub attribute_type: String,
    pub value: AttributeValue,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl Attribute {
    pub fn new(party_id: PartyId, attribute_type: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            party_id,
            attribute_type: attribute_type.into(),
            value,
            period: EffectivePeriod::open(),
        }
    }
}

impl_party_child!(Attribute { attribute_type: String });
impl_time_bound!(Attribute);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::ChildEntity;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    #[test]
    fn test_equality_uses_key_only() {
        let party = PartyId::new();
        let a = Attribute::new(party, "HEIGHT", AttributeValue::Integer(180));
        let b = Attribute::new(party, "HEIGHT", AttributeValue::Decimal(dec!(1.80)));
        assert_eq!(a, b);

        let set: HashSet<_> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(a.key(), (party, "HEIGHT".to_string()));
    }

    #[test]
    fn test_value_wire_form() {
        let value = AttributeValue::Boolean(true);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({"type": "BOOLEAN", "value": true}));
        assert_eq!(value.data_type(), AttributeDataType::Boolean);
    }
}
