//! Declared origins of a party's funds and wealth

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::PartyId;

use crate::child::impl_party_child;

/// Where the money used in a relationship comes from (salary, sale, ...)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SourceOfFunds {
    #[serde(default)]
    pub party_id: PartyId,
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// ISO 4217
    #[validate(length(equal = 3))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SourceOfFunds {
    pub fn new(party_id: PartyId, source_type: impl Into<String>) -> Self {
        Self {
            party_id,
            source_type: source_type.into(),
            amount: None,
            currency: None,
            description: None,
        }
    }

    pub fn with_amount(mut self, amount: Decimal, currency: impl Into<String>) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.into());
        self
    }
}

/// How a party built up its overall wealth (inheritance, business, ...)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SourceOfWealth {
    #[serde(default)]
    pub party_id: PartyId,
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[validate(length(equal = 3))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SourceOfWealth {
    pub fn new(party_id: PartyId, source_type: impl Into<String>) -> Self {
        Self {
            party_id,
            source_type: source_type.into(),
            amount: None,
            currency: None,
            description: None,
        }
    }

    pub fn with_amount(mut self, amount: Decimal, currency: impl Into<String>) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.into());
        self
    }
}

impl_party_child!(SourceOfFunds { source_type: String });
impl_party_child!(SourceOfWealth { source_type: String });
