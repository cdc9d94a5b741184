//! Association and mandate DTOs

use serde::Deserialize;

use core_kernel::{AssociationId, EffectivePeriod, MandateId, PartyId, TenantId};
use domain_party::{Association, ChildSet, Mandatary, Mandate, MandateProperty};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRequest {
    #[serde(default)]
    pub id: Option<AssociationId>,
    pub association_type: String,
    pub from_party_id: PartyId,
    pub to_party_id: PartyId,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl AssociationRequest {
    pub fn into_association(self, tenant_id: TenantId, id: Option<AssociationId>) -> Association {
        let mut association = Association::new(
            tenant_id,
            self.association_type,
            self.from_party_id,
            self.to_party_id,
        );
        if let Some(id) = id.or(self.id) {
            association.id = id;
        }
        association.period = self.period;
        association
    }
}

/// Body of `POST /mandates` and `PUT /mandates/:id`
///
/// Mandataries and properties may omit `mandateId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandateRequest {
    #[serde(default)]
    pub id: Option<MandateId>,
    /// The mandating party
    pub party_id: PartyId,
    pub mandate_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub period: EffectivePeriod,
    #[serde(default)]
    pub mandataries: ChildSet<Mandatary>,
    #[serde(default)]
    pub properties: ChildSet<MandateProperty>,
}

impl MandateRequest {
    pub fn into_mandate(self, tenant_id: TenantId, id: Option<MandateId>) -> Mandate {
        let mut mandate = Mandate::new(tenant_id, self.party_id, self.mandate_type);
        if let Some(id) = id.or(self.id) {
            mandate.id = id;
        }
        mandate.description = self.description;
        mandate.period = self.period;
        mandate.mandataries = self.mandataries;
        mandate.properties = self.properties;
        mandate.claim_children();
        mandate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandate_request_claims_mandataries() {
        let grantor = PartyId::new();
        let agent = PartyId::new();
        let json = format!(
            r#"{{
                "partyId": "{}",
                "mandateType": "SIGNING",
                "mandataries": [
                    {{ "partyId": "{}", "mandataryType": "PERSON", "mandataryRole": "SIGNATORY" }}
                ],
                "properties": [ {{ "propertyType": "LIMIT", "value": "1000" }} ]
            }}"#,
            grantor.as_uuid(),
            agent.as_uuid()
        );
        let request: MandateRequest = serde_json::from_str(&json).unwrap();
        let mandate = request.into_mandate(TenantId::new(), None);

        assert_eq!(mandate.party_id, grantor);
        assert!(mandate.mandataries.iter().all(|m| m.mandate_id == mandate.id));
        assert!(mandate.properties.iter().all(|p| p.mandate_id == mandate.id));
    }

    #[test]
    fn test_association_request_uses_path_id() {
        let id = AssociationId::new();
        let json = format!(
            r#"{{ "associationType": "EMPLOYER", "fromPartyId": "{}", "toPartyId": "{}" }}"#,
            PartyId::new().as_uuid(),
            PartyId::new().as_uuid()
        );
        let request: AssociationRequest = serde_json::from_str(&json).unwrap();
        let association = request.into_association(TenantId::new(), Some(id));

        assert_eq!(association.id, id);
        assert!(association.period.is_open_ended());
    }
}
