//! Query-string parameters of list and catalog routes

use serde::Deserialize;
use unic_langid::LanguageIdentifier;

use core_kernel::{PageRequest, SortOrder};
use domain_party::{PartyQuery, PartyType};

use crate::error::ApiError;

/// Paging, sorting and filtering of list routes
///
/// `sort` holds one or more `field[,asc|desc]` criteria separated by `;`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub party_type: Option<String>,
    pub name: Option<String>,
    pub segment: Option<String>,
    pub reference_type: Option<String>,
    pub reference_value: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> Result<PageRequest, ApiError> {
        let defaults = PageRequest::default();
        let mut page = PageRequest::new(
            self.offset.unwrap_or(defaults.offset),
            self.limit.unwrap_or(defaults.limit),
        );
        if let Some(sort) = &self.sort {
            for criterion in sort.split(';').filter(|c| !c.trim().is_empty()) {
                let order = SortOrder::parse(criterion)
                    .ok_or_else(|| ApiError::BadRequest(format!("Invalid sort '{}'", criterion)))?;
                page = page.sorted_by(order);
            }
        }
        Ok(page)
    }

    pub fn party_query(&self) -> Result<PartyQuery, ApiError> {
        let mut query = PartyQuery::default();
        if let Some(code) = &self.party_type {
            let party_type = PartyType::from_code(&code.to_ascii_uppercase())
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown party type '{}'", code)))?;
            query = query.of_type(party_type);
        }
        query.name_contains = self.name.clone();
        if let Some(segment) = &self.segment {
            query = query.in_segment(segment.clone());
        }
        query.external_reference = match (&self.reference_type, &self.reference_value) {
            (Some(reference_type), Some(value)) => Some((reference_type.clone(), value.clone())),
            (None, None) => None,
            _ => {
                return Err(ApiError::BadRequest(
                    "referenceType and referenceValue must be given together".to_string(),
                ))
            }
        };
        Ok(query)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub locale: Option<String>,
}

impl CatalogQuery {
    pub fn locale(&self) -> Result<Option<LanguageIdentifier>, ApiError> {
        self.locale
            .as_deref()
            .map(parse_locale)
            .transpose()
    }
}

pub fn parse_locale(tag: &str) -> Result<LanguageIdentifier, ApiError> {
    tag.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid locale '{}'", tag)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::SortDirection;

    #[test]
    fn test_sort_accepts_several_criteria() {
        let query = ListQuery {
            sort: Some("displayName;createdAt,desc".to_string()),
            limit: Some(10),
            ..Default::default()
        };
        let page = query.page().unwrap();

        assert_eq!(page.limit, 10);
        assert_eq!(page.sort.len(), 2);
        assert_eq!(page.sort[1].direction, SortDirection::Descending);
    }

    #[test]
    fn test_bad_sort_direction_is_rejected() {
        let query = ListQuery {
            sort: Some("createdAt,sideways".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.page(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_party_type_is_case_insensitive() {
        let query = ListQuery {
            party_type: Some("person".to_string()),
            ..Default::default()
        };
        assert_eq!(query.party_query().unwrap().party_type, Some(PartyType::Person));
    }

    #[test]
    fn test_reference_filter_needs_both_halves() {
        let query = ListQuery {
            reference_type: Some("CRM".to_string()),
            ..Default::default()
        };
        assert!(query.party_query().is_err());
    }

    #[test]
    fn test_catalog_locale() {
        let query = CatalogQuery { locale: Some("de-CH".to_string()) };
        assert_eq!(query.locale().unwrap().unwrap().to_string(), "de-CH");
        assert!(CatalogQuery { locale: Some("??".to_string()) }.locale().is_err());
    }
}
