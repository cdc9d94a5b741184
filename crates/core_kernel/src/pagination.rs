//! Pagination and sort envelopes
//!
//! List operations take a `PageRequest` and answer with a `Page<T>`, which
//! echoes the offset, limit and sort that produced it alongside the total
//! number of matching records.

use serde::{Deserialize, Serialize};

/// Default number of items per page
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Upper bound for a single page
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

/// A single sort criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Ascending }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Descending }
    }

    /// Parses `field` or `field,asc|desc`
    ///
    /// Returns None for an empty field or an unknown direction.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.splitn(2, ',');
        let field = parts.next()?.trim();
        if field.is_empty() {
            return None;
        }
        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            None => SortDirection::Ascending,
            Some(d) if d == "asc" || d == "ascending" => SortDirection::Ascending,
            Some(d) if d == "desc" || d == "descending" => SortDirection::Descending,
            Some(_) => return None,
        };
        Some(Self { field: field.to_string(), direction })
    }
}

/// Pagination parameters for a list operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
    #[serde(default)]
    pub sort: Vec<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
            sort: Vec::new(),
        }
    }
}

impl PageRequest {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit, sort: Vec::new() }
    }

    /// Adds a sort criterion
    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Returns a copy with the limit forced into `1..=MAX_PAGE_LIMIT`
    pub fn clamped(&self) -> Self {
        Self {
            offset: self.offset,
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
            sort: self.sort.clone(),
        }
    }
}

/// One page of list results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: u32,
    pub limit: u32,
    pub total_count: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortOrder>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_count: u64) -> Self {
        Self {
            items,
            offset: request.offset,
            limit: request.limit,
            total_count,
            sort: request.sort.clone(),
        }
    }

    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Pages an already-sorted, fully materialized list
    pub fn from_vec(all: Vec<T>, request: &PageRequest) -> Self {
        let request = request.clamped();
        let total_count = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset as usize)
            .take(request.limit as usize)
            .collect();
        Self::new(items, &request, total_count)
    }

    /// Returns true if more records exist beyond this page
    pub fn has_more(&self) -> bool {
        (self.offset as u64) + (self.items.len() as u64) < self.total_count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transforms the items while keeping the envelope
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            total_count: self.total_count,
            sort: self.sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("name"), Some(SortOrder::ascending("name")));
        assert_eq!(SortOrder::parse("name, DESC"), Some(SortOrder::descending("name")));
        assert_eq!(SortOrder::parse(",desc"), None);
        assert_eq!(SortOrder::parse("name,sideways"), None);
    }

    #[test]
    fn test_from_vec_pages_and_counts() {
        let request = PageRequest::new(2, 3);
        let page = Page::from_vec((0..10).collect::<Vec<_>>(), &request);
        assert_eq!(page.items, vec![2, 3, 4]);
        assert_eq!(page.total_count, 10);
        assert!(page.has_more());
    }

    #[test]
    fn test_last_page_has_no_more() {
        let request = PageRequest::new(8, 5);
        let page = Page::from_vec((0..10).collect::<Vec<_>>(), &request);
        assert_eq!(page.items, vec![8, 9]);
        assert!(!page.has_more());
    }

    #[test]
    fn test_clamped_limit() {
        assert_eq!(PageRequest::new(0, 0).clamped().limit, 1);
        assert_eq!(PageRequest::new(0, 10_000).clamped().limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_map_keeps_envelope() {
        let request = PageRequest::new(0, 2).sorted_by(SortOrder::descending("code"));
        let page = Page::from_vec(vec![1, 2, 3], &request).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.sort, vec![SortOrder::descending("code")]);
    }
}
