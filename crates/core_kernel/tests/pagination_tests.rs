//! Tests for pagination envelopes

use core_kernel::{Page, PageRequest, SortDirection, SortOrder};

#[test]
fn test_default_request() {
    let request = PageRequest::default();

    assert_eq!(request.offset, 0);
    assert_eq!(request.limit, core_kernel::pagination::DEFAULT_PAGE_LIMIT);
    assert!(request.sort.is_empty());
}

#[test]
fn test_offset_past_end_yields_empty_page() {
    let page = Page::from_vec(vec!["a", "b"], &PageRequest::new(5, 10));

    assert!(page.is_empty());
    assert_eq!(page.total_count, 2);
    assert!(!page.has_more());
}

#[test]
fn test_page_serializes_camel_case() {
    let page = Page::from_vec(vec![1, 2, 3], &PageRequest::new(0, 2));
    let json = serde_json::to_value(&page).unwrap();

    assert_eq!(json["totalCount"], 3);
    assert_eq!(json["items"], serde_json::json!([1, 2]));
    assert!(json.get("sort").is_none());
}

#[test]
fn test_sort_direction_accepts_short_aliases() {
    let direction: SortDirection = serde_json::from_str("\"desc\"").unwrap();

    assert_eq!(direction, SortDirection::Descending);
}

#[test]
fn test_sorted_by_accumulates() {
    let request = PageRequest::new(0, 10)
        .sorted_by(SortOrder::ascending("type"))
        .sorted_by(SortOrder::descending("name"));

    assert_eq!(request.sort.len(), 2);
    assert_eq!(request.sort[1].direction, SortDirection::Descending);
}
