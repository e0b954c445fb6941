//! Page envelope normalization.

mod common;

use pim_admin_sdk::models::Category;
use pim_admin_sdk::{Page, PimError};
use serde_json::json;

#[test]
fn both_envelopes_normalize_identically() {
    let items = vec![json!({"id": 1}), json!({"id": 2})];
    let spring = json!({
        "content": items,
        "totalElements": 5,
        "totalPages": 3,
        "size": 2,
        "number": 1
    });
    let plain = json!({
        "data": items,
        "total": 5,
        "page": 1,
        "size": 2,
        "totalPages": 3
    });

    let a = Page::from_envelope(spring).unwrap();
    let b = Page::from_envelope(plain).unwrap();
    assert_eq!(a, b);

    assert_eq!(a.items.len(), 2);
    assert_eq!(a.total_items, 5);
    assert_eq!(a.page_index, 1);
    assert_eq!(a.page_size, 2);
    assert_eq!(a.total_pages, 3);
    assert!(!a.is_first_page);
    assert!(!a.is_last_page);
    assert!(!a.is_empty);
}

#[test]
fn last_page_is_flagged() {
    let page = Page::from_envelope(common::spring_page(vec![json!({"id": 9})], 5, 2, 2)).unwrap();
    assert_eq!(page.total_pages, 3);
    assert!(page.is_last_page);
    assert!(!page.is_first_page);
}

#[test]
fn missing_total_pages_is_computed() {
    let page = Page::from_envelope(json!({
        "data": [{"id": 1}],
        "total": 45,
        "page": 0,
        "size": 20
    }))
    .unwrap();
    assert_eq!(page.total_pages, 3);
    assert!(page.is_first_page);
    assert!(!page.is_last_page);
}

#[test]
fn bare_array_is_a_single_page() {
    let page = Page::from_envelope(json!([{"id": 1}, {"id": 2}, {"id": 3}])).unwrap();
    assert_eq!(page.total_items, 3);
    assert_eq!(page.page_index, 0);
    assert_eq!(page.page_size, 3);
    assert_eq!(page.total_pages, 1);
    assert!(page.is_first_page && page.is_last_page);
}

#[test]
fn empty_results_are_flagged_empty() {
    let page = Page::from_envelope(json!([])).unwrap();
    assert!(page.is_empty);
    assert!(page.is_last_page);
    assert_eq!(page.total_pages, 0);

    let page = Page::from_envelope(common::spring_page(vec![], 0, 0, 20)).unwrap();
    assert!(page.is_empty);
    assert!(page.is_first_page && page.is_last_page);
}

#[test]
fn unknown_envelope_is_rejected() {
    let err = Page::from_envelope(json!({"items": []})).unwrap_err();
    assert!(matches!(err, PimError::InvalidArgument(_)));
    assert!(Page::from_envelope(json!("nope")).is_err());
}

#[test]
fn decode_items_into_models() {
    let page = Page::from_envelope(json!({
        "content": [{"id": 4, "name": "Chairs", "slug": "chairs", "parentId": 1, "order": 2}],
        "totalElements": 1,
        "totalPages": 1,
        "size": 20,
        "number": 0
    }))
    .unwrap();
    let typed: Page<Category> = page.decode().unwrap();
    assert_eq!(typed.items[0].parent_id, Some(1));
    assert_eq!(typed.items[0].order, 2);
    assert!(typed.items[0].active);
    assert_eq!(typed.total_items, 1);
}

#[test]
fn canonical_shape_serializes_camel_case() {
    let value = serde_json::to_value(Page::single(vec![1, 2])).unwrap();
    assert_eq!(value["totalItems"], 2);
    assert_eq!(value["pageIndex"], 0);
    assert_eq!(value["isLastPage"], true);
    assert_eq!(value["isEmpty"], false);
}

#[test]
fn huge_page_numbers_do_not_overflow() {
    let page = Page::from_envelope(json!({
        "content": [],
        "totalElements": 0,
        "totalPages": 0,
        "size": 20,
        "number": 4294967295u64
    }))
    .unwrap();
    assert_eq!(page.page_index, u32::MAX);
    assert!(page.is_last_page);
    assert!(!page.is_first_page);

    let page = Page::from_envelope(json!({
        "data": [{"id": 1}],
        "total": 1u64 << 40,
        "page": 1u64 << 33,
        "size": 1
    }))
    .unwrap();
    assert_eq!(page.page_index, u32::MAX);
    assert_eq!(page.total_pages, u32::MAX);
    assert!(page.is_last_page);
}
