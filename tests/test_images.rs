//! Product images and attributes: ordering, swaps and sub-resource CRUD.

mod common;

use common::{image, product_json, spring_page, MockTransport};
use pim_admin_sdk::models::{AttributeInput, ImageInput, ProductAttribute, ProductImage};
use pim_admin_sdk::ordering::{self, Ordered};
use pim_admin_sdk::PimError;
use reqwest::Method;
use serde_json::{json, Value};

fn images_json(images: &[ProductImage]) -> Value {
    serde_json::to_value(images).unwrap()
}

fn attribute(id: i64, key: &str, value: &str) -> ProductAttribute {
    ProductAttribute {
        id,
        product_id: 10,
        key: key.into(),
        value: value.into(),
    }
}

// ---------------------------------------------------------------------------
// swap_plan
// ---------------------------------------------------------------------------

#[test]
fn swap_exchanges_orders_and_leaves_others() {
    let mut images = vec![image(1, 10, 3), image(2, 10, 7), image(3, 10, 12)];
    let plan = ordering::swap_plan(&images, 1, 2).unwrap().unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(plan.get(1), Some(7));
    assert_eq!(plan.get(2), Some(3));
    assert_eq!(plan.get(3), None);

    plan.apply(&mut images);
    let orders: Vec<(i64, i64)> = images.iter().map(|i| (i.item_id(), i.order())).collect();
    assert_eq!(orders, vec![(1, 7), (2, 3), (3, 12)]);
}

#[test]
fn swap_onto_self_is_no_op() {
    let images = vec![image(1, 10, 0)];
    assert!(ordering::swap_plan(&images, 1, 1).unwrap().is_none());
}

#[test]
fn swap_with_missing_item_is_not_found() {
    let images = vec![image(1, 10, 0), image(2, 10, 1)];
    let err = ordering::swap_plan(&images, 1, 9).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn swap_across_products_is_rejected() {
    let images = vec![image(1, 10, 0), image(2, 11, 1)];
    let err = ordering::swap_plan(&images, 1, 2).unwrap_err();
    assert!(matches!(err, PimError::InvalidArgument(_)));
}

#[test]
fn duplicate_keys_are_reported_once() {
    let attributes = vec![
        attribute(1, "color", "oak"),
        attribute(2, "width", "120"),
        attribute(3, "color", "walnut"),
        attribute(4, "color", "ash"),
    ];
    assert_eq!(ordering::duplicate_attribute_keys(&attributes), vec!["color"]);
    assert!(ordering::duplicate_attribute_keys(&attributes[..2]).is_empty());
}

// ---------------------------------------------------------------------------
// ImageQuery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_sorted_by_order() {
    let mock = MockTransport::new();
    mock.on(
        Method::GET,
        "products/10/images",
        images_json(&[image(3, 10, 5), image(1, 10, 2), image(2, 10, 2)]),
    );
    let sdk = common::sdk(&mock);

    let ids: Vec<i64> = sdk.images(10).list().await.unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn reorder_sends_swap_and_invalidates() {
    let mock = MockTransport::new();
    let current = [image(1, 10, 3), image(2, 10, 7), image(3, 10, 12)];
    mock.on(Method::GET, "products/10/images", images_json(&current));
    mock.on(Method::PUT, "products/10/images/reorder", Value::Null);
    let sdk = common::sdk(&mock);
    let images = sdk.images(10);

    let listed = images.list().await.unwrap();
    let plan = images.reorder(&listed, 1, 2).await.unwrap().unwrap();
    assert_eq!(plan.get(1), Some(7));

    let call = &mock.calls_to(Method::PUT, "products/10/images/reorder")[0];
    assert_eq!(call.body, Some(json!({ "1": 7, "2": 3 })));

    images.list().await.unwrap();
    assert_eq!(mock.count(Method::GET, "products/10/images"), 2);
}

#[tokio::test]
async fn reorder_onto_self_sends_nothing() {
    let mock = MockTransport::new();
    let sdk = common::sdk(&mock);
    let current = [image(1, 10, 0), image(2, 10, 1)];

    assert!(sdk.images(10).reorder(&current, 2, 2).await.unwrap().is_none());
    assert_eq!(mock.total_calls(), 0);
}

#[tokio::test]
async fn reorder_rejects_foreign_images() {
    let mock = MockTransport::new();
    let sdk = common::sdk(&mock);
    let current = [image(1, 10, 0), image(2, 11, 1)];

    let err = sdk.images(10).reorder(&current, 1, 2).await.unwrap_err();
    assert!(matches!(err, PimError::InvalidArgument(_)));
    assert_eq!(mock.total_calls(), 0);
}

#[tokio::test]
async fn create_appends_after_last_image() {
    let mock = MockTransport::new();
    mock.on(
        Method::GET,
        "products/10/images",
        images_json(&[image(1, 10, 3), image(2, 10, 7)]),
    );
    mock.on(
        Method::POST,
        "products/10/images",
        serde_json::to_value(image(4, 10, 8)).unwrap(),
    );
    let sdk = common::sdk(&mock);

    let created = sdk
        .images(10)
        .create(&ImageInput {
            url: "https://cdn.example.com/4.jpg".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.order, 8);

    let body = mock.calls_to(Method::POST, "products/10/images")[0].body.clone().unwrap();
    assert_eq!(body["order"], 8);
    assert!(body.get("altText").is_none());
}

#[tokio::test]
async fn first_image_gets_order_zero() {
    let mock = MockTransport::new();
    mock.on(Method::GET, "products/10/images", json!([]));
    mock.on(
        Method::POST,
        "products/10/images",
        serde_json::to_value(image(1, 10, 0)).unwrap(),
    );
    let sdk = common::sdk(&mock);

    sdk.images(10)
        .create(&ImageInput {
            url: "https://cdn.example.com/1.jpg".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let body = mock.calls_to(Method::POST, "products/10/images")[0].body.clone().unwrap();
    assert_eq!(body["order"], 0);
}

#[tokio::test]
async fn append_order_saturates_at_max() {
    let mock = MockTransport::new();
    mock.on(
        Method::GET,
        "products/10/images",
        images_json(&[image(1, 10, i64::MAX)]),
    );
    mock.on(
        Method::POST,
        "products/10/images",
        serde_json::to_value(image(2, 10, i64::MAX)).unwrap(),
    );
    let sdk = common::sdk(&mock);

    sdk.images(10)
        .create(&ImageInput {
            url: "https://cdn.example.com/2.jpg".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let body = mock.calls_to(Method::POST, "products/10/images")[0].body.clone().unwrap();
    assert_eq!(body["order"], i64::MAX);
}

#[tokio::test]
async fn image_mutation_invalidates_products() {
    let mock = MockTransport::new();
    mock.on(Method::GET, "products", spring_page(vec![product_json(10, "Desk", 5)], 1, 0, 20));
    mock.on(Method::DELETE, "products/10/images/2", Value::Null);
    let sdk = common::sdk(&mock);

    sdk.products().list_by_category(5, 0).await.unwrap();
    sdk.images(10).delete(2).await.unwrap();
    sdk.products().list_by_category(5, 0).await.unwrap();
    assert_eq!(mock.count(Method::GET, "products"), 2);
}

#[tokio::test]
async fn invalid_image_url_is_rejected() {
    let mock = MockTransport::new();
    let sdk = common::sdk(&mock);

    for url in ["", "not a url", "file:///tmp/a.jpg"] {
        let err = sdk
            .images(10)
            .create(&ImageInput {
                url: url.into(),
                order: Some(0),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PimError::Validation(_)), "url {:?}", url);
    }
    assert_eq!(mock.total_calls(), 0);
}

// ---------------------------------------------------------------------------
// AttributeQuery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn attribute_crud() {
    let mock = MockTransport::new();
    mock.on(
        Method::GET,
        "products/10/attributes",
        serde_json::to_value(vec![attribute(1, "color", "oak"), attribute(2, "color", "ash")]).unwrap(),
    );
    mock.on(
        Method::POST,
        "products/10/attributes",
        serde_json::to_value(attribute(3, "width", "120")).unwrap(),
    );
    mock.on(
        Method::PUT,
        "products/10/attributes/3",
        serde_json::to_value(attribute(3, "width", "140")).unwrap(),
    );
    mock.on(Method::DELETE, "products/10/attributes/3", Value::Null);
    let sdk = common::sdk(&mock);
    let attributes = sdk.attributes(10);

    // Duplicates are returned as-is; they are only logged.
    assert_eq!(attributes.list().await.unwrap().len(), 2);

    let input = AttributeInput {
        key: "width".into(),
        value: "120".into(),
    };
    assert_eq!(attributes.create(&input).await.unwrap().id, 3);
    let updated = attributes
        .update(
            3,
            &AttributeInput {
                value: "140".into(),
                ..input
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.value, "140");
    attributes.delete(3).await.unwrap();

    attributes.list().await.unwrap();
    assert_eq!(mock.count(Method::GET, "products/10/attributes"), 2);
}

#[tokio::test]
async fn attribute_without_key_is_rejected() {
    let mock = MockTransport::new();
    let sdk = common::sdk(&mock);

    let err = sdk
        .attributes(10)
        .create(&AttributeInput {
            key: " ".into(),
            value: "x".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PimError::Validation(_)));
    assert_eq!(mock.total_calls(), 0);
}
