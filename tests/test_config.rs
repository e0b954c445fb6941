//! Configuration and SDK construction.

mod common;

use std::time::Duration;

use common::MockTransport;
use pim_admin_sdk::config::{self, SdkConfig};
use pim_admin_sdk::{HttpTransport, ListQueryCache, PimError, PimSdk};

#[test]
fn defaults() {
    let cfg = SdkConfig::default();
    assert_eq!(cfg.base_url, config::DEFAULT_BASE_URL);
    assert_eq!(cfg.timeout, Duration::from_secs(30));
    assert_eq!(cfg.page_size, 20);
    assert!(cfg.token.is_none());
}

// All environment handling lives in one test so parallel tests never
// observe a half-set environment.
#[test]
fn from_env_reads_and_falls_back() {
    std::env::set_var(config::ENV_BASE_URL, "https://pim.example.com/api");
    std::env::set_var(config::ENV_TOKEN, "secret");
    std::env::set_var(config::ENV_TIMEOUT_SECS, "5");
    std::env::set_var(config::ENV_PAGE_SIZE, "0");

    let cfg = SdkConfig::from_env();
    assert_eq!(cfg.base_url, "https://pim.example.com/api");
    assert_eq!(cfg.token.as_deref(), Some("secret"));
    assert_eq!(cfg.timeout, Duration::from_secs(5));
    assert_eq!(cfg.page_size, config::DEFAULT_PAGE_SIZE);

    std::env::set_var(config::ENV_TOKEN, "  ");
    std::env::set_var(config::ENV_TIMEOUT_SECS, "soon");
    std::env::set_var(config::ENV_PAGE_SIZE, "50");
    let cfg = SdkConfig::from_env();
    assert!(cfg.token.is_none());
    assert_eq!(cfg.timeout, config::DEFAULT_TIMEOUT);
    assert_eq!(cfg.page_size, 50);

    for key in [
        config::ENV_BASE_URL,
        config::ENV_TOKEN,
        config::ENV_TIMEOUT_SECS,
        config::ENV_PAGE_SIZE,
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn paths() {
    assert_eq!(config::category_path(4), "categories/4");
    assert_eq!(config::product_images_path(10), "products/10/images");
    assert_eq!(config::product_attributes_path(10), "products/10/attributes");
}

#[test]
fn http_transport_hides_token() {
    let transport = HttpTransport::new(
        "https://pim.example.com/api/",
        Some("secret".into()),
        Duration::from_secs(1),
    )
    .unwrap();
    assert_eq!(transport.base_url(), "https://pim.example.com/api");
    let debug = format!("{:?}", transport);
    assert!(!debug.contains("secret"));
    assert!(debug.contains("***"));
}

#[test]
fn builder_applies_settings() {
    let sdk = PimSdk::builder()
        .base_url("https://pim.example.com/api")
        .token("secret")
        .page_size(0)
        .build()
        .unwrap();
    assert_eq!(sdk.config().page_size, 1);
    assert_eq!(sdk.config().token.as_deref(), Some("secret"));
    assert!(sdk.to_string().contains("https://pim.example.com/api"));
}

#[tokio::test]
async fn sdks_can_share_one_cache() {
    let mock = MockTransport::new();
    mock.on(
        reqwest::Method::GET,
        "brands/all",
        serde_json::json!([{ "id": 1, "name": "Acme" }]),
    );
    let cache = ListQueryCache::new();
    let build = || {
        PimSdk::builder()
            .transport(mock.clone())
            .cache(cache.clone())
            .build()
            .unwrap()
    };
    let (a, b) = (build(), build());

    a.brands().list_all().await.unwrap();
    b.brands().list_all().await.unwrap();
    assert_eq!(mock.count(reqwest::Method::GET, "brands/all"), 1);

    b.logout().unwrap();
    assert!(a.cache().is_empty());
}

#[test]
fn not_found_helpers() {
    let api = PimError::Api {
        status: 404,
        status_text: "Not Found".into(),
        body: None,
    };
    assert!(api.is_not_found());
    assert_eq!(api.status(), Some(404));
    assert!(api.to_string().contains("no response body"));

    let shared = PimError::Shared(std::sync::Arc::new(api));
    assert!(shared.is_not_found());
    assert!(!PimError::DataIntegrity("x".into()).is_not_found());
}
