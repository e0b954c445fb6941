use std::env;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub const ENV_BASE_URL: &str = "PIM_API_BASE_URL";
pub const ENV_TOKEN: &str = "PIM_API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "PIM_API_TIMEOUT_SECS";
pub const ENV_PAGE_SIZE: &str = "PIM_PAGE_SIZE";

// ---------------------------------------------------------------------------
// Resource families (cache invalidation granularity)
// ---------------------------------------------------------------------------

pub const FAMILY_CATEGORIES: &str = "categories";
pub const FAMILY_PRODUCTS: &str = "products";
pub const FAMILY_BRANDS: &str = "brands";
pub const FAMILY_PRODUCT_IMAGES: &str = "product_images";
pub const FAMILY_PRODUCT_ATTRIBUTES: &str = "product_attributes";

// ---------------------------------------------------------------------------
// Endpoint paths
// ---------------------------------------------------------------------------

pub const CATEGORIES_PATH: &str = "categories";
pub const PRODUCTS_PATH: &str = "products";
pub const BRANDS_PATH: &str = "brands";

pub fn category_path(id: i64) -> String {
    format!("{}/{}", CATEGORIES_PATH, id)
}

pub fn product_path(id: i64) -> String {
    format!("{}/{}", PRODUCTS_PATH, id)
}

pub fn brand_path(id: i64) -> String {
    format!("{}/{}", BRANDS_PATH, id)
}

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode free text so it stays one path segment.
pub fn encode_segment(segment: &str) -> String {
    match segment {
        // Dot segments would be collapsed by URL resolution.
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => utf8_percent_encode(segment, PATH_SEGMENT).to_string(),
    }
}

pub fn product_barcode_path(barcode: &str) -> String {
    format!("{}/barcode/{}", PRODUCTS_PATH, encode_segment(barcode))
}

pub fn product_images_path(product_id: i64) -> String {
    format!("{}/images", product_path(product_id))
}

pub fn product_attributes_path(product_id: i64) -> String {
    format!("{}/attributes", product_path(product_id))
}

/// Runtime settings for the SDK, usually read from the environment.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    pub page_size: u32,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SdkConfig {
    /// Read `PIM_API_BASE_URL`, `PIM_API_TOKEN`, `PIM_API_TIMEOUT_SECS`
    /// and `PIM_PAGE_SIZE`, falling back to defaults for anything unset
    /// or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var(ENV_BASE_URL)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.base_url),
            token: env::var(ENV_TOKEN).ok().filter(|s| !s.trim().is_empty()),
            timeout: env::var(ENV_TIMEOUT_SECS)
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            page_size: env::var(ENV_PAGE_SIZE)
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.page_size),
        }
    }
}
