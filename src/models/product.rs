use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ProductStatus — open string enumeration
// ---------------------------------------------------------------------------

/// Product lifecycle status.
///
/// The label set belongs to the backend, so any string is accepted and
/// round-trips unchanged. The associated constants name the labels the
/// dashboard knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductStatus(String);

impl ProductStatus {
    pub const DRAFT: &'static str = "DRAFT";
    pub const ACTIVE: &'static str = "ACTIVE";
    pub const PUBLISHED: &'static str = "PUBLISHED";
    pub const ARCHIVED: &'static str = "ARCHIVED";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn draft() -> Self {
        Self::new(Self::DRAFT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the label is one of the well-known constants.
    pub fn is_known(&self) -> bool {
        [Self::DRAFT, Self::ACTIVE, Self::PUBLISHED, Self::ARCHIVED]
            .iter()
            .any(|k| k.eq_ignore_ascii_case(&self.0))
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        Self::draft()
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductStatus {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// ProductImage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub url: String,
    pub alt_text: Option<String>,
    /// Relative display position; values need not be contiguous.
    #[serde(default)]
    pub order: i64,
}

// ---------------------------------------------------------------------------
// ProductAttribute
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttribute {
    pub id: i64,
    pub product_id: i64,
    pub key: String,
    #[serde(default)]
    pub value: String,
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub barcode: String,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub status: ProductStatus,
    pub description: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Product {
    /// Images sorted by display order, ties broken by id.
    pub fn sorted_images(&self) -> Vec<&ProductImage> {
        let mut images: Vec<&ProductImage> = self.images.iter().collect();
        images.sort_by_key(|img| (img.order, img.id));
        images
    }

    /// Value of the first attribute with `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

// ---------------------------------------------------------------------------
// Input payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub title: String,
    pub barcode: String,
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<i64>,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStatusPatch {
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// Appended after the current last image when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeInput {
    pub key: String,
    pub value: String,
}
