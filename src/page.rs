//! Canonical pagination envelope.
//!
//! The backend answers list requests in more than one shape:
//!
//! - `{ "data": [...], "total", "page", "size", "totalPages" }`
//! - `{ "content": [...], "totalElements", "totalPages", "size", "number" }`
//! - a bare JSON array for unpaginated endpoints
//!
//! [`Page::from_envelope`] maps each of them to [`Page`] once, at the
//! boundary. Page indexes are zero-based in every shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PimError, Result};

/// One page of a list result in the SDK's canonical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page_index: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub is_empty: bool,
}

impl<T> Page<T> {
    /// Assemble a page and derive the first/last/empty flags.
    ///
    /// A missing `total_pages` is computed from `total_items / page_size`.
    pub fn new(
        items: Vec<T>,
        total_items: u64,
        page_index: u32,
        page_size: u32,
        total_pages: Option<u32>,
    ) -> Self {
        let total_pages = total_pages.unwrap_or_else(|| {
            if page_size == 0 {
                u32::from(total_items > 0)
            } else {
                clamp_u32(total_items.div_ceil(u64::from(page_size)))
            }
        });
        let is_empty = items.is_empty();
        Self {
            is_first_page: page_index == 0,
            is_last_page: page_index.saturating_add(1) >= total_pages,
            is_empty,
            items,
            total_items,
            page_index,
            page_size,
            total_pages,
        }
    }

    /// Wrap a complete, unpaginated result as a single page.
    pub fn single(items: Vec<T>) -> Self {
        let len = items.len();
        Self::new(items, len as u64, 0, clamp_u32(len as u64), Some(u32::from(len > 0)))
    }

    /// Transform the items, keeping the paging metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page_index: self.page_index,
            page_size: self.page_size,
            total_pages: self.total_pages,
            is_first_page: self.is_first_page,
            is_last_page: self.is_last_page,
            is_empty: self.is_empty,
        }
    }
}

impl Page<Value> {
    /// Normalize any supported backend envelope.
    pub fn from_envelope(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Page::single(items)),
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = map.remove("content") {
                    let len = items.len() as u64;
                    let total = u64_field(&map, "totalElements").unwrap_or(len);
                    let size = u32_field(&map, "size").unwrap_or(clamp_u32(len));
                    let index = u32_field(&map, "number").unwrap_or(0);
                    let pages = u32_field(&map, "totalPages");
                    Ok(Page::new(items, total, index, size, pages))
                } else if let Some(Value::Array(items)) = map.remove("data") {
                    let len = items.len() as u64;
                    let total = u64_field(&map, "total").unwrap_or(len);
                    let size = u32_field(&map, "size").unwrap_or(clamp_u32(len));
                    let index = u32_field(&map, "page").unwrap_or(0);
                    let pages = u32_field(&map, "totalPages");
                    Ok(Page::new(items, total, index, size, pages))
                } else {
                    Err(PimError::InvalidArgument(
                        "Unrecognized page envelope: expected `content` or `data` array".into(),
                    ))
                }
            }
            other => Err(PimError::InvalidArgument(format!(
                "Unrecognized page envelope: {}",
                type_name(&other)
            ))),
        }
    }

    /// Deserialize every item into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Page<T>> {
        let items = self
            .items
            .iter()
            .map(|v| serde_json::from_value(v.clone()).map_err(PimError::from))
            .collect::<Result<Vec<T>>>()?;
        Ok(Page {
            items,
            total_items: self.total_items,
            page_index: self.page_index,
            page_size: self.page_size,
            total_pages: self.total_pages,
            is_first_page: self.is_first_page,
            is_last_page: self.is_last_page,
            is_empty: self.is_empty,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn u64_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<u64> {
    map.get(key).and_then(|v| v.as_u64())
}

/// Saturating `u64` to `u32` conversion for counts coming off the wire.
fn clamp_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn u32_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<u32> {
    u64_field(map, key).map(clamp_u32)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
