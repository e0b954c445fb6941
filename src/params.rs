//! Query-string builder for list endpoints.
//!
//! Collects filters, sorting and pagination for a list request. Empty
//! filter values are dropped so that "no keyword" and "blank keyword"
//! produce the same request and the same cache key. Builder methods
//! return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use pim_admin_sdk::params::{ParamsBuilder, SortDirection};
//! let params = ParamsBuilder::new()
//!     .eq("categoryId", 5)
//!     .keyword("chair")
//!     .sort("title", SortDirection::Asc)
//!     .page(2)
//!     .size(50)
//!     .build();
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

/// Sort direction for the `sort` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// Builds list-endpoint query parameters.
#[derive(Debug, Clone, Default)]
pub struct ParamsBuilder {
    filters: BTreeMap<String, String>,
    sort_cols: Vec<String>,
    page_val: u32,
    size_val: Option<u32>,
}

impl ParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-match filter. Blank values are ignored.
    pub fn eq(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        if value.trim().is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), value);
        }
        self
    }

    /// Add a filter only when a value is present.
    pub fn opt<T: ToString>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.eq(key, v);
        }
        self
    }

    /// Add the free-text `keyword` filter, trimmed.
    pub fn keyword(&mut self, keyword: &str) -> &mut Self {
        self.eq("keyword", keyword.trim())
    }

    /// Append a sort clause, rendered as `field,direction`.
    pub fn sort(&mut self, field: &str, direction: SortDirection) -> &mut Self {
        self.sort_cols.push(format!("{},{}", field, direction));
        self
    }

    /// Set the zero-based page index.
    pub fn page(&mut self, page: u32) -> &mut Self {
        self.page_val = page;
        self
    }

    /// Set the page size.
    pub fn size(&mut self, size: u32) -> &mut Self {
        self.size_val = Some(size);
        self
    }

    pub fn page_index(&self) -> u32 {
        self.page_val
    }

    pub fn page_size(&self) -> Option<u32> {
        self.size_val
    }

    /// Everything that identifies the result set except the page index,
    /// as a JSON object. Used as the filter part of a cache key.
    pub fn filter_value(&self) -> Value {
        let mut map: Map<String, Value> = self
            .filters
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        if !self.sort_cols.is_empty() {
            map.insert(
                "sort".to_string(),
                Value::Array(self.sort_cols.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(size) = self.size_val {
            map.insert("size".to_string(), Value::from(size));
        }
        Value::Object(map)
    }

    /// Build the final query-string pairs, including `page` and `size`.
    pub fn build(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for s in &self.sort_cols {
            out.push(("sort".to_string(), s.clone()));
        }
        out.push(("page".to_string(), self.page_val.to_string()));
        if let Some(size) = self.size_val {
            out.push(("size".to_string(), size.to_string()));
        }
        out
    }
}
