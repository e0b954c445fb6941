//! Query modules for the PIM SDK.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and exposes async methods
//! for one resource. List reads go through the shared query cache;
//! mutations invalidate the families they affect before returning.

pub mod attributes;
pub mod brands;
pub mod categories;
pub mod images;
pub mod products;

pub use attributes::AttributeQuery;
pub use brands::{BrandQuery, SearchBrandsParams};
pub use categories::{CategoryListParams, CategoryQuery};
pub use images::ImageQuery;
pub use products::{ProductQuery, SearchProductsParams};
