//! Product queries and mutations.

use reqwest::Method;

use crate::cache::QueryScope;
use crate::config::{self, FAMILY_BRANDS, FAMILY_PRODUCTS};
use crate::connection::Connection;
use crate::error::{PimError, Result};
use crate::models::{Product, ProductInput, ProductStatus, ProductStatusPatch};
use crate::page::Page;
use crate::params::{ParamsBuilder, SortDirection};

// ---------------------------------------------------------------------------
// SearchProductsParams
// ---------------------------------------------------------------------------

/// Parameters for the product list/search endpoint.
#[derive(Debug, Clone, Default)]
pub struct SearchProductsParams {
    pub keyword: Option<String>,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub status: Option<ProductStatus>,
    pub sort: Option<(String, SortDirection)>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl SearchProductsParams {
    fn to_builder(&self, default_size: u32) -> ParamsBuilder {
        let mut qb = ParamsBuilder::new();
        if let Some(ref kw) = self.keyword {
            qb.keyword(kw);
        }
        qb.opt("categoryId", self.category_id);
        qb.opt("brandId", self.brand_id);
        qb.opt("status", self.status.as_ref());
        if let Some((ref field, dir)) = self.sort {
            qb.sort(field, dir);
        }
        qb.page(self.page.unwrap_or(0));
        qb.size(self.size.unwrap_or(default_size));
        qb
    }
}

// ---------------------------------------------------------------------------
// ProductQuery
// ---------------------------------------------------------------------------

/// Query interface for products.
pub struct ProductQuery<'a> {
    conn: &'a Connection,
    scope: Option<&'a QueryScope>,
}

impl<'a> ProductQuery<'a> {
    /// Create a new `ProductQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, scope: None }
    }

    /// Tie cached reads to a consumer's lifetime.
    pub fn within(mut self, scope: &'a QueryScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Search products. All filters are optional; blank keywords are
    /// ignored.
    pub async fn search(&self, params: &SearchProductsParams) -> Result<Page<Product>> {
        let qb = params.to_builder(self.conn.page_size());
        self.conn
            .list_into(FAMILY_PRODUCTS, config::PRODUCTS_PATH, &qb, self.scope)
            .await
    }

    /// One page of products in a category.
    pub async fn list_by_category(&self, category_id: i64, page: u32) -> Result<Page<Product>> {
        self.search(&SearchProductsParams {
            category_id: Some(category_id),
            page: Some(page),
            ..Default::default()
        })
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Product>> {
        self.conn.fetch_optional(&config::product_path(id)).await
    }

    /// Look a product up by its barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> Result<Option<Product>> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(PimError::InvalidArgument("Barcode must not be empty".into()));
        }
        self.conn
            .fetch_optional(&config::product_barcode_path(barcode))
            .await
    }

    pub async fn create(&self, input: &ProductInput) -> Result<Product> {
        input.validate()?;
        self.conn
            .mutate_into(
                Method::POST,
                config::PRODUCTS_PATH,
                serde_json::to_value(input)?,
                &[FAMILY_PRODUCTS, FAMILY_BRANDS],
            )
            .await
    }

    pub async fn update(&self, id: i64, input: &ProductInput) -> Result<Product> {
        input.validate()?;
        self.conn
            .mutate_into(
                Method::PUT,
                &config::product_path(id),
                serde_json::to_value(input)?,
                &[FAMILY_PRODUCTS, FAMILY_BRANDS],
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .mutate(
                Method::DELETE,
                &config::product_path(id),
                &[],
                None,
                &[FAMILY_PRODUCTS, FAMILY_BRANDS],
            )
            .await?;
        Ok(())
    }

    /// Change only the lifecycle status.
    pub async fn update_status(&self, id: i64, status: ProductStatus) -> Result<Product> {
        let patch = ProductStatusPatch { status };
        patch.validate()?;
        self.conn
            .mutate_into(
                Method::PATCH,
                &format!("{}/status", config::product_path(id)),
                serde_json::to_value(&patch)?,
                &[FAMILY_PRODUCTS],
            )
            .await
    }
}
