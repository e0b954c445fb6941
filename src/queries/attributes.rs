//! Product attribute sub-resource, scoped to one product.
//!
//! Attribute keys are meant to be unique per product, but nothing here
//! enforces it: duplicates are logged as a data-quality warning.

use reqwest::Method;

use crate::cache::QueryScope;
use crate::config::{self, FAMILY_PRODUCTS, FAMILY_PRODUCT_ATTRIBUTES};
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{AttributeInput, ProductAttribute};
use crate::ordering;

/// Query interface for the attributes of a single product.
pub struct AttributeQuery<'a> {
    conn: &'a Connection,
    product_id: i64,
    scope: Option<&'a QueryScope>,
}

impl<'a> AttributeQuery<'a> {
    pub fn new(conn: &'a Connection, product_id: i64) -> Self {
        Self {
            conn,
            product_id,
            scope: None,
        }
    }

    pub fn within(mut self, scope: &'a QueryScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    fn attribute_path(&self, id: i64) -> String {
        format!("{}/{}", config::product_attributes_path(self.product_id), id)
    }

    pub async fn list(&self) -> Result<Vec<ProductAttribute>> {
        let attributes: Vec<ProductAttribute> = self
            .conn
            .list_all_into(
                FAMILY_PRODUCT_ATTRIBUTES,
                &config::product_attributes_path(self.product_id),
                self.scope,
            )
            .await?;
        let dups = ordering::duplicate_attribute_keys(&attributes);
        if !dups.is_empty() {
            tracing::warn!(
                product_id = self.product_id,
                keys = ?dups,
                "product has duplicate attribute keys"
            );
        }
        Ok(attributes)
    }

    pub async fn create(&self, input: &AttributeInput) -> Result<ProductAttribute> {
        input.validate()?;
        self.conn
            .mutate_into(
                Method::POST,
                &config::product_attributes_path(self.product_id),
                serde_json::to_value(input)?,
                &[FAMILY_PRODUCT_ATTRIBUTES, FAMILY_PRODUCTS],
            )
            .await
    }

    pub async fn update(&self, id: i64, input: &AttributeInput) -> Result<ProductAttribute> {
        input.validate()?;
        self.conn
            .mutate_into(
                Method::PUT,
                &self.attribute_path(id),
                serde_json::to_value(input)?,
                &[FAMILY_PRODUCT_ATTRIBUTES, FAMILY_PRODUCTS],
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .mutate(
                Method::DELETE,
                &self.attribute_path(id),
                &[],
                None,
                &[FAMILY_PRODUCT_ATTRIBUTES, FAMILY_PRODUCTS],
            )
            .await?;
        Ok(())
    }
}
