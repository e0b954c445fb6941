//! Product image sub-resource, scoped to one product.

use reqwest::Method;

use crate::cache::QueryScope;
use crate::config::{self, FAMILY_PRODUCTS, FAMILY_PRODUCT_IMAGES};
use crate::connection::Connection;
use crate::error::{PimError, Result};
use crate::models::{ImageInput, ProductImage};
use crate::ordering::{self, ReorderPlan};

/// Query interface for the images of a single product.
pub struct ImageQuery<'a> {
    conn: &'a Connection,
    product_id: i64,
    scope: Option<&'a QueryScope>,
}

impl<'a> ImageQuery<'a> {
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

    fn image_path(&self, id: i64) -> String {
        format!("{}/{}", config::product_images_path(self.product_id), id)
    }

    /// The product's images in display order.
    pub async fn list(&self) -> Result<Vec<ProductImage>> {
        let mut images: Vec<ProductImage> = self
            .conn
            .list_all_into(
                FAMILY_PRODUCT_IMAGES,
                &config::product_images_path(self.product_id),
                self.scope,
            )
            .await?;
        images.sort_by_key(|img| (img.order, img.id));
        Ok(images)
    }

    /// Add an image. Without an explicit `order` it goes after the current
    /// last image.
    pub async fn create(&self, input: &ImageInput) -> Result<ProductImage> {
        input.validate()?;
        let mut input = input.clone();
        if input.order.is_none() {
            let current = self.list().await?;
            input.order = Some(current.iter().map(|i| i.order.saturating_add(1)).max().unwrap_or(0));
        }
        self.conn
            .mutate_into(
                Method::POST,
                &config::product_images_path(self.product_id),
                serde_json::to_value(&input)?,
                &[FAMILY_PRODUCT_IMAGES, FAMILY_PRODUCTS],
            )
            .await
    }

    pub async fn update(&self, id: i64, input: &ImageInput) -> Result<ProductImage> {
        input.validate()?;
        self.conn
            .mutate_into(
                Method::PUT,
                &self.image_path(id),
                serde_json::to_value(input)?,
                &[FAMILY_PRODUCT_IMAGES, FAMILY_PRODUCTS],
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .mutate(
                Method::DELETE,
                &self.image_path(id),
                &[],
                None,
                &[FAMILY_PRODUCT_IMAGES, FAMILY_PRODUCTS],
            )
            .await?;
        Ok(())
    }

    /// Handle a drop of image `dragged` onto image `target` by swapping
    /// their order values. Dropping an image onto itself sends nothing
    /// and returns `None`.
    pub async fn reorder(
        &self,
        images: &[ProductImage],
        dragged: i64,
        target: i64,
    ) -> Result<Option<ReorderPlan>> {
        if let Some(stray) = images.iter().find(|i| i.product_id != self.product_id) {
            return Err(PimError::InvalidArgument(format!(
                "Image {} belongs to product {}, not {}",
                stray.id, stray.product_id, self.product_id
            )));
        }
        let Some(plan) = ordering::swap_plan(images, dragged, target)? else {
            return Ok(None);
        };
        self.conn
            .mutate(
                Method::PUT,
                &format!("{}/reorder", config::product_images_path(self.product_id)),
                &[],
                Some(serde_json::to_value(&plan)?),
                &[FAMILY_PRODUCT_IMAGES, FAMILY_PRODUCTS],
            )
            .await?;
        Ok(Some(plan))
    }
}
