//! Brand queries and mutations.

use reqwest::Method;

use crate::cache::QueryScope;
use crate::config::{self, FAMILY_BRANDS, FAMILY_PRODUCTS};
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Brand, BrandInput};
use crate::page::Page;
use crate::params::{ParamsBuilder, SortDirection};

/// Parameters for the paginated brand list.
#[derive(Debug, Clone, Default)]
pub struct SearchBrandsParams {
    pub keyword: Option<String>,
    pub sort: Option<(String, SortDirection)>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl SearchBrandsParams {
    fn to_builder(&self, default_size: u32) -> ParamsBuilder {
        let mut qb = ParamsBuilder::new();
        if let Some(ref kw) = self.keyword {
            qb.keyword(kw);
        }
        if let Some((ref field, dir)) = self.sort {
            qb.sort(field, dir);
        }
        qb.page(self.page.unwrap_or(0));
        qb.size(self.size.unwrap_or(default_size));
        qb
    }
}

/// Query interface for brands.
pub struct BrandQuery<'a> {
    conn: &'a Connection,
    scope: Option<&'a QueryScope>,
}

impl<'a> BrandQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, scope: None }
    }

    pub fn within(mut self, scope: &'a QueryScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub async fn list(&self, params: &SearchBrandsParams) -> Result<Page<Brand>> {
        let qb = params.to_builder(self.conn.page_size());
        self.conn
            .list_into(FAMILY_BRANDS, config::BRANDS_PATH, &qb, self.scope)
            .await
    }

    /// Brands whose name matches `keyword`, first page.
    pub async fn search(&self, keyword: &str) -> Result<Page<Brand>> {
        self.list(&SearchBrandsParams {
            keyword: Some(keyword.to_string()),
            ..Default::default()
        })
        .await
    }

    /// Every brand, unpaginated (for selection controls).
    pub async fn list_all(&self) -> Result<Vec<Brand>> {
        let path = format!("{}/all", config::BRANDS_PATH);
        self.conn
            .list_all_into(FAMILY_BRANDS, &path, self.scope)
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Brand>> {
        self.conn.fetch_optional(&config::brand_path(id)).await
    }

    pub async fn create(&self, input: &BrandInput) -> Result<Brand> {
        input.validate()?;
        let input = input.clone().with_derived_slug();
        self.conn
            .mutate_into(
                Method::POST,
                config::BRANDS_PATH,
                serde_json::to_value(&input)?,
                &[FAMILY_BRANDS],
            )
            .await
    }

    pub async fn update(&self, id: i64, input: &BrandInput) -> Result<Brand> {
        input.validate()?;
        let input = input.clone().with_derived_slug();
        self.conn
            .mutate_into(
                Method::PUT,
                &config::brand_path(id),
                serde_json::to_value(&input)?,
                &[FAMILY_BRANDS, FAMILY_PRODUCTS],
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .mutate(
                Method::DELETE,
                &config::brand_path(id),
                &[],
                None,
                &[FAMILY_BRANDS, FAMILY_PRODUCTS],
            )
            .await?;
        Ok(())
    }
}
