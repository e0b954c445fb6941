//! Category queries and mutations.
//!
//! Moves and parent changes are validated against the current flat
//! category list before anything is sent: a move that would put a
//! category under itself or one of its descendants fails locally.

use reqwest::Method;
use serde_json::json;

use crate::cache::QueryScope;
use crate::config::{self, FAMILY_CATEGORIES, FAMILY_PRODUCTS};
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Category, CategoryInput, CategoryNode, DeleteAction};
use crate::ordering::{self, ReorderPlan};
use crate::page::Page;
use crate::params::{ParamsBuilder, SortDirection};
use crate::reparent;
use crate::tree::{self, CategoryForest};

// ---------------------------------------------------------------------------
// CategoryListParams
// ---------------------------------------------------------------------------

/// Filters for the paginated category list.
#[derive(Debug, Clone, Default)]
pub struct CategoryListParams {
    pub keyword: Option<String>,
    pub parent_id: Option<i64>,
    pub active: Option<bool>,
    pub sort: Option<(String, SortDirection)>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl CategoryListParams {
    fn to_builder(&self, default_size: u32) -> ParamsBuilder {
        let mut qb = ParamsBuilder::new();
        if let Some(ref kw) = self.keyword {
            qb.keyword(kw);
        }
        qb.opt("parentId", self.parent_id);
        qb.opt("active", self.active);
        if let Some((ref field, dir)) = self.sort {
            qb.sort(field, dir);
        }
        qb.page(self.page.unwrap_or(0));
        qb.size(self.size.unwrap_or(default_size));
        qb
    }
}

// ---------------------------------------------------------------------------
// CategoryQuery
// ---------------------------------------------------------------------------

/// Query interface for categories.
pub struct CategoryQuery<'a> {
    conn: &'a Connection,
    scope: Option<&'a QueryScope>,
}

impl<'a> CategoryQuery<'a> {
    /// Create a new `CategoryQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, scope: None }
    }

    /// Tie cached reads to a consumer's lifetime.
    pub fn within(mut self, scope: &'a QueryScope) -> Self {
        self.scope = Some(scope);
        self
    }

    // -- Reads -------------------------------------------------------------

    /// One page of categories.
    pub async fn list(&self, params: &CategoryListParams) -> Result<Page<Category>> {
        let qb = params.to_builder(self.conn.page_size());
        self.conn
            .list_into(FAMILY_CATEGORIES, config::CATEGORIES_PATH, &qb, self.scope)
            .await
    }

    /// Every category as a flat list.
    pub async fn list_all(&self) -> Result<Vec<Category>> {
        let path = format!("{}/all", config::CATEGORIES_PATH);
        self.conn
            .list_all_into(FAMILY_CATEGORIES, &path, self.scope)
            .await
    }

    /// The hierarchy as served by the nested tree endpoint.
    pub async fn tree(&self) -> Result<CategoryForest> {
        let path = format!("{}/tree", config::CATEGORIES_PATH);
        let nodes: Vec<CategoryNode> = self
            .conn
            .list_all_into(FAMILY_CATEGORIES, &path, self.scope)
            .await?;
        Ok(tree::from_nested(nodes))
    }

    /// The hierarchy rebuilt locally from the flat list.
    pub async fn build_tree(&self) -> Result<CategoryForest> {
        let all = self.list_all().await?;
        Ok(tree::build_tree(&all))
    }

    /// A single category, or `None` if the backend does not know the id.
    pub async fn get(&self, id: i64) -> Result<Option<Category>> {
        self.conn.fetch_optional(&config::category_path(id)).await
    }

    /// Categories `id` may be moved under: everything except itself and
    /// its descendants.
    pub async fn available_parents(&self, id: i64) -> Result<Vec<Category>> {
        let all = self.list_all().await?;
        let parents = reparent::available_parents(&all, id)?;
        Ok(parents.into_iter().cloned().collect())
    }

    // -- Mutations ---------------------------------------------------------

    pub async fn create(&self, input: &CategoryInput) -> Result<Category> {
        input.validate()?;
        let input = input.clone().with_derived_slug();
        self.conn
            .mutate_into(
                Method::POST,
                config::CATEGORIES_PATH,
                serde_json::to_value(&input)?,
                &[FAMILY_CATEGORIES],
            )
            .await
    }

    /// Replace a category. A changed `parent_id` is validated like a move.
    pub async fn update(&self, id: i64, input: &CategoryInput) -> Result<Category> {
        input.validate()?;
        if input.parent_id.is_some() {
            let all = self.list_all().await?;
            reparent::check_move(&all, id, input.parent_id)?;
        }
        let input = input.clone().with_derived_slug();
        self.conn
            .mutate_into(
                Method::PUT,
                &config::category_path(id),
                serde_json::to_value(&input)?,
                &[FAMILY_CATEGORIES],
            )
            .await
    }

    /// Delete a category; `action` decides what happens to its children.
    pub async fn delete(&self, id: i64, action: DeleteAction) -> Result<()> {
        let params = [("action".to_string(), action.as_str().to_string())];
        self.conn
            .mutate(
                Method::DELETE,
                &config::category_path(id),
                &params,
                None,
                &[FAMILY_CATEGORIES, FAMILY_PRODUCTS],
            )
            .await?;
        Ok(())
    }

    /// Re-parent `id` under `new_parent` (`None` = root).
    ///
    /// `all` is the flat category list the user is looking at. The move is
    /// checked against it and rejected locally when it would create a
    /// cycle; no request is sent in that case.
    pub async fn move_to(
        &self,
        all: &[Category],
        id: i64,
        new_parent: Option<i64>,
    ) -> Result<Category> {
        reparent::check_move(all, id, new_parent)?;
        self.conn
            .mutate_into(
                Method::PUT,
                &format!("{}/move", config::category_path(id)),
                json!({ "parentId": new_parent }),
                &[FAMILY_CATEGORIES],
            )
            .await
    }

    /// Swap the display order of two sibling categories.
    ///
    /// Returns `None`, without sending anything, when a category is dropped
    /// onto itself.
    pub async fn reorder(
        &self,
        siblings: &[Category],
        dragged: i64,
        target: i64,
    ) -> Result<Option<ReorderPlan>> {
        let Some(plan) = ordering::swap_plan(siblings, dragged, target)? else {
            return Ok(None);
        };
        self.conn
            .mutate(
                Method::PUT,
                &format!("{}/reorder", config::CATEGORIES_PATH),
                &[],
                Some(serde_json::to_value(&plan)?),
                &[FAMILY_CATEGORIES],
            )
            .await?;
        Ok(Some(plan))
    }
}
