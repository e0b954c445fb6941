//! Move (re-parent) validation over the flat category list.
//!
//! A category may not become its own parent, nor the child of one of its
//! descendants. Both checks are an ancestor walk from the candidate parent
//! towards the root. The walk is bounded: if the stored parent links
//! already contain a cycle it stops with [`PimError::DataIntegrity`]
//! instead of spinning.
//!
//! [`available_parents`] runs the walk once per category, so it costs
//! O(n · depth). That is fine for an admin catalog of up to a few thousand
//! categories; larger hierarchies should compute descendants from a built
//! tree instead.

use std::collections::{HashMap, HashSet};

use crate::error::{PimError, Result};
use crate::models::Category;

/// Id lookup that keeps the first record of a repeated id, like
/// [`build_tree`](crate::tree::build_tree).
fn index(all: &[Category]) -> HashMap<i64, &Category> {
    let mut by_id = HashMap::with_capacity(all.len());
    for c in all {
        by_id.entry(c.id).or_insert(c);
    }
    by_id
}

/// Ancestors of `id`, nearest first. A parent id that names no known
/// category ends the walk, the same way [`build_tree`](crate::tree::build_tree)
/// treats orphans as roots.
pub fn ancestors(all: &[Category], id: i64) -> Result<Vec<&Category>> {
    ancestors_in(&index(all), id)
}

fn ancestors_in<'a>(by_id: &HashMap<i64, &'a Category>, id: i64) -> Result<Vec<&'a Category>> {
    let start = by_id
        .get(&id)
        .ok_or_else(|| PimError::NotFound(format!("Unknown category: {}", id)))?;

    let mut out = Vec::new();
    let mut visited = HashSet::from([id]);
    let mut next = start.parent_id;
    while let Some(pid) = next {
        let Some(parent) = by_id.get(&pid) else {
            break;
        };
        if !visited.insert(pid) || out.len() >= by_id.len() {
            return Err(PimError::DataIntegrity(format!(
                "parent-link cycle detected while walking ancestors of category {} (at {})",
                id, pid
            )));
        }
        out.push(*parent);
        next = parent.parent_id;
    }
    Ok(out)
}

/// Breadcrumb path from the root down to `id` inclusive.
pub fn breadcrumb(all: &[Category], id: i64) -> Result<Vec<&Category>> {
    let by_id = index(all);
    let mut path = ancestors_in(&by_id, id)?;
    path.reverse();
    if let Some(node) = by_id.get(&id) {
        path.push(*node);
    }
    Ok(path)
}

/// Whether `candidate` may become the new parent of `moving_id`.
///
/// - `None` (move to root) is always valid, including when the category
///   is already a root.
/// - The category itself is never a valid parent.
/// - A descendant of the category is never a valid parent.
///
/// Fails with `NotFound` for an unknown candidate and `DataIntegrity`
/// when the candidate's ancestry already loops.
pub fn is_valid_new_parent(all: &[Category], moving_id: i64, candidate: Option<i64>) -> Result<bool> {
    is_valid_in(&index(all), moving_id, candidate)
}

fn is_valid_in(
    by_id: &HashMap<i64, &Category>,
    moving_id: i64,
    candidate: Option<i64>,
) -> Result<bool> {
    let Some(candidate) = candidate else {
        return Ok(true);
    };
    if candidate == moving_id {
        return Ok(false);
    }
    let chain = ancestors_in(by_id, candidate)?;
    Ok(!chain.iter().any(|c| c.id == moving_id))
}

/// Like [`is_valid_new_parent`], but a rejected move becomes an
/// `InvalidArgument` error so callers can bail out with `?` before any
/// request is made.
pub fn check_move(all: &[Category], moving_id: i64, candidate: Option<i64>) -> Result<()> {
    if is_valid_new_parent(all, moving_id, candidate)? {
        Ok(())
    } else {
        let target = candidate.map_or_else(|| "root".to_string(), |c| c.to_string());
        Err(PimError::InvalidArgument(format!(
            "Cannot move category {} under {}: the parent would be the category itself or one of its descendants",
            moving_id, target
        )))
    }
}

/// Every category that `moving_id` could be moved under: all categories
/// except itself and its descendants, in input order.
///
/// A candidate whose own ancestry loops is left out and logged; a cycle
/// elsewhere in the catalog does not block the move. Repeated ids are
/// listed once.
pub fn available_parents(all: &[Category], moving_id: i64) -> Result<Vec<&Category>> {
    let by_id = index(all);
    let mut seen = HashSet::with_capacity(all.len());
    let mut out = Vec::with_capacity(all.len());
    for c in all {
        if !seen.insert(c.id) {
            continue;
        }
        match is_valid_in(&by_id, moving_id, Some(c.id)) {
            Ok(true) => out.push(c),
            Ok(false) => {}
            Err(PimError::DataIntegrity(msg)) => {
                tracing::warn!(candidate = c.id, moving_id, %msg, "skipping parent candidate with looping ancestry");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}
