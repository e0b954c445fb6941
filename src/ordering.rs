//! Drag-and-drop reordering of sibling items.
//!
//! A drop swaps the `order` values of the dragged item and the drop
//! target; no other sibling is renumbered. Order values only have to be
//! relatively ordered, so gaps and non-zero starts are fine.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{PimError, Result};
use crate::models::{Category, ProductAttribute, ProductImage};

/// Something that sits in an ordered sibling list.
pub trait Ordered {
    fn item_id(&self) -> i64;
    fn order(&self) -> i64;
    fn set_order(&mut self, order: i64);
    /// Items can only be reordered among siblings with the same owner.
    fn owner(&self) -> Option<i64>;
}

impl Ordered for ProductImage {
    fn item_id(&self) -> i64 {
        self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }

    fn owner(&self) -> Option<i64> {
        Some(self.product_id)
    }
}

impl Ordered for Category {
    fn item_id(&self) -> i64 {
        self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }

    fn owner(&self) -> Option<i64> {
        self.parent_id
    }
}

/// New order values keyed by item id, serialized as the reorder
/// endpoints expect: `{ "<id>": <order>, ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReorderPlan(BTreeMap<i64, i64>);

impl ReorderPlan {
    pub fn get(&self, id: i64) -> Option<i64> {
        self.0.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Apply the plan to local state. Items not named in the plan keep
    /// their order.
    pub fn apply<T: Ordered>(&self, items: &mut [T]) {
        for item in items.iter_mut() {
            if let Some(order) = self.get(item.item_id()) {
                item.set_order(order);
            }
        }
    }
}

/// Plan the swap for dropping `dragged` onto `target`.
///
/// Returns `Ok(None)` when an item is dropped onto itself: there is
/// nothing to send.
pub fn swap_plan<T: Ordered>(items: &[T], dragged: i64, target: i64) -> Result<Option<ReorderPlan>> {
    if dragged == target {
        return Ok(None);
    }
    let lookup = |id: i64| {
        items
            .iter()
            .find(|i| i.item_id() == id)
            .ok_or_else(|| PimError::NotFound(format!("Item {} is not in the list", id)))
    };
    let a = lookup(dragged)?;
    let b = lookup(target)?;
    if a.owner() != b.owner() {
        return Err(PimError::InvalidArgument(format!(
            "Items {} and {} belong to different owners and cannot be swapped",
            dragged, target
        )));
    }
    Ok(Some(ReorderPlan(BTreeMap::from([
        (a.item_id(), b.order()),
        (b.item_id(), a.order()),
    ]))))
}

/// Keys that occur on more than one attribute of the same product,
/// sorted. Duplicates are a data-quality issue the backend may not block.
pub fn duplicate_attribute_keys(attributes: &[ProductAttribute]) -> Vec<String> {
    let mut counts: HashMap<(i64, &str), usize> = HashMap::new();
    for a in attributes {
        *counts.entry((a.product_id, a.key.as_str())).or_default() += 1;
    }
    let mut dups: Vec<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|((_, key), _)| key.to_string())
        .collect();
    dups.sort();
    dups.dedup();
    dups
}
