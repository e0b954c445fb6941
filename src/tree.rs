//! Category hierarchy: building, adapting and traversing the tree.
//!
//! [`build_tree`] turns the flat category list into a forest of
//! [`CategoryNode`]s. It never loops and never loses a record, even when
//! the stored parent links are broken:
//!
//! - a parent id that names no known category makes the record a root
//!   ([`TreeWarning::OrphanedParent`]);
//! - records caught in a parent-link cycle are unreachable from any root,
//!   so the cycle is cut at its lowest id, which becomes a root
//!   ([`TreeWarning::Cycle`]);
//! - a repeated id keeps its first record ([`TreeWarning::DuplicateId`]).
//!
//! Siblings are ordered by `order`, then by `id`.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::models::{Category, CategoryNode};

/// A structural problem found while building or adapting a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeWarning {
    /// `parent_id` names a category that is not in the list.
    OrphanedParent { id: i64, parent_id: i64 },
    /// These ids form a parent-link cycle; the first one was made a root.
    Cycle { ids: Vec<i64> },
    /// The id appeared more than once; later occurrences were dropped.
    DuplicateId { id: i64 },
    /// A nested payload declared a parent that disagrees with its position.
    ParentMismatch {
        id: i64,
        declared: Option<i64>,
        actual: Option<i64>,
    },
}

impl fmt::Display for TreeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeWarning::OrphanedParent { id, parent_id } => write!(
                f,
                "category {} references missing parent {}; shown as a root",
                id, parent_id
            ),
            TreeWarning::Cycle { ids } => {
                let ids: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
                write!(f, "parent-link cycle between categories [{}]", ids.join(", "))
            }
            TreeWarning::DuplicateId { id } => write!(f, "category {} appears more than once", id),
            TreeWarning::ParentMismatch {
                id,
                declared,
                actual,
            } => write!(
                f,
                "category {} declares parent {:?} but is nested under {:?}",
                id, declared, actual
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// CategoryForest
// ---------------------------------------------------------------------------

/// The root nodes of a category hierarchy plus any integrity warnings
/// raised while assembling it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryForest {
    pub roots: Vec<CategoryNode>,
    pub warnings: Vec<TreeWarning>,
}

impl CategoryForest {
    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.roots.iter().map(CategoryNode::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn flatten(&self) -> Vec<Category> {
        flatten(&self.roots)
    }

    pub fn levels(&self) -> Vec<LeveledCategory> {
        levels(&self.roots)
    }

    pub fn find(&self, id: i64) -> Option<&CategoryNode> {
        find(&self.roots, id)
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Build a forest from a flat list with parent pointers.
pub fn build_tree(categories: &[Category]) -> CategoryForest {
    let mut warnings = Vec::new();

    let mut seen = HashSet::with_capacity(categories.len());
    let records: Vec<&Category> = categories
        .iter()
        .filter(|c| {
            let first = seen.insert(c.id);
            if !first {
                warnings.push(TreeWarning::DuplicateId { id: c.id });
            }
            first
        })
        .collect();

    // Effective parent links: only edges to known, distinct categories.
    let mut parent_of: HashMap<i64, i64> = HashMap::new();
    let mut groups: HashMap<Option<i64>, Vec<&Category>> = HashMap::new();
    for c in &records {
        let key = match c.parent_id {
            Some(p) if p == c.id => None,
            Some(p) if seen.contains(&p) => {
                parent_of.insert(c.id, p);
                Some(p)
            }
            Some(p) => {
                warnings.push(TreeWarning::OrphanedParent {
                    id: c.id,
                    parent_id: p,
                });
                None
            }
            None => None,
        };
        groups.entry(key).or_default().push(c);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|c| (c.order, c.id));
    }

    let mut visited = HashSet::with_capacity(records.len());
    let mut roots = attach(None, &groups, &mut visited);

    // Self-parented records were grouped as roots; still report them.
    for c in &records {
        if c.parent_id == Some(c.id) {
            warnings.push(TreeWarning::Cycle { ids: vec![c.id] });
        }
    }

    // Whatever is left hangs off a cycle. Cut each cycle at its lowest id.
    let mut pending: Vec<&Category> = records
        .iter()
        .copied()
        .filter(|c| !visited.contains(&c.id))
        .collect();
    pending.sort_by_key(|c| c.id);
    for c in pending {
        if visited.contains(&c.id) {
            continue;
        }
        let cycle = find_cycle(c.id, &parent_of);
        let Some(&cut) = cycle.iter().min() else {
            continue;
        };
        let Some(record) = records.iter().find(|r| r.id == cut) else {
            continue;
        };
        let mut sorted = cycle.clone();
        sorted.sort_unstable();
        warnings.push(TreeWarning::Cycle { ids: sorted });

        visited.insert(cut);
        roots.push(CategoryNode {
            category: (*record).clone(),
            children: attach(Some(cut), &groups, &mut visited),
        });
    }
    roots.sort_by_key(|n| (n.category.order, n.category.id));

    for w in &warnings {
        tracing::warn!("category tree: {}", w);
    }

    CategoryForest { roots, warnings }
}

fn attach(
    parent: Option<i64>,
    groups: &HashMap<Option<i64>, Vec<&Category>>,
    visited: &mut HashSet<i64>,
) -> Vec<CategoryNode> {
    let Some(children) = groups.get(&parent) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(children.len());
    for c in children {
        if !visited.insert(c.id) {
            continue;
        }
        out.push(CategoryNode {
            category: (*c).clone(),
            children: attach(Some(c.id), groups, visited),
        });
    }
    out
}

/// Follow parent links from `start` until an id repeats; return the loop.
fn find_cycle(start: i64, parent_of: &HashMap<i64, i64>) -> Vec<i64> {
    let mut path: Vec<i64> = Vec::new();
    let mut position: HashMap<i64, usize> = HashMap::new();
    let mut cur = start;
    loop {
        if let Some(&at) = position.get(&cur) {
            return path[at..].to_vec();
        }
        position.insert(cur, path.len());
        path.push(cur);
        match parent_of.get(&cur) {
            Some(&p) => cur = p,
            // Reached a root: not a cycle after all.
            None => return Vec::new(),
        }
    }
}

/// Adapt a pre-nested payload from the tree endpoint.
///
/// Children get their `parent_id` rewritten to match their position
/// (reported as [`TreeWarning::ParentMismatch`] when it differed),
/// repeated ids are dropped together with their subtree, and siblings are
/// re-sorted. Root `parent_id`s are kept, since a payload may be a subtree.
pub fn from_nested(roots: Vec<CategoryNode>) -> CategoryForest {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    let roots = adopt(roots, None, &mut seen, &mut warnings);
    for w in &warnings {
        tracing::warn!("category tree: {}", w);
    }
    CategoryForest { roots, warnings }
}

fn adopt(
    nodes: Vec<CategoryNode>,
    parent: Option<i64>,
    seen: &mut HashSet<i64>,
    warnings: &mut Vec<TreeWarning>,
) -> Vec<CategoryNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for mut node in nodes {
        let id = node.category.id;
        if !seen.insert(id) {
            warnings.push(TreeWarning::DuplicateId { id });
            continue;
        }
        if parent.is_some() && node.category.parent_id != parent {
            warnings.push(TreeWarning::ParentMismatch {
                id,
                declared: node.category.parent_id,
                actual: parent,
            });
            node.category.parent_id = parent;
        }
        let children = std::mem::take(&mut node.children);
        node.children = adopt(children, Some(id), seen, warnings);
        out.push(node);
    }
    out.sort_by_key(|n| (n.category.order, n.category.id));
    out
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// A category paired with its depth in the tree (roots are depth 0).
#[derive(Debug, Clone, PartialEq)]
pub struct LeveledCategory {
    pub depth: usize,
    pub category: Category,
}

impl LeveledCategory {
    /// Name indented by depth, for flat selection controls.
    pub fn label(&self) -> String {
        format!("{}{}", "  ".repeat(self.depth), self.category.name)
    }
}

/// Pre-order depth-first list of every category in the forest.
pub fn flatten(roots: &[CategoryNode]) -> Vec<Category> {
    levels(roots).into_iter().map(|l| l.category).collect()
}

/// Same order as [`flatten`], with each node's depth.
pub fn levels(roots: &[CategoryNode]) -> Vec<LeveledCategory> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, &CategoryNode)> = roots.iter().rev().map(|n| (0, n)).collect();
    while let Some((depth, node)) = stack.pop() {
        out.push(LeveledCategory {
            depth,
            category: node.category.clone(),
        });
        stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
    }
    out
}

/// Locate a node anywhere in the forest.
pub fn find(roots: &[CategoryNode], id: i64) -> Option<&CategoryNode> {
    let mut stack: Vec<&CategoryNode> = roots.iter().collect();
    while let Some(node) = stack.pop() {
        if node.category.id == id {
            return Some(node);
        }
        stack.extend(node.children.iter());
    }
    None
}

/// Ids of every descendant of `id`, in pre-order. Empty if `id` is unknown.
pub fn descendant_ids(roots: &[CategoryNode], id: i64) -> Vec<i64> {
    find(roots, id)
        .map(|node| {
            flatten(&node.children)
                .into_iter()
                .map(|c| c.id)
                .collect()
        })
        .unwrap_or_default()
}
