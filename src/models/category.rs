use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category — flat record as stored by the backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub description: Option<String>,
    /// `None` means the category is a root.
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default, alias = "displayOrder")]
    pub order: i64,
    #[serde(default = "default_active", alias = "isActive")]
    pub active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

fn default_active() -> bool {
    true
}

// ---------------------------------------------------------------------------
// CategoryNode — a category with its nested children
// ---------------------------------------------------------------------------

/// Recursive tree node.
///
/// Backend payloads name the child list either `children` or
/// `subCategories`; both deserialize into `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[serde(default, alias = "subCategories")]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.category.id
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::size).sum::<usize>()
    }
}

// ---------------------------------------------------------------------------
// CategoryInput — create/update payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    /// Derived from `name` when left empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub active: bool,
}

impl Default for CategoryInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            description: None,
            parent_id: None,
            order: None,
            active: true,
        }
    }
}

/// What happens to a deleted category's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteAction {
    /// Delete the whole subtree.
    Cascade,
    /// Move the children up to the deleted category's parent.
    #[default]
    ReassignToParent,
}

impl DeleteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteAction::Cascade => "cascade",
            DeleteAction::ReassignToParent => "reassign",
        }
    }
}
