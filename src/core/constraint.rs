//! Compatibility rules and their restrictions
//!
//! A rule declares where a category is native (`allowedIn`) and what it
//! requires from the rest of the workspace: a cap on instances and, for
//! advisory purposes, a set of companion categories that should already be
//! present.

use serde::{Deserialize, Serialize};

use crate::categories::BlockCategory;

use super::context::WorkspaceContext;

/// Restrictions a category places on the workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restrictions {
    /// Maximum instances of this category per workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,
    /// Categories that should already exist among the sibling blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_parent: Option<Vec<BlockCategory>>,
}

impl Restrictions {
    pub fn is_empty(&self) -> bool {
        self.max_count.is_none() && self.requires_parent.is_none()
    }
}

/// Compatibility rule for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRule {
    /// The category this rule governs
    pub category: BlockCategory,
    /// Contexts where the category is native
    pub allowed_in: Vec<WorkspaceContext>,
    #[serde(default, skip_serializing_if = "Restrictions::is_empty")]
    pub restrictions: Restrictions,
}

impl CompatibilityRule {
    /// Create an unrestricted rule
    pub fn new(category: BlockCategory, allowed_in: impl Into<Vec<WorkspaceContext>>) -> Self {
        Self {
            category,
            allowed_in: allowed_in.into(),
            restrictions: Restrictions::default(),
        }
    }

    /// Cap the number of instances per workspace
    pub fn with_max_count(mut self, max: usize) -> Self {
        self.restrictions.max_count = Some(max);
        self
    }

    /// Recommend companion categories
    pub fn with_required_parents(mut self, parents: impl Into<Vec<BlockCategory>>) -> Self {
        self.restrictions.requires_parent = Some(parents.into());
        self
    }

    /// Whether `context` is a native surface for this category
    pub fn is_native(&self, context: WorkspaceContext) -> bool {
        self.allowed_in.contains(&context)
    }

    /// `allowedIn` as a readable list (`"logic, flex"`)
    pub fn allowed_in_label(&self) -> String {
        self.allowed_in
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The compiled-in rule table
pub fn default_rules() -> Vec<CompatibilityRule> {
    use BlockCategory::*;
    use WorkspaceContext::{Flex, Logic};

    vec![
        CompatibilityRule::new(Event, [Logic]).with_max_count(1),
        CompatibilityRule::new(Reply, [Logic]).with_required_parents([Event]),
        CompatibilityRule::new(Control, [Logic]).with_required_parents([Event]),
        CompatibilityRule::new(Setting, [Logic]),
        CompatibilityRule::new(FlexContainer, [Flex, Logic]),
        CompatibilityRule::new(FlexContent, [Flex]).with_required_parents([FlexContainer]),
        CompatibilityRule::new(FlexLayout, [Flex]).with_required_parents([FlexContainer]),
    ]
}
