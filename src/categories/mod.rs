//! Block categories and classification
//!
//! This module defines the closed set of semantic block kinds, the legacy
//! `blockType` migration table, and the keyword-based inference fallback.

pub mod inference;
pub mod migration;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use inference::infer_category;
pub use migration::{default_migrations, MigrationRule};

/// Block category enumeration
///
/// Every block resolves to exactly one category. Categories are the key for
/// compatibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockCategory {
    /// Conversation triggers (message received, follow, postback, ...)
    Event,
    /// Messages sent back to the user
    Reply,
    /// Branching, looping and waiting
    Control,
    /// Variables and bot configuration
    Setting,
    /// Flex bubble / carousel
    FlexContainer,
    /// Flex text, image, button, icon
    FlexContent,
    /// Flex box, separator, spacer
    FlexLayout,
}

impl BlockCategory {
    /// All categories, in rule-table order.
    pub const ALL: [BlockCategory; 7] = [
        BlockCategory::Event,
        BlockCategory::Reply,
        BlockCategory::Control,
        BlockCategory::Setting,
        BlockCategory::FlexContainer,
        BlockCategory::FlexContent,
        BlockCategory::FlexLayout,
    ];

    /// Wire identifier (`"flex-container"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockCategory::Event => "event",
            BlockCategory::Reply => "reply",
            BlockCategory::Control => "control",
            BlockCategory::Setting => "setting",
            BlockCategory::FlexContainer => "flex-container",
            BlockCategory::FlexContent => "flex-content",
            BlockCategory::FlexLayout => "flex-layout",
        }
    }

    /// Get a human-readable name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            BlockCategory::Event => "Event",
            BlockCategory::Reply => "Reply",
            BlockCategory::Control => "Control",
            BlockCategory::Setting => "Setting",
            BlockCategory::FlexContainer => "Flex Container",
            BlockCategory::FlexContent => "Flex Content",
            BlockCategory::FlexLayout => "Flex Layout",
        }
    }

    /// Whether the category belongs to the Flex message family
    pub fn is_flex(&self) -> bool {
        matches!(
            self,
            BlockCategory::FlexContainer | BlockCategory::FlexContent | BlockCategory::FlexLayout
        )
    }
}

impl std::fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string is not one of the seven category identifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown block category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for BlockCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
