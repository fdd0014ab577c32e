//! Block descriptor and category tags
//!
//! A block arrives from the editor either with an explicit `category` or with
//! only a legacy `blockType`. Both are kept exactly as received; resolution
//! happens in the engine.

use serde::{Deserialize, Deserializer, Serialize};

use crate::categories::BlockCategory;

/// The category a block claims or resolves to.
///
/// Explicit categories outside the known set are kept as `Unrecognized`
/// instead of failing deserialization, so the engine can explain them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryTag {
    Known(BlockCategory),
    Unrecognized(String),
}

impl CategoryTag {
    pub fn known(&self) -> Option<BlockCategory> {
        match self {
            CategoryTag::Known(category) => Some(*category),
            CategoryTag::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryTag::Known(category) => category.as_str(),
            CategoryTag::Unrecognized(name) => name,
        }
    }
}

impl From<BlockCategory> for CategoryTag {
    fn from(category: BlockCategory) -> Self {
        CategoryTag::Known(category)
    }
}

impl std::fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block being validated, or one already placed in the workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Explicit category; takes precedence over `block_type`
    #[serde(
        default,
        deserialize_with = "lenient_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<CategoryTag>,
    /// Legacy free-form identifier (`"message"`, `"text_content"`, ...)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_type: Option<String>,
}

impl Block {
    /// Block with an explicit category
    pub fn with_category(category: BlockCategory) -> Self {
        Self {
            category: Some(CategoryTag::Known(category)),
            block_type: None,
        }
    }

    /// Block identified only by its legacy type
    pub fn with_type(block_type: impl Into<String>) -> Self {
        Self {
            category: None,
            block_type: Some(block_type.into()),
        }
    }

    /// Attach a legacy type to a block
    pub fn and_type(mut self, block_type: impl Into<String>) -> Self {
        self.block_type = Some(block_type.into());
        self
    }

    /// Label used in diagnostics
    pub fn label(&self) -> &str {
        self.block_type.as_deref().unwrap_or("(untyped)")
    }
}

/// Accept any JSON value for a string field; only strings are kept.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// `null` or absent means no explicit category. Anything else that is not one
/// of the category names is kept as `Unrecognized` with its JSON text.
fn lenient_category<'de, D>(deserializer: D) -> Result<Option<CategoryTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(match s.parse::<BlockCategory>() {
            Ok(category) => CategoryTag::Known(category),
            Err(_) => CategoryTag::Unrecognized(s),
        }),
        Some(other) => Some(CategoryTag::Unrecognized(other.to_string())),
    })
}
