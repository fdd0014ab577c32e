//! Legacy `blockType` → category migration table
//!
//! Blocks saved before categories existed only carry a free-form `blockType`.
//! These rules map the known identifiers onto the current categories.

use serde::{Deserialize, Serialize};

use super::BlockCategory;

/// Category assigned to any `blockType` the table does not know.
pub const FALLBACK_CATEGORY: BlockCategory = BlockCategory::Setting;

/// Maps one legacy block type onto its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRule {
    pub block_type: String,
    pub category: BlockCategory,
}

impl MigrationRule {
    pub fn new(block_type: impl Into<String>, category: BlockCategory) -> Self {
        Self {
            block_type: block_type.into(),
            category,
        }
    }
}

/// The compiled-in migration table
pub fn default_migrations() -> Vec<MigrationRule> {
    let groups: [(BlockCategory, &[&str]); 7] = [
        (
            BlockCategory::Event,
            &[
                "message",
                "follow",
                "unfollow",
                "postback",
                "join",
                "leave",
                "beacon",
                "member_joined",
                "member_left",
                "trigger",
            ],
        ),
        (
            BlockCategory::Reply,
            &[
                "text",
                "image",
                "video",
                "audio",
                "sticker",
                "location",
                "flex",
                "template",
                "imagemap",
                "quick_reply",
                "reply",
                "push",
            ],
        ),
        (
            BlockCategory::Control,
            &["if", "condition", "switch", "loop", "wait", "random"],
        ),
        (
            BlockCategory::Setting,
            &["variable", "user_property", "setting", "config"],
        ),
        (BlockCategory::FlexContainer, &["bubble", "carousel"]),
        (
            BlockCategory::FlexContent,
            &[
                "text_content",
                "image_content",
                "button",
                "icon",
                "span",
                "video_content",
            ],
        ),
        (
            BlockCategory::FlexLayout,
            &["box", "separator", "filler", "spacer"],
        ),
    ];

    groups
        .iter()
        .flat_map(|(category, types)| {
            types
                .iter()
                .map(move |block_type| MigrationRule::new(*block_type, *category))
        })
        .collect()
}
