//! Keyword-based category inference
//!
//! Last-resort classification used only when no compatibility rule exists for
//! a block's resolved category. Groups are checked in declaration order and
//! the first group with a matching keyword wins, so a type such as
//! `"image_message"` lands in `reply` rather than `flex-content`.

use super::BlockCategory;

/// Ordered keyword groups. Order is significant.
pub const KEYWORD_GROUPS: [(BlockCategory, &[&str]); 7] = [
    (BlockCategory::Event, &["event", "trigger"]),
    (BlockCategory::Reply, &["reply", "message", "send"]),
    (BlockCategory::Control, &["control", "if", "loop"]),
    (
        BlockCategory::FlexContainer,
        &["bubble", "carousel", "container"],
    ),
    (
        BlockCategory::FlexContent,
        &["text", "image", "button", "icon", "content"],
    ),
    (
        BlockCategory::FlexLayout,
        &["box", "separator", "spacer", "layout"],
    ),
    (BlockCategory::Setting, &["setting", "config"]),
];

/// Infer a category from a free-form block type.
///
/// Returns `None` when the type is missing or matches no keyword; callers
/// treat that as "cannot validate".
pub fn infer_category(block_type: Option<&str>) -> Option<BlockCategory> {
    let lowered = block_type?.to_lowercase();

    KEYWORD_GROUPS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(category, _)| *category)
}
