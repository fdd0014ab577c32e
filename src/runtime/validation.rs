//! Compatibility evaluation engine
//!
//! Decides whether a block fits a workspace context given the blocks already
//! placed there. Checks run in a fixed order and the first terminal outcome
//! wins:
//!
//! 1. context validity
//! 2. category resolution
//! 3. rule lookup (with keyword inference when no rule exists)
//! 4. native context, then the per-context relaxations
//! 5. cardinality (`maxCount`)
//! 6. parent dependency (`requiresParent`, advisory only)
//! 7. default success
//!
//! Most non-native or incomplete placements are accepted with caveats; hard
//! rejection is reserved for an unrecognized context, an unrecognized category
//! that inference cannot place, a context mismatch with no relaxation, and a
//! cardinality violation.

use tracing::{debug, warn};

use crate::categories::{infer_category, BlockCategory};
use crate::core::{Block, CategoryTag, CompatibilityRule, RuleRegistry, ValidationVerdict, WorkspaceContext};

use super::timer::Timer;

/// Categories the Flex designer accepts even when not native to it.
const FLEX_RELAXED: [BlockCategory; 4] = [
    BlockCategory::FlexContainer,
    BlockCategory::FlexContent,
    BlockCategory::FlexLayout,
    BlockCategory::Control,
];

/// Stateless evaluator over a shared rule registry
#[derive(Clone, Default)]
pub struct CompatibilityEngine {
    registry: RuleRegistry,
}

impl CompatibilityEngine {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Resolve a block's category (explicit → migrated → `setting`)
    pub fn resolve_category(&self, block: &Block) -> CategoryTag {
        self.registry.resolve(block)
    }

    /// Evaluate a block against a raw context string as received on the wire.
    pub fn check(&self, block: &Block, context: &str, existing: &[Block]) -> ValidationVerdict {
        match context.parse::<WorkspaceContext>() {
            Ok(ctx) => self.evaluate(block, ctx, existing),
            Err(err) => {
                warn!(context, "rejecting block: {}", err);
                invalid_context()
            }
        }
    }

    /// Evaluate every block independently against one context and snapshot.
    ///
    /// Batch members never see each other as placed.
    pub fn check_batch(
        &self,
        blocks: &[Block],
        context: &str,
        existing: &[Block],
    ) -> Vec<ValidationVerdict> {
        blocks
            .iter()
            .map(|block| self.check(block, context, existing))
            .collect()
    }

    /// Evaluate a block in a known context
    pub fn evaluate(
        &self,
        block: &Block,
        context: WorkspaceContext,
        existing: &[Block],
    ) -> ValidationVerdict {
        let timer = Timer::now();
        let category = self.resolve_category(block);

        let verdict = match self.registry.rule_for(&category) {
            Some(rule) => self.evaluate_with_rule(&rule, context, existing),
            None => evaluate_without_rule(block, &category),
        };

        debug!(
            %category,
            block_type = block.label(),
            %context,
            is_valid = verdict.is_valid,
            elapsed_ms = timer.elapsed_ms(),
            "evaluated block"
        );

        verdict
    }

    fn evaluate_with_rule(
        &self,
        rule: &CompatibilityRule,
        context: WorkspaceContext,
        existing: &[Block],
    ) -> ValidationVerdict {
        let category = rule.category;

        if !rule.is_native(context) {
            return relax(rule, context);
        }

        if let Some(max) = rule.restrictions.max_count {
            let count = self.count_of(category, existing);
            if count >= max {
                return ValidationVerdict::reject(format!(
                    "Only {} {} block(s) can be placed in one workspace",
                    max,
                    category.display_name()
                ))
                .with_suggestions([format!(
                    "Remove the existing {} block before adding another one",
                    category.display_name()
                )]);
            }
        }

        if let Some(parents) = &rule.restrictions.requires_parent {
            if !self.any_of(parents, existing) {
                return missing_parent(category, parents, context);
            }
        }

        ValidationVerdict::accept(format!(
            "{} blocks are compatible with the {}",
            category.display_name(),
            context.tab_name()
        ))
    }

    fn count_of(&self, category: BlockCategory, existing: &[Block]) -> usize {
        existing
            .iter()
            .filter(|b| self.resolve_category(b).known() == Some(category))
            .count()
    }

    fn any_of(&self, parents: &[BlockCategory], existing: &[Block]) -> bool {
        existing.iter().any(|b| {
            self.resolve_category(b)
                .known()
                .is_some_and(|c| parents.contains(&c))
        })
    }
}

/// Verdict for a context string that is neither `logic` nor `flex`
fn invalid_context() -> ValidationVerdict {
    ValidationVerdict::reject("Invalid workspace context: the editor could not determine where this block is being placed")
        .with_suggestions(["Refresh the page and check that the editor finished loading"])
}

/// No rule for the resolved category: fall back to keyword inference.
fn evaluate_without_rule(block: &Block, category: &CategoryTag) -> ValidationVerdict {
    match infer_category(block.block_type.as_deref()) {
        Some(inferred) => ValidationVerdict::accept(format!(
            "No rule is configured for '{}'; treated as {} based on block type '{}'",
            category,
            inferred.display_name(),
            block.label()
        ))
        .with_suggestions([
            "This result was inferred from the block type name; check that the block behaves as expected",
        ]),
        None => ValidationVerdict::reject(format!(
            "Unrecognized block category '{}'",
            category
        ))
        .with_suggestions([
            format!("Check the definition of block type '{}'", block.label()),
            "Refresh the editor to reload block definitions".to_string(),
        ]),
    }
}

/// Outside the native contexts: apply the per-context relaxations or reject.
fn relax(rule: &CompatibilityRule, context: WorkspaceContext) -> ValidationVerdict {
    let category = rule.category;

    match context {
        WorkspaceContext::Flex if FLEX_RELAXED.contains(&category) => {
            ValidationVerdict::accept(format!(
                "The Flex designer uses a lenient policy and accepts {} blocks",
                category.display_name()
            ))
            .with_suggestions(["The Flex designer supports many kinds of blocks"])
        }
        WorkspaceContext::Logic if category == BlockCategory::FlexContainer => {
            ValidationVerdict::accept(
                "The Logic editor supports Flex containers for building rich replies",
            )
            .with_suggestions(["Use a Flex container to send a rich reply message"])
        }
        _ => ValidationVerdict::reject(format!(
            "{} blocks are not suited to the {}",
            category.display_name(),
            context.tab_name()
        ))
        .with_suggestions([
            format!("{} blocks can be used in: {}", category.display_name(), rule.allowed_in_label()),
            format!("Switch to the {} tab to use this block", context.other().tab_name()),
        ]),
    }
}

/// `requiresParent` unmet: advisory only, never a rejection.
fn missing_parent(
    category: BlockCategory,
    parents: &[BlockCategory],
    context: WorkspaceContext,
) -> ValidationVerdict {
    let parents_label = parents
        .iter()
        .map(|p| p.display_name())
        .collect::<Vec<_>>()
        .join(" or ");

    match context {
        WorkspaceContext::Flex => ValidationVerdict::accept(format!(
            "{} blocks can stand alone in the Flex designer",
            category.display_name()
        ))
        .with_suggestions([
            "The Flex designer allows flexible composition".to_string(),
            format!("Adding a companion {} block is recommended", parents_label),
        ]),
        WorkspaceContext::Logic => ValidationVerdict::accept(format!(
            "{} block placed. A companion {} block is recommended alongside it",
            category.display_name(),
            parents_label
        ))
        .with_suggestions([
            format!("Add a companion {} block", parents_label),
            "Block order can be adjusted later".to_string(),
        ]),
    }
}
