//! Property-based tests using proptest.
//!
//! These tests verify invariants that must hold for *any* input, catching
//! edge cases that hand-written tests miss.

use proptest::prelude::*;

use crate::categories::{default_migrations, BlockCategory};
use crate::core::{Block, CategoryTag, RuleRegistry, WorkspaceContext};
use crate::runtime::CompatibilityEngine;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn any_category() -> impl Strategy<Value = BlockCategory> {
    prop::sample::select(BlockCategory::ALL.to_vec())
}

fn any_context() -> impl Strategy<Value = WorkspaceContext> {
    prop::sample::select(WorkspaceContext::ALL.to_vec())
}

/// Blocks with either an explicit category, a legacy type, or both
fn any_block() -> impl Strategy<Value = Block> {
    let block_type = prop_oneof![
        prop::sample::select(
            default_migrations()
                .into_iter()
                .map(|m| m.block_type)
                .collect::<Vec<_>>()
        ),
        "[a-z_]{1,16}",
    ];
    (prop::option::of(any_category()), prop::option::of(block_type)).prop_map(
        |(category, block_type)| Block {
            category: category.map(CategoryTag::Known),
            block_type,
        },
    )
}

fn is_migrated(block_type: &str) -> bool {
    default_migrations().iter().any(|m| m.block_type == block_type)
}

// ---------------------------------------------------------------------------
// Category resolution
// ---------------------------------------------------------------------------

proptest! {
    /// An explicit category is never overridden by `blockType`.
    #[test]
    fn explicit_category_wins(category in any_category(), block_type in ".*") {
        let registry = RuleRegistry::with_defaults();
        let block = Block::with_category(category).and_type(block_type);
        prop_assert_eq!(registry.resolve(&block), CategoryTag::Known(category));
    }

    /// Any `blockType` outside the migration table resolves to `setting`.
    #[test]
    fn unmapped_type_resolves_to_setting(block_type in "[A-Za-z0-9_ -]{0,24}") {
        prop_assume!(!is_migrated(&block_type));
        let registry = RuleRegistry::with_defaults();
        prop_assert_eq!(
            registry.resolve(&Block::with_type(block_type)),
            CategoryTag::Known(BlockCategory::Setting)
        );
    }

    /// Resolution with the default tables always lands on a ruled category.
    #[test]
    fn resolved_category_has_rule(block in any_block()) {
        let registry = RuleRegistry::with_defaults();
        let tag = registry.resolve(&block);
        prop_assert!(registry.rule_for(&tag).is_some());
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

proptest! {
    /// Every verdict carries a reason; every rejection carries suggestions.
    #[test]
    fn verdicts_are_explained(
        block in any_block(),
        context in any_context(),
        existing in prop::collection::vec(any_block(), 0..8),
    ) {
        let verdict = CompatibilityEngine::default().evaluate(&block, context, &existing);
        prop_assert!(!verdict.reason.is_empty());
        if !verdict.is_valid {
            prop_assert!(!verdict.suggestions().is_empty());
        }
    }

    /// Anything other than exactly `logic` or `flex` is rejected.
    #[test]
    fn unknown_context_always_invalid(
        block in any_block(),
        context in "[a-zA-Z ]{0,12}",
        existing in prop::collection::vec(any_block(), 0..4),
    ) {
        prop_assume!(context != "logic" && context != "flex");
        let verdict = CompatibilityEngine::default().check(&block, &context, &existing);
        prop_assert!(!verdict.is_valid);
    }

    /// Evaluation is deterministic.
    #[test]
    fn evaluation_is_deterministic(
        block in any_block(),
        context in any_context(),
        existing in prop::collection::vec(any_block(), 0..8),
    ) {
        let engine = CompatibilityEngine::default();
        prop_assert_eq!(
            engine.evaluate(&block, context, &existing),
            engine.evaluate(&block, context, &existing)
        );
    }

    /// A second event in the logic editor is always refused; the first never is.
    #[test]
    fn event_cap_in_logic(
        others in prop::collection::vec(
            prop::sample::select(vec![
                BlockCategory::Reply,
                BlockCategory::Control,
                BlockCategory::Setting,
                BlockCategory::FlexContainer,
            ]),
            0..10,
        ),
        extra_events in 1usize..4,
    ) {
        let engine = CompatibilityEngine::default();
        let event = Block::with_category(BlockCategory::Event);

        let mut existing: Vec<Block> = others.into_iter().map(Block::with_category).collect();
        prop_assert!(engine.evaluate(&event, WorkspaceContext::Logic, &existing).is_valid);

        existing.extend((0..extra_events).map(|_| Block::with_type("message")));
        prop_assert!(!engine.evaluate(&event, WorkspaceContext::Logic, &existing).is_valid);
    }

    /// Batch results line up one-to-one with individual checks.
    #[test]
    fn batch_equals_individual_checks(
        blocks in prop::collection::vec(any_block(), 0..12),
        existing in prop::collection::vec(any_block(), 0..6),
        context in prop_oneof![Just("logic"), Just("flex"), Just("other")],
    ) {
        let engine = CompatibilityEngine::default();
        let batch = engine.check_batch(&blocks, context, &existing);

        prop_assert_eq!(batch.len(), blocks.len());
        for (block, verdict) in blocks.iter().zip(&batch) {
            prop_assert_eq!(verdict, &engine.check(block, context, &existing));
        }
    }
}
