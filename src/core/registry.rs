//! Rule Registry - Central lookup for compatibility and migration rules
//!
//! The registry owns the two static tables the engine evaluates against:
//! - category → `CompatibilityRule` (one rule per category)
//! - legacy `blockType` → category (`MigrationRule`)
//!
//! Lookups are O(1). The registry is cheap to clone and safe to share between
//! worker tasks.

use crate::categories::migration::FALLBACK_CATEGORY;
use crate::categories::{default_migrations, BlockCategory, MigrationRule};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::block::{Block, CategoryTag};
use super::constraint::{default_rules, CompatibilityRule};

/// Rule registry shared by every engine instance
///
/// Tables live behind `Arc<RwLock<..>>` using parking_lot's RwLock; reads
/// vastly outnumber writes (writes only happen while configuring).
#[derive(Clone)]
pub struct RuleRegistry {
    rules: Arc<RwLock<HashMap<BlockCategory, CompatibilityRule>>>,
    migrations: Arc<RwLock<HashMap<String, BlockCategory>>>,
}

impl RuleRegistry {
    /// Create a registry with no rules and no migrations
    pub fn empty() -> Self {
        Self {
            rules: Arc::new(RwLock::new(HashMap::new())),
            migrations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry loaded with the compiled-in tables
    ///
    /// # Example
    /// ```
    /// use block_compat::core::registry::RuleRegistry;
    ///
    /// let registry = RuleRegistry::with_defaults();
    /// assert!(registry.validate().is_ok());
    /// ```
    pub fn with_defaults() -> Self {
        let rules = default_rules()
            .into_iter()
            .map(|rule| (rule.category, rule))
            .collect();
        let migrations = default_migrations()
            .into_iter()
            .map(|m| (m.block_type, m.category))
            .collect();

        Self {
            rules: Arc::new(RwLock::new(rules)),
            migrations: Arc::new(RwLock::new(migrations)),
        }
    }

    /// Register a compatibility rule
    ///
    /// # Returns
    /// * `Ok(())` if registration succeeds
    /// * `Err(RegistryError::DuplicateRule)` if the category already has a rule
    pub fn register_rule(&self, rule: CompatibilityRule) -> Result<(), RegistryError> {
        let mut rules = self.rules.write();

        if rules.contains_key(&rule.category) {
            return Err(RegistryError::DuplicateRule(rule.category));
        }

        rules.insert(rule.category, rule);
        Ok(())
    }

    /// Remove the rule for a category, returning it
    pub fn unregister_rule(&self, category: BlockCategory) -> Result<CompatibilityRule, RegistryError> {
        self.rules
            .write()
            .remove(&category)
            .ok_or(RegistryError::RuleNotFound(category))
    }

    /// Register a legacy block type mapping
    pub fn register_migration(&self, migration: MigrationRule) -> Result<(), RegistryError> {
        let mut migrations = self.migrations.write();

        if migrations.contains_key(&migration.block_type) {
            return Err(RegistryError::DuplicateMigration(migration.block_type));
        }

        migrations.insert(migration.block_type, migration.category);
        Ok(())
    }

    /// Rule for a category, if one is configured
    pub fn rule(&self, category: BlockCategory) -> Option<CompatibilityRule> {
        self.rules.read().get(&category).cloned()
    }

    /// Rule for a resolved tag; unrecognized tags never have one
    pub fn rule_for(&self, tag: &CategoryTag) -> Option<CompatibilityRule> {
        tag.known().and_then(|category| self.rule(category))
    }

    /// Exact-match lookup in the migration table
    pub fn migrate(&self, block_type: &str) -> Option<BlockCategory> {
        self.migrations.read().get(block_type).copied()
    }

    /// Resolve a block's category
    ///
    /// Explicit category wins; otherwise the migration table is consulted and
    /// anything unmapped falls back to `setting`.
    pub fn resolve(&self, block: &Block) -> CategoryTag {
        if let Some(tag) = &block.category {
            return tag.clone();
        }

        let category = block
            .block_type
            .as_deref()
            .and_then(|t| self.migrate(t))
            .unwrap_or(FALLBACK_CATEGORY);

        CategoryTag::Known(category)
    }

    /// All rules, in category order
    pub fn rules(&self) -> Vec<CompatibilityRule> {
        let mut rules: Vec<_> = self.rules.read().values().cloned().collect();
        rules.sort_by_key(|r| r.category);
        rules
    }

    /// All migrations, sorted by block type
    pub fn migrations(&self) -> Vec<MigrationRule> {
        let mut migrations: Vec<_> = self
            .migrations
            .read()
            .iter()
            .map(|(block_type, category)| MigrationRule::new(block_type.clone(), *category))
            .collect();
        migrations.sort_by(|a, b| a.block_type.cmp(&b.block_type));
        migrations
    }

    /// Number of configured rules
    pub fn rule_count(&self) -> usize {
        self.rules.read().len()
    }

    /// Check the configuration invariant: every category has a rule.
    ///
    /// Since `requiresParent` entries are themselves categories, this also
    /// guarantees that every recommended parent has a rule.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let rules = self.rules.read();

        let missing: Vec<_> = BlockCategory::ALL
            .iter()
            .copied()
            .filter(|c| !rules.contains_key(c))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::MissingRules(missing))
        }
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Registry error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate rule for category: {0}")]
    DuplicateRule(BlockCategory),

    #[error("No rule for category: {0}")]
    RuleNotFound(BlockCategory),

    #[error("Duplicate migration for block type: {0}")]
    DuplicateMigration(String),

    #[error("Categories without a rule: {0:?}")]
    MissingRules(Vec<BlockCategory>),
}
