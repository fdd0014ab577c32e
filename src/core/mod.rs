//! Core compatibility abstractions and types
//!
//! This module defines the block descriptor, workspace contexts, compatibility
//! rules, verdicts, and the rule registry that the engine evaluates against.

pub mod block;
pub mod constraint;
pub mod context;
pub mod registry;
pub mod verdict;

pub use block::{Block, CategoryTag};
pub use constraint::{CompatibilityRule, Restrictions};
pub use context::WorkspaceContext;
pub use registry::{RegistryError, RuleRegistry};
pub use verdict::ValidationVerdict;
