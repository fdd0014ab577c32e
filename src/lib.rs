//! Block Compat - Compatibility rule engine for the LINE bot visual builder
//!
//! This crate decides whether a block (event, reply, control, setting, or one
//! of the Flex message parts) may be placed in a workspace context, and
//! explains why. It exposes the engine directly, through a tagged
//! request/response protocol, and through an asynchronous worker pool.

pub mod categories;
pub mod config;
pub mod core;
pub mod runtime;
mod tests;

#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

// Re-export commonly used types
pub use categories::BlockCategory;
pub use config::WorkerConfig;
pub use crate::core::{Block, CategoryTag, RuleRegistry, ValidationVerdict, WorkspaceContext};
pub use runtime::{CompatibilityEngine, MessageHandler};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
