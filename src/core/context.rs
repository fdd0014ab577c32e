//! Workspace contexts
//!
//! The two editing surfaces a block can be evaluated in.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Editing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceContext {
    /// Conversational flow editor
    Logic,
    /// Flex message layout designer
    Flex,
}

impl WorkspaceContext {
    pub const ALL: [WorkspaceContext; 2] = [WorkspaceContext::Logic, WorkspaceContext::Flex];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceContext::Logic => "logic",
            WorkspaceContext::Flex => "flex",
        }
    }

    /// Name of the editor tab the user sees
    pub fn tab_name(&self) -> &'static str {
        match self {
            WorkspaceContext::Logic => "Logic editor",
            WorkspaceContext::Flex => "Flex designer",
        }
    }

    /// The other surface
    pub fn other(&self) -> WorkspaceContext {
        match self {
            WorkspaceContext::Logic => WorkspaceContext::Flex,
            WorkspaceContext::Flex => WorkspaceContext::Logic,
        }
    }
}

impl std::fmt::Display for WorkspaceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown workspace context: {0}")]
pub struct UnknownContext(pub String);

impl FromStr for WorkspaceContext {
    type Err = UnknownContext;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logic" => Ok(WorkspaceContext::Logic),
            "flex" => Ok(WorkspaceContext::Flex),
            other => Err(UnknownContext(other.to_string())),
        }
    }
}
