//! Validation verdicts
//!
//! The engine's only output. Every verdict carries a reason the editor can
//! show to the user; suggestions are attached when there is something
//! actionable to say.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ValidationVerdict {
    /// Positive verdict
    pub fn accept(reason: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            reason: reason.into(),
            suggestions: None,
        }
    }

    /// Negative verdict
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
            suggestions: None,
        }
    }

    /// Attach suggestions
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = Some(suggestions.into_iter().map(Into::into).collect());
        self
    }

    /// Suggestions, empty when none were attached
    pub fn suggestions(&self) -> &[String] {
        self.suggestions.as_deref().unwrap_or(&[])
    }
}
