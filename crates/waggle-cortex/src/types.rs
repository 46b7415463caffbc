//! Decision records exchanged with the cortex.

use serde::{Deserialize, Serialize};

/// Decision recalled from the cortex for a similar past task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalledDecision {
    /// Skill names the past decision selected.
    pub selected_skills: Vec<String>,
    /// Confidence of the similarity match (0.0 - 1.0).
    pub confidence: f32,
    /// Reasoning recorded with the past decision, when available.
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Routing decision written back for future recall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Skill names selected for the task.
    pub selected_skills: Vec<String>,
    /// Why the decision was made.
    pub reasoning: String,
    /// Confidence in the decision (0.0 - 1.0).
    pub confidence: f32,
    /// Whether the decision was served from a query cache.
    #[serde(default)]
    pub from_cache: bool,
}

impl RoutingDecision {
    /// Create a decision record.
    #[must_use]
    pub fn new(
        selected_skills: Vec<String>,
        reasoning: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            selected_skills,
            reasoning: reasoning.into(),
            confidence,
            from_cache: false,
        }
    }

    /// Mark the decision as served from a cache.
    #[must_use]
    pub fn with_from_cache(mut self, from_cache: bool) -> Self {
        self.from_cache = from_cache;
        self
    }
}
