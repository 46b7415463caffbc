//! Exact-match in-memory cortex.
//!
//! The production cortex recalls decisions by semantic similarity and is
//! an external service. This implementation only matches verbatim query
//! strings; it exists for tests and for running the dispatch core
//! without the external service attached.

use crate::error::Result;
use crate::types::{RecalledDecision, RoutingDecision};
use crate::Cortex;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory [`Cortex`] keyed by the verbatim query string.
#[derive(Default)]
pub struct InMemoryCortex {
    decisions: RwLock<HashMap<String, RoutingDecision>>,
}

impl InMemoryCortex {
    /// Create an empty cortex.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored decisions.
    pub async fn len(&self) -> usize {
        self.decisions.read().await.len()
    }

    /// Whether no decisions are stored.
    pub async fn is_empty(&self) -> bool {
        self.decisions.read().await.is_empty()
    }
}

#[async_trait]
impl Cortex for InMemoryCortex {
    async fn recall(&self, query: &str) -> Result<Option<RecalledDecision>> {
        let decisions = self.decisions.read().await;
        let Some(decision) = decisions.get(query) else {
            return Ok(None);
        };
        debug!(confidence = decision.confidence, "exact-match recall hit");
        Ok(Some(RecalledDecision {
            selected_skills: decision.selected_skills.clone(),
            confidence: decision.confidence,
            reasoning: Some(decision.reasoning.clone()),
        }))
    }

    async fn learn(&self, query: &str, decision: &RoutingDecision) -> Result<()> {
        let mut decisions = self.decisions.write().await;
        decisions.insert(query.to_string(), decision.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_learn_then_recall() {
        let cortex = InMemoryCortex::new();
        let decision = RoutingDecision::new(
            vec!["git".to_string(), "testing".to_string()],
            "review work",
            0.85,
        );

        tokio_test::assert_ok!(cortex.learn("run the tests", &decision).await);
        assert_eq!(cortex.len().await, 1);

        let recalled = cortex.recall("run the tests").await.unwrap().unwrap();
        assert_eq!(recalled.selected_skills, decision.selected_skills);
        assert_eq!(recalled.confidence, 0.85);
        assert_eq!(recalled.reasoning.as_deref(), Some("review work"));
    }

    #[tokio::test]
    async fn test_recall_is_exact_match_only() {
        let cortex = InMemoryCortex::new();
        let decision = RoutingDecision::new(vec!["git".to_string()], "review", 0.9);
        cortex.learn("run the tests", &decision).await.unwrap();

        // A semantically identical but textually different query misses.
        assert!(cortex.recall("run the tests!").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_relearn_overwrites() {
        let cortex = InMemoryCortex::new();
        let first = RoutingDecision::new(vec!["git".to_string()], "first", 0.5);
        let second = RoutingDecision::new(vec!["code".to_string()], "second", 0.7);

        cortex.learn("task", &first).await.unwrap();
        cortex.learn("task", &second).await.unwrap();

        assert_eq!(cortex.len().await, 1);
        let recalled = cortex.recall("task").await.unwrap().unwrap();
        assert_eq!(recalled.selected_skills, vec!["code"]);
    }
}
