//! Fallback coordination worker.

use crate::agent::{Agent, AgentProfile, AgentServices};
use crate::decision::{context_keys, AgentResponse, TaskContext};
use crate::error::Result;
use async_trait::async_trait;

/// Default worker receiving tasks no specialist matched.
///
/// Arriving via handoff it closes the loop with a summary; arriving
/// directly it asks the user to narrow the request instead of guessing
/// a specialist.
pub struct OrchestratorAgent {
    profile: AgentProfile,
    services: AgentServices,
}

impl OrchestratorAgent {
    /// Worker name, matching the router's default persona.
    pub const NAME: &'static str = "orchestrator";

    /// Create the coordinator with the given collaborators.
    #[must_use]
    pub fn new(services: AgentServices) -> Self {
        Self {
            profile: AgentProfile::new(Self::NAME, "Coordinates tasks across workers")
                .with_skill("routing")
                .with_skill("planning")
                .with_skill("coordination"),
            services,
        }
    }
}

#[async_trait]
impl Agent for OrchestratorAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn services(&self) -> &AgentServices {
        &self.services
    }

    async fn think(&self, task: &str, context: &TaskContext) -> Result<AgentResponse> {
        if task.trim().is_empty() {
            return Ok(AgentResponse::ask_user(
                "Received an empty task; what needs doing?",
            ));
        }

        if context.contains_key(context_keys::HANDOFF_FROM) {
            let summary = self
                .get_task_brief(context)
                .map_or_else(|| task.to_string(), |brief| brief.task_description);
            return Ok(
                AgentResponse::finish(format!("Coordination complete for '{summary}'"))
                    .with_confidence(0.6),
            );
        }

        Ok(AgentResponse::ask_user(format!(
            "No specialist matched '{task}'. Describe the work in terms of coding, \
             review or research so it can be routed."
        )))
    }
}
