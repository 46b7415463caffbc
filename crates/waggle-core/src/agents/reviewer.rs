//! Review/QA worker.

use crate::agent::{Agent, AgentProfile, AgentServices};
use crate::decision::{AgentResponse, TaskContext, ToolCall};
use crate::error::Result;
use async_trait::async_trait;

/// Worker for commits, tests and other repository hygiene.
pub struct ReviewerAgent {
    profile: AgentProfile,
    services: AgentServices,
}

impl ReviewerAgent {
    /// Worker name, matching the router's reviewer persona.
    pub const NAME: &'static str = "reviewer";

    /// Create a reviewer with the given collaborators.
    #[must_use]
    pub fn new(services: AgentServices) -> Self {
        Self {
            profile: AgentProfile::new(Self::NAME, "Reviews changes, runs tests, manages git")
                .with_skill("git")
                .with_skill("testing")
                .with_skill("review"),
            services,
        }
    }
}

#[async_trait]
impl Agent for ReviewerAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn services(&self) -> &AgentServices {
        &self.services
    }

    async fn think(&self, task: &str, _context: &TaskContext) -> Result<AgentResponse> {
        if task.trim().is_empty() {
            return Ok(AgentResponse::ask_user(
                "Reviewer received an empty task; what should be checked?",
            ));
        }
        if let Some(remembered) = self.consult_memory(task).await {
            return Ok(remembered);
        }

        let task_lower = task.to_lowercase();
        let call = if task_lower.contains("commit") {
            ToolCall::new("git.commit").with_arg("message", task)
        } else if task_lower.contains("test") {
            ToolCall::new("tests.run").with_arg("scope", task)
        } else {
            // Inspecting repository state is the safe default for
            // anything else review-shaped.
            ToolCall::new("git.status")
        };

        Ok(AgentResponse::act(call)
            .with_message(format!("Reviewing: {task}"))
            .with_confidence(0.8))
    }
}
