//! Research worker.

use crate::agent::{Agent, AgentProfile, AgentServices};
use crate::decision::{AgentResponse, TaskContext, ToolCall};
use crate::error::Result;
use async_trait::async_trait;

/// Worker for investigation and comparison tasks.
pub struct ResearcherAgent {
    profile: AgentProfile,
    services: AgentServices,
}

impl ResearcherAgent {
    /// Worker name, matching the router's researcher persona.
    pub const NAME: &'static str = "researcher";

    /// Create a researcher with the given collaborators.
    #[must_use]
    pub fn new(services: AgentServices) -> Self {
        Self {
            profile: AgentProfile::new(Self::NAME, "Investigates and compares options")
                .with_skill("search")
                .with_skill("web")
                .with_skill("docs"),
            services,
        }
    }
}

#[async_trait]
impl Agent for ResearcherAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn services(&self) -> &AgentServices {
        &self.services
    }

    async fn think(&self, task: &str, _context: &TaskContext) -> Result<AgentResponse> {
        if task.trim().is_empty() {
            return Ok(AgentResponse::ask_user(
                "Researcher received an empty task; what should be investigated?",
            ));
        }
        if let Some(remembered) = self.consult_memory(task).await {
            return Ok(remembered);
        }

        let call = ToolCall::new("search.query").with_arg("query", task);
        Ok(AgentResponse::act(call)
            .with_message(format!("Researching: {task}"))
            .with_confidence(0.6))
    }
}
