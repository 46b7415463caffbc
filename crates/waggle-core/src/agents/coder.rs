//! Coding worker.

use crate::agent::{Agent, AgentProfile, AgentServices};
use crate::decision::{AgentResponse, TaskContext, ToolCall};
use crate::error::Result;
use async_trait::async_trait;

/// Worker for implementation, refactoring and bug-fixing tasks.
pub struct CoderAgent {
    profile: AgentProfile,
    services: AgentServices,
}

impl CoderAgent {
    /// Worker name, matching the router's coder persona.
    pub const NAME: &'static str = "coder";

    /// Create a coder with the given collaborators.
    #[must_use]
    pub fn new(services: AgentServices) -> Self {
        Self {
            profile: AgentProfile::new(Self::NAME, "Implements, fixes and refactors code")
                .with_skill("code")
                .with_skill("editor")
                .with_skill("refactor"),
            services,
        }
    }
}

#[async_trait]
impl Agent for CoderAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn services(&self) -> &AgentServices {
        &self.services
    }

    async fn think(&self, task: &str, context: &TaskContext) -> Result<AgentResponse> {
        if task.trim().is_empty() {
            return Ok(AgentResponse::ask_user(
                "Coder received an empty task; what should be implemented?",
            ));
        }
        if let Some(remembered) = self.consult_memory(task).await {
            return Ok(remembered);
        }

        let task_lower = task.to_lowercase();
        let mut call = if task_lower.contains("refactor") {
            ToolCall::new("editor.refactor").with_arg("instructions", task)
        } else if task_lower.contains("fix") || task_lower.contains("debug") {
            ToolCall::new("editor.patch").with_arg("instructions", task)
        } else {
            ToolCall::new("editor.write").with_arg("instructions", task)
        };
        if let Some(brief) = self.get_task_brief(context) {
            if !brief.relevant_files.is_empty() {
                call = call.with_arg("files", brief.relevant_files);
            }
        }

        Ok(AgentResponse::act(call)
            .with_message(format!("Editing the workspace for: {task}"))
            .with_confidence(0.75))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{context_keys, Decision, TaskBrief};

    #[tokio::test]
    async fn test_refactor_tasks_use_refactor_operation() {
        let agent = CoderAgent::new(AgentServices::new());
        let response = agent
            .think("refactor the config loader", &TaskContext::new())
            .await
            .unwrap();

        assert_eq!(response.decision, Decision::Act);
        assert_eq!(response.tool_call.unwrap().tool, "editor.refactor");
    }

    #[tokio::test]
    async fn test_plain_tasks_use_write_operation() {
        let agent = CoderAgent::new(AgentServices::new());
        let response = agent
            .think("implement a retry helper", &TaskContext::new())
            .await
            .unwrap();

        assert_eq!(response.tool_call.unwrap().tool, "editor.write");
    }

    #[tokio::test]
    async fn test_brief_files_flow_into_the_call() {
        let agent = CoderAgent::new(AgentServices::new());
        let brief = TaskBrief::new("fix the parser").with_relevant_file("src/parser.rs");
        let mut context = TaskContext::new();
        context.insert(
            context_keys::TASK_BRIEF.to_string(),
            serde_json::to_value(&brief).unwrap(),
        );

        let response = agent.think("fix the parser", &context).await.unwrap();
        let call = response.tool_call.unwrap();
        assert_eq!(call.tool, "editor.patch");
        assert_eq!(
            call.args.get("files"),
            Some(&serde_json::json!(["src/parser.rs"]))
        );
    }

    #[tokio::test]
    async fn test_empty_task_asks_user() {
        let agent = CoderAgent::new(AgentServices::new());
        let response = agent.think("  ", &TaskContext::new()).await.unwrap();
        assert_eq!(response.decision, Decision::AskUser);
    }
}
