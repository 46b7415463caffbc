//! Worker cognitive loop: think → decide → act.
//!
//! [`Agent`] carries the whole loop as provided methods so that `think`
//! is the only method a specialised worker overrides. Everything except
//! `run`/`think` degrades to a safe default instead of raising: a
//! malformed tool call or a failing skill engine becomes an error
//! *string*, and a broken cortex becomes a memory miss.

use crate::decision::{context_keys, AgentResponse, TaskBrief, TaskContext, ToolCall};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use waggle_cortex::{Cortex, RoutingDecision};
use waggle_skills::{SkillInvoker, ToolAddress};

/// Identity of a worker, fixed at construction.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    /// Unique worker name within a hive.
    pub name: String,
    /// Human-readable role description.
    pub role: String,
    /// Skill names the worker is expected to exercise.
    pub skills: Vec<String>,
}

impl AgentProfile {
    /// Create a profile with no skills.
    #[must_use]
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            skills: Vec::new(),
        }
    }

    /// Add a skill name.
    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }
}

/// Collaborators available to every worker.
#[derive(Clone, Default)]
pub struct AgentServices {
    /// Skill execution engine; without it workers cannot act.
    pub skills: Option<Arc<dyn SkillInvoker>>,
    /// Semantic memory; without it workers neither recall nor learn.
    pub cortex: Option<Arc<dyn Cortex>>,
}

impl AgentServices {
    /// Create an empty service set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a skill execution engine.
    #[must_use]
    pub fn with_skills(mut self, skills: Arc<dyn SkillInvoker>) -> Self {
        self.skills = Some(skills);
        self
    }

    /// Attach a semantic memory.
    #[must_use]
    pub fn with_cortex(mut self, cortex: Arc<dyn Cortex>) -> Self {
        self.cortex = Some(cortex);
        self
    }
}

/// A worker implementing the cognitive loop for one task domain.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The worker's fixed identity.
    fn profile(&self) -> &AgentProfile;

    /// The worker's collaborators.
    fn services(&self) -> &AgentServices;

    /// Worker-specific policy. The only method a specialised worker
    /// overrides; the default asks the user rather than guessing.
    async fn think(&self, task: &str, _context: &TaskContext) -> Result<AgentResponse> {
        Ok(AgentResponse::ask_user(format!(
            "Agent '{}' has no policy for this task and needs clarification: {task}",
            self.profile().name
        )))
    }

    /// Run the cognitive loop: call `think` and return its result
    /// unmodified. Logging wraps the call but never alters the value.
    ///
    /// # Errors
    ///
    /// Propagates whatever `think` raises; the caller decides whether
    /// to retry.
    async fn run(&self, task: &str, context: &TaskContext) -> Result<AgentResponse> {
        debug!(agent = %self.profile().name, task_len = task.len(), "cognitive loop started");
        let response = self.think(task, context).await?;
        debug!(
            agent = %self.profile().name,
            decision = ?response.decision,
            confidence = response.confidence,
            "cognitive loop finished"
        );
        Ok(response)
    }

    /// Execute a tool call through the skill engine.
    ///
    /// Execution failures never propagate: a malformed address, a
    /// missing engine, or a failing command all come back as an error
    /// string containing the tool name.
    async fn act(&self, call: &ToolCall) -> String {
        let address = match ToolAddress::parse(&call.tool) {
            Ok(address) => address,
            Err(e) => return format!("Error: {e}"),
        };
        let Some(invoker) = self.services().skills.clone() else {
            return format!("Error: no skill engine available to run '{}'", call.tool);
        };
        match invoker
            .invoke(address.skill(), address.operation(), &call.args)
            .await
        {
            Ok(output) => output,
            Err(e) => format!("Error: tool '{}' failed: {e}", call.tool),
        }
    }

    /// Ask the cortex whether a similar task was decided before.
    ///
    /// On a hit, synthesizes an Act response replaying the recalled
    /// decision with the recalled confidence. Every failure is logged
    /// and treated as a miss.
    async fn consult_memory(&self, query: &str) -> Option<AgentResponse> {
        let cortex = self.services().cortex.clone()?;
        match cortex.recall(query).await {
            Ok(Some(recalled)) => {
                debug!(
                    agent = %self.profile().name,
                    confidence = recalled.confidence,
                    "recalled a prior decision"
                );
                let message = recalled.reasoning.clone().unwrap_or_else(|| {
                    format!(
                        "Replaying a remembered decision covering skills [{}]",
                        recalled.selected_skills.join(", ")
                    )
                });
                let call = ToolCall::new("cortex.replay")
                    .with_arg("query", query)
                    .with_arg("selected_skills", recalled.selected_skills);
                Some(
                    AgentResponse::act(call)
                        .with_message(message)
                        .with_confidence(recalled.confidence),
                )
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    agent = %self.profile().name,
                    error = %e,
                    "memory recall failed, continuing without it"
                );
                None
            }
        }
    }

    /// Best-effort write-back of a finished response to the cortex.
    async fn learn_from_experience(&self, task: &str, response: &AgentResponse) {
        let Some(cortex) = self.services().cortex.clone() else {
            return;
        };
        let decision = RoutingDecision::new(
            self.profile().skills.clone(),
            response.message.clone(),
            response.confidence,
        );
        if let Err(e) = cortex.learn(task, &decision).await {
            warn!(agent = %self.profile().name, error = %e, "failed to persist experience");
        }
    }

    /// Extract the task brief from a handoff context, if present.
    ///
    /// Absent or malformed briefs yield `None`; a malformed brief is
    /// logged since it indicates a broken upstream caller.
    fn get_task_brief(&self, context: &TaskContext) -> Option<TaskBrief> {
        let raw = context.get(context_keys::TASK_BRIEF)?;
        match serde_json::from_value(raw.clone()) {
            Ok(brief) => Some(brief),
            Err(e) => {
                warn!(agent = %self.profile().name, error = %e, "malformed task brief in context");
                None
            }
        }
    }
}

/// Worker with no specialised policy; `think` always asks the user.
pub struct BaseAgent {
    profile: AgentProfile,
    services: AgentServices,
}

impl BaseAgent {
    /// Create an unspecialised worker.
    #[must_use]
    pub fn new(profile: AgentProfile, services: AgentServices) -> Self {
        Self { profile, services }
    }
}

#[async_trait]
impl Agent for BaseAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn services(&self) -> &AgentServices {
        &self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Decision;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use waggle_cortex::{InMemoryCortex, RecalledDecision};
    use waggle_skills::CommandRegistry;

    fn plain_agent() -> BaseAgent {
        BaseAgent::new(
            AgentProfile::new("drone", "does nothing in particular").with_skill("idle"),
            AgentServices::new(),
        )
    }

    fn agent_with_registry() -> BaseAgent {
        let mut registry = CommandRegistry::new();
        registry.register_fn("git", "status", |_| Ok("clean tree".to_string()));
        registry.register_fn("git", "commit", |_| {
            Err(waggle_skills::Error::Execution("nothing staged".to_string()))
        });
        BaseAgent::new(
            AgentProfile::new("drone", "test worker"),
            AgentServices::new().with_skills(Arc::new(registry)),
        )
    }

    #[tokio::test]
    async fn test_default_think_asks_user() {
        let agent = plain_agent();
        let response = agent.think("paint the shed", &TaskContext::new()).await.unwrap();

        assert_eq!(response.decision, Decision::AskUser);
        assert!(response.message.contains("drone"));
        assert!(response.message.contains("paint the shed"));
    }

    #[tokio::test]
    async fn test_run_returns_think_result_unmodified() {
        let agent = plain_agent();
        let thought = agent.think("task", &TaskContext::new()).await.unwrap();
        let ran = agent.run("task", &TaskContext::new()).await.unwrap();

        assert_eq!(ran.decision, thought.decision);
        assert_eq!(ran.message, thought.message);
        assert!(ran.timestamp > 0.0);
    }

    #[tokio::test]
    async fn test_act_executes_registered_tool() {
        let agent = agent_with_registry();
        let output = agent.act(&ToolCall::new("git.status")).await;
        assert_eq!(output, "clean tree");
    }

    #[tokio::test]
    async fn test_act_malformed_address_is_in_band() {
        let agent = agent_with_registry();

        let no_dot = agent.act(&ToolCall::new("gitstatus")).await;
        assert!(no_dot.starts_with("Error:"));
        assert!(no_dot.contains("gitstatus"));

        let two_dots = agent.act(&ToolCall::new("git.remote.add")).await;
        assert!(two_dots.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_act_execution_failure_is_in_band() {
        let agent = agent_with_registry();
        let output = agent.act(&ToolCall::new("git.commit")).await;

        assert!(output.starts_with("Error:"));
        assert!(output.contains("git.commit"));
        assert!(output.contains("nothing staged"));
    }

    #[tokio::test]
    async fn test_act_without_engine_is_in_band() {
        let agent = plain_agent();
        let output = agent.act(&ToolCall::new("git.status")).await;
        assert!(output.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_consult_memory_miss_and_hit() {
        let cortex = Arc::new(InMemoryCortex::new());
        let agent = BaseAgent::new(
            AgentProfile::new("drone", "test worker"),
            AgentServices::new().with_cortex(cortex.clone()),
        );

        assert!(agent.consult_memory("deploy the service").await.is_none());

        let decision =
            RoutingDecision::new(vec!["deploy".to_string()], "ship it via CI", 0.9);
        cortex.learn("deploy the service", &decision).await.unwrap();

        let recalled = agent.consult_memory("deploy the service").await.unwrap();
        assert_eq!(recalled.decision, Decision::Act);
        assert_eq!(recalled.confidence, 0.9);
        assert_eq!(recalled.message, "ship it via CI");
        let call = recalled.tool_call.unwrap();
        assert_eq!(call.tool, "cortex.replay");
    }

    #[tokio::test]
    async fn test_consult_memory_swallows_cortex_errors() {
        struct BrokenCortex;

        #[async_trait]
        impl Cortex for BrokenCortex {
            async fn recall(
                &self,
                _query: &str,
            ) -> waggle_cortex::Result<Option<RecalledDecision>> {
                Err(waggle_cortex::Error::Unavailable("offline".to_string()))
            }

            async fn learn(
                &self,
                _query: &str,
                _decision: &RoutingDecision,
            ) -> waggle_cortex::Result<()> {
                Err(waggle_cortex::Error::Unavailable("offline".to_string()))
            }
        }

        let agent = BaseAgent::new(
            AgentProfile::new("drone", "test worker"),
            AgentServices::new().with_cortex(Arc::new(BrokenCortex)),
        );

        assert!(agent.consult_memory("anything").await.is_none());
        // learn_from_experience must swallow the same failure
        let response = AgentResponse::finish("done");
        agent.learn_from_experience("anything", &response).await;
    }

    #[tokio::test]
    async fn test_learn_then_consult_roundtrip() {
        let cortex = Arc::new(InMemoryCortex::new());
        let agent = BaseAgent::new(
            AgentProfile::new("drone", "test worker").with_skill("git"),
            AgentServices::new().with_cortex(cortex.clone()),
        );

        let response = AgentResponse::finish("reviewed the branch").with_confidence(0.8);
        agent.learn_from_experience("review my branch", &response).await;

        let recalled = agent.consult_memory("review my branch").await.unwrap();
        assert_eq!(recalled.confidence, 0.8);
    }

    #[tokio::test]
    async fn test_get_task_brief() {
        let agent = plain_agent();

        // absent
        assert!(agent.get_task_brief(&TaskContext::new()).is_none());

        // present
        let brief = TaskBrief::new("fix flaky test").with_relevant_file("tests/io.rs");
        let mut context = TaskContext::new();
        context.insert(
            context_keys::TASK_BRIEF.to_string(),
            serde_json::to_value(&brief).unwrap(),
        );
        assert_eq!(agent.get_task_brief(&context), Some(brief));

        // malformed
        let mut broken: TaskContext = HashMap::new();
        broken.insert(
            context_keys::TASK_BRIEF.to_string(),
            serde_json::json!({"task_description": 42}),
        );
        assert!(agent.get_task_brief(&broken).is_none());
    }
}
