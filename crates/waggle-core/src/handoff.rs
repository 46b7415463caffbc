//! Control transfer between workers.
//!
//! A handoff is a pure control transfer: the protocol builds the context
//! map, invokes the receiving worker and returns its result verbatim. It
//! performs no retries and no readiness checks; what happens next is
//! entirely the receiving worker's `think`.

use crate::agent::Agent;
use crate::decision::{context_keys, now_ts, AgentResponse, TaskBrief, TaskContext};
use crate::error::Result;
use serde_json::{json, Value};
use tracing::info;

/// Transfers an in-progress task from one worker to another.
pub struct HandoffProtocol;

impl HandoffProtocol {
    /// Transfer `task` from `from` to `to`, carrying `brief`.
    ///
    /// The receiving worker sees a context containing `handoff_from`,
    /// `handoff_timestamp`, the serialized `task_brief` and the
    /// `original_task`.
    ///
    /// # Errors
    ///
    /// Propagates whatever the receiving worker's `run` raises.
    pub async fn transfer(
        from: &dyn Agent,
        to: &dyn Agent,
        task: &str,
        brief: &TaskBrief,
    ) -> Result<AgentResponse> {
        let mut context = TaskContext::new();
        context.insert(
            context_keys::HANDOFF_FROM.to_string(),
            json!(from.profile().name),
        );
        context.insert(
            context_keys::HANDOFF_TIMESTAMP.to_string(),
            json!(now_ts()),
        );
        context.insert(
            context_keys::TASK_BRIEF.to_string(),
            serde_json::to_value(brief).unwrap_or(Value::Null),
        );
        context.insert(context_keys::ORIGINAL_TASK.to_string(), json!(task));

        info!(
            from = %from.profile().name,
            to = %to.profile().name,
            "transferring task"
        );
        to.run(task, &context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentProfile, AgentServices, BaseAgent};
    use crate::decision::Decision;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the context it was run with and returns a fixed response.
    struct CapturingAgent {
        profile: AgentProfile,
        services: AgentServices,
        seen: Mutex<Option<TaskContext>>,
    }

    impl CapturingAgent {
        fn new(name: &str) -> Self {
            Self {
                profile: AgentProfile::new(name, "captures handoff context"),
                services: AgentServices::new(),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Agent for CapturingAgent {
        fn profile(&self) -> &AgentProfile {
            &self.profile
        }

        fn services(&self) -> &AgentServices {
            &self.services
        }

        async fn think(&self, _task: &str, context: &TaskContext) -> Result<AgentResponse> {
            *self.seen.lock().unwrap() = Some(context.clone());
            Ok(AgentResponse::finish("captured").with_confidence(0.9))
        }
    }

    #[tokio::test]
    async fn test_transfer_returns_receiver_result_verbatim() {
        let from = BaseAgent::new(
            AgentProfile::new("coder", "sender"),
            AgentServices::new(),
        );
        let to = CapturingAgent::new("reviewer");
        let brief = TaskBrief::new("verify the fix")
            .with_constraint("no force pushes")
            .with_relevant_file("src/lib.rs");

        let response = HandoffProtocol::transfer(&from, &to, "verify the fix", &brief)
            .await
            .unwrap();

        assert_eq!(response.decision, Decision::Finish);
        assert_eq!(response.message, "captured");
        assert_eq!(response.confidence, 0.9);
    }

    #[tokio::test]
    async fn test_transfer_context_contents() {
        let from = BaseAgent::new(
            AgentProfile::new("coder", "sender"),
            AgentServices::new(),
        );
        let to = CapturingAgent::new("reviewer");
        let brief = TaskBrief::new("verify the fix").with_relevant_file("src/lib.rs");

        HandoffProtocol::transfer(&from, &to, "verify the fix", &brief)
            .await
            .unwrap();

        let seen = to.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.get(context_keys::HANDOFF_FROM), Some(&json!("coder")));
        assert_eq!(
            seen.get(context_keys::ORIGINAL_TASK),
            Some(&json!("verify the fix"))
        );
        assert!(seen
            .get(context_keys::HANDOFF_TIMESTAMP)
            .and_then(Value::as_f64)
            .is_some_and(|ts| ts > 0.0));

        let carried: TaskBrief =
            serde_json::from_value(seen.get(context_keys::TASK_BRIEF).unwrap().clone()).unwrap();
        assert_eq!(carried, brief);
    }
}
