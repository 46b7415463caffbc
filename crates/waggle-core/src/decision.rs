//! Decision model shared by every dispatch component.
//!
//! These are the value types exchanged between workers, the hive, the
//! router and the orchestrator. They carry no behavior beyond
//! construction and are created fresh per call.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Context map passed between workers.
///
/// Kept as a plain string-keyed JSON map so it can cross the handoff
/// boundary without a schema; well-known entries are named in
/// [`context_keys`].
pub type TaskContext = HashMap<String, Value>;

/// Well-known [`TaskContext`] keys.
pub mod context_keys {
    /// Serialized `TaskBrief` carried across a handoff.
    pub const TASK_BRIEF: &str = "task_brief";
    /// Name of the worker that initiated the handoff.
    pub const HANDOFF_FROM: &str = "handoff_from";
    /// Wall-clock seconds at which the handoff was initiated.
    pub const HANDOFF_TIMESTAMP: &str = "handoff_timestamp";
    /// Task text as originally dispatched.
    pub const ORIGINAL_TASK: &str = "original_task";
    /// Explicit routing target, set by upstream callers.
    pub const TARGET_AGENT: &str = "target_agent";
    /// Task text in task-brief map form.
    pub const TASK_DESCRIPTION: &str = "task_description";
    /// Skill names the routed persona is allowed to use.
    pub const ALLOWED_SKILLS: &str = "allowed_skills";
    /// Files relevant to the task.
    pub const RELEVANT_FILES: &str = "relevant_files";
    /// Reasoning recorded by the router for this dispatch.
    pub const ROUTING_REASONING: &str = "routing_reasoning";
}

/// Wall-clock seconds since the Unix epoch.
pub(crate) fn now_ts() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// What a worker decided to do with a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Execute a tool call; the caller performs the invocation.
    Act,
    /// Transfer the task to another worker; the caller performs the transfer.
    Handoff,
    /// Stop and ask the user for clarification.
    AskUser,
    /// The task is complete.
    Finish,
}

impl Decision {
    /// Terminal decisions require no further automatic action.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AskUser | Self::Finish)
    }
}

/// A request to invoke `skill.operation` with keyword arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Dotted `skill.operation` address.
    pub tool: String,
    /// Keyword arguments for the operation.
    #[serde(default)]
    pub args: HashMap<String, Value>,
}

impl ToolCall {
    /// Create a call with no arguments.
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: HashMap::new(),
        }
    }

    /// Add a keyword argument.
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Context bundle carried across a handoff.
///
/// Immutable once constructed; serialized by value into the handoff
/// context so the receiving worker can act without re-deriving it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBrief {
    /// What the receiving worker is being asked to do.
    pub task_description: String,
    /// Constraints the work must respect.
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Files known to be relevant.
    #[serde(default)]
    pub relevant_files: Vec<String>,
    /// Summaries of attempts that already failed.
    #[serde(default)]
    pub previous_attempts: Vec<String>,
    /// How the receiving worker should judge success.
    #[serde(default)]
    pub success_criteria: Vec<String>,
}

impl TaskBrief {
    /// Create a brief with only a description.
    #[must_use]
    pub fn new(task_description: impl Into<String>) -> Self {
        Self {
            task_description: task_description.into(),
            ..Self::default()
        }
    }

    /// Add a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    /// Add a relevant file.
    #[must_use]
    pub fn with_relevant_file(mut self, path: impl Into<String>) -> Self {
        self.relevant_files.push(path.into());
        self
    }

    /// Add a failed prior attempt.
    #[must_use]
    pub fn with_previous_attempt(mut self, attempt: impl Into<String>) -> Self {
        self.previous_attempts.push(attempt.into());
        self
    }

    /// Add a success criterion.
    #[must_use]
    pub fn with_success_criterion(mut self, criterion: impl Into<String>) -> Self {
        self.success_criteria.push(criterion.into());
        self
    }
}

fn default_confidence() -> f32 {
    0.5
}

/// Outcome of one cognitive-loop pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// What the worker decided.
    pub decision: Decision,
    /// Tool call to execute; set only for [`Decision::Act`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
    /// Worker to transfer to; set only for [`Decision::Handoff`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff_to: Option<String>,
    /// Human-readable message accompanying the decision.
    #[serde(default)]
    pub message: String,
    /// Confidence in the decision (0.0 - 1.0).
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    /// Wall-clock seconds at which the response was constructed;
    /// assigned at construction when not supplied.
    #[serde(default = "now_ts")]
    pub timestamp: f64,
}

impl AgentResponse {
    fn base(decision: Decision) -> Self {
        Self {
            decision,
            tool_call: None,
            handoff_to: None,
            message: String::new(),
            confidence: default_confidence(),
            timestamp: now_ts(),
        }
    }

    /// Decide to execute a tool call.
    #[must_use]
    pub fn act(tool_call: ToolCall) -> Self {
        Self {
            tool_call: Some(tool_call),
            ..Self::base(Decision::Act)
        }
    }

    /// Decide to transfer the task to another worker.
    #[must_use]
    pub fn handoff(to: impl Into<String>) -> Self {
        Self {
            handoff_to: Some(to.into()),
            ..Self::base(Decision::Handoff)
        }
    }

    /// Decide to ask the user for clarification.
    #[must_use]
    pub fn ask_user(message: impl Into<String>) -> Self {
        Self::base(Decision::AskUser).with_message(message)
    }

    /// Decide the task is complete.
    #[must_use]
    pub fn finish(message: impl Into<String>) -> Self {
        Self::base(Decision::Finish).with_message(message)
    }

    /// Attach a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the confidence, clamped to 0.0 - 1.0.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// One routing decision for one task string.
///
/// Immutable once produced; the router caches it under the verbatim
/// task text that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRoute {
    /// Name of the worker that should receive the task.
    pub target_agent: String,
    /// Confidence in the routing decision (0.0 - 1.0).
    pub confidence: f32,
    /// Why the router chose the target.
    pub reasoning: String,
    /// Short brief for the receiving worker, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_brief: Option<String>,
    /// Constraints to carry into the mission context.
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Files relevant to the task.
    #[serde(default)]
    pub relevant_files: Vec<String>,
}

impl AgentRoute {
    /// Create a route.
    #[must_use]
    pub fn new(
        target_agent: impl Into<String>,
        confidence: f32,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            target_agent: target_agent.into(),
            confidence,
            reasoning: reasoning.into(),
            task_brief: None,
            constraints: Vec::new(),
            relevant_files: Vec::new(),
        }
    }

    /// Attach a short brief for the receiving worker.
    #[must_use]
    pub fn with_task_brief(mut self, brief: impl Into<String>) -> Self {
        self.task_brief = Some(brief.into());
        self
    }
}
