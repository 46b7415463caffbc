//! Top-level dispatch façade.
//!
//! The orchestrator glues router and hive together: it asks the router
//! for a destination, resolves the name against the hive (unknown
//! targets degrade to the default worker rather than failing the
//! request), runs the worker with a mission context and performs the
//! follow-up its decision implies. Handoff chains are bounded by
//! `max_depth`, and the whole dispatch can be cancelled cooperatively
//! through a [`CancellationToken`].

use crate::agent::Agent;
use crate::decision::{context_keys, AgentResponse, Decision, TaskBrief, TaskContext};
use crate::error::{Error, Result};
use crate::hive::Hive;
use crate::router::{extract_mention, HiveRouter};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Worker receiving tasks whose routed target is unknown.
    #[serde(default = "default_agent")]
    pub default_agent: String,
    /// Enable keyword/semantic routing; when off, everything goes to
    /// the default worker (explicit targets still resolve).
    #[serde(default = "default_true")]
    pub semantic_routing: bool,
    /// Max handoff transfers for a single dispatch.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_agent() -> String {
    "orchestrator".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> u32 {
    3
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_agent: default_agent(),
            semantic_routing: true,
            max_depth: default_max_depth(),
        }
    }
}

/// Read-only introspection snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Whether the router has a persona table loaded.
    pub router_loaded: bool,
    /// Whether inference credentials are present in the environment.
    pub inference_configured: bool,
    /// Names of all registered workers.
    pub available_agents: Vec<String>,
}

/// Top-level dispatcher over a router and a hive.
pub struct Orchestrator {
    router: Arc<HiveRouter>,
    hive: Arc<Hive>,
    config: OrchestratorConfig,
    cancel_token: CancellationToken,
}

impl Orchestrator {
    /// Create an orchestrator with the default configuration.
    #[must_use]
    pub fn new(router: Arc<HiveRouter>, hive: Arc<Hive>) -> Self {
        Self::with_config(router, hive, OrchestratorConfig::default())
    }

    /// Create an orchestrator with a custom configuration.
    #[must_use]
    pub fn with_config(
        router: Arc<HiveRouter>,
        hive: Arc<Hive>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            router,
            hive,
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Get a child cancellation token for this orchestrator.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    /// Cancel every in-flight and future dispatch.
    pub fn cancel(&self) {
        info!("cancelling orchestrator dispatches");
        self.cancel_token.cancel();
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Route a task and run the resolved worker.
    ///
    /// `history` is merged into the mission context handed to the
    /// worker. Unknown routed targets degrade to the default worker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] after [`cancel`](Self::cancel),
    /// [`Error::MaxDepthExceeded`] for runaway handoff chains,
    /// [`Error::AgentNotFound`] when a handoff names an unknown worker
    /// or the default worker is missing, and propagates worker `run`
    /// failures.
    pub async fn dispatch(&self, query: &str, history: &TaskContext) -> Result<AgentResponse> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // An explicit @mention is an upstream decision, not a routing
        // problem; send it down the fast path.
        if let Some((mention, rest)) = extract_mention(query) {
            if self.hive.get(&mention).await.is_some() {
                let mut hive_context = history.clone();
                hive_context.insert(context_keys::TARGET_AGENT.to_string(), json!(mention));
                return self.dispatch_to_target(&mention, &rest, &hive_context).await;
            }
        }

        self.dispatch_routed(query, history).await
    }

    /// Dispatch to an explicitly named target, bypassing the router.
    ///
    /// Falls back to routed dispatch when `hive_context` carries no
    /// `target_agent`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`dispatch`](Self::dispatch).
    pub async fn dispatch_with_hive_context(
        &self,
        query: &str,
        hive_context: &TaskContext,
    ) -> Result<AgentResponse> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let target = hive_context
            .get(context_keys::TARGET_AGENT)
            .and_then(Value::as_str)
            .map(ToString::to_string);
        match target {
            Some(target) => self.dispatch_to_target(&target, query, hive_context).await,
            None => self.dispatch_routed(query, hive_context).await,
        }
    }

    /// Run an explicitly named worker with the caller's context as-is.
    async fn dispatch_to_target(
        &self,
        target: &str,
        query: &str,
        hive_context: &TaskContext,
    ) -> Result<AgentResponse> {
        debug!(agent = target, "explicit target dispatch");
        let agent = self.resolve(target).await?;
        let response = agent.run(query, hive_context).await?;
        self.follow_up(agent, query, response).await
    }

    /// Route a query, build the mission context and run the worker.
    async fn dispatch_routed(&self, query: &str, history: &TaskContext) -> Result<AgentResponse> {
        let dispatch_id = Uuid::new_v4();
        let route = if self.config.semantic_routing {
            self.router.route(query).await
        } else {
            crate::decision::AgentRoute::new(
                self.config.default_agent.clone(),
                0.3,
                "Routing disabled; using the default worker",
            )
        };
        info!(
            %dispatch_id,
            agent = %route.target_agent,
            confidence = route.confidence,
            "routed task"
        );

        let agent = self.resolve(&route.target_agent).await?;
        let mut context = history.clone();
        context.extend(
            self.router
                .create_task_brief(query, &route.target_agent, history),
        );
        context.insert(
            context_keys::ROUTING_REASONING.to_string(),
            json!(route.reasoning),
        );
        let brief = TaskBrief {
            task_description: query.to_string(),
            constraints: route.constraints.clone(),
            relevant_files: route.relevant_files.clone(),
            ..TaskBrief::default()
        };
        context.insert(
            context_keys::TASK_BRIEF.to_string(),
            serde_json::to_value(&brief).unwrap_or(Value::Null),
        );

        let response = agent.run(query, &context).await?;
        self.follow_up(agent, query, response).await
    }

    /// Introspect the dispatcher without touching its decision logic.
    pub async fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            router_loaded: !self.router.persona_names().is_empty(),
            inference_configured: std::env::var("ANTHROPIC_API_KEY").is_ok()
                || std::env::var("OPENAI_API_KEY").is_ok(),
            available_agents: self.hive.list_agents().await,
        }
    }

    /// Resolve a worker name, degrading unknown names to the default
    /// worker. A missing default is a configuration error.
    async fn resolve(&self, name: &str) -> Result<Arc<dyn Agent>> {
        if let Some(agent) = self.hive.get(name).await {
            return Ok(agent);
        }
        debug!(
            requested = name,
            default = %self.config.default_agent,
            "unknown routing target, using default worker"
        );
        self.hive
            .get(&self.config.default_agent)
            .await
            .ok_or_else(|| Error::AgentNotFound(self.config.default_agent.clone()))
    }

    /// Perform the follow-up a non-terminal decision implies: transfer
    /// handoffs (bounded by `max_depth`) and execute tool calls, folding
    /// the tool output into the response message.
    async fn follow_up(
        &self,
        mut agent: Arc<dyn Agent>,
        task: &str,
        mut response: AgentResponse,
    ) -> Result<AgentResponse> {
        let mut depth = 0u32;
        while response.decision == Decision::Handoff {
            if self.is_cancelled() {
                return Err(Error::Cancelled);
            }
            depth += 1;
            if depth > self.config.max_depth {
                return Err(Error::MaxDepthExceeded(self.config.max_depth));
            }
            let Some(target) = response.handoff_to.clone() else {
                warn!("handoff decision without a target, treating as terminal");
                return Ok(response);
            };

            let mut brief = TaskBrief::new(task);
            if !response.message.is_empty() {
                brief = brief.with_previous_attempt(response.message.clone());
            }
            let from = agent.profile().name.clone();
            response = self.hive.handoff(&from, &target, task, &brief).await?;
            agent = self
                .hive
                .get(&target)
                .await
                .ok_or_else(|| Error::AgentNotFound(target.clone()))?;
        }

        if response.decision == Decision::Act {
            if let Some(call) = response.tool_call.clone() {
                let output = agent.act(&call).await;
                agent.learn_from_experience(task, &response).await;
                response.message = if response.message.is_empty() {
                    output
                } else {
                    format!("{}\n{output}", response.message)
                };
            }
        }

        Ok(response)
    }
}
