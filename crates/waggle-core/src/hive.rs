//! Worker registry and entry point.
//!
//! The hive owns every registered worker plus the designated entry
//! point. Registration is last-write-wins; missing names in an explicit
//! handoff are configuration errors and surface as typed failures.
//!
//! The maps are `RwLock`-guarded: dispatches may be interleaved by the
//! runtime, and registration can race a lookup under true parallelism.

use crate::agent::Agent;
use crate::decision::{AgentResponse, TaskBrief, TaskContext};
use crate::error::{Error, Result};
use crate::handoff::HandoffProtocol;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Container of all workers plus the designated entry point.
#[derive(Default)]
pub struct Hive {
    agents: RwLock<HashMap<String, Arc<dyn Agent>>>,
    entry_point: RwLock<Option<Arc<dyn Agent>>>,
}

impl Hive {
    /// Create an empty hive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker under its profile name.
    ///
    /// Re-registering a name overwrites the prior entry without error.
    pub async fn register(&self, agent: Arc<dyn Agent>) {
        let name = agent.profile().name.clone();
        let mut agents = self.agents.write().await;
        if agents.contains_key(&name) {
            debug!(agent = %name, "overwriting registered worker");
        } else {
            info!(agent = %name, "registering worker");
        }
        agents.insert(name, agent);
    }

    /// Designate the entry-point worker, registering it as well.
    pub async fn set_entry_point(&self, agent: Arc<dyn Agent>) {
        info!(agent = %agent.profile().name, "setting entry point");
        self.register(agent.clone()).await;
        *self.entry_point.write().await = Some(agent);
    }

    /// Run the entry-point worker on an input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryPointNotSet`] when none has been
    /// designated; otherwise propagates the worker's `run`.
    pub async fn dispatch(&self, input: &str) -> Result<AgentResponse> {
        let entry_point = self
            .entry_point
            .read()
            .await
            .clone()
            .ok_or(Error::EntryPointNotSet)?;
        entry_point.run(input, &TaskContext::new()).await
    }

    /// Transfer a task between two registered workers by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AgentNotFound`] for either unknown name, then
    /// delegates to [`HandoffProtocol::transfer`].
    pub async fn handoff(
        &self,
        from_name: &str,
        to_name: &str,
        task: &str,
        brief: &TaskBrief,
    ) -> Result<AgentResponse> {
        let (from, to) = {
            let agents = self.agents.read().await;
            let from = agents
                .get(from_name)
                .cloned()
                .ok_or_else(|| Error::AgentNotFound(from_name.to_string()))?;
            let to = agents
                .get(to_name)
                .cloned()
                .ok_or_else(|| Error::AgentNotFound(to_name.to_string()))?;
            (from, to)
        };
        HandoffProtocol::transfer(from.as_ref(), to.as_ref(), task, brief).await
    }

    /// Look up a worker by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.read().await.get(name).cloned()
    }

    /// Sorted names of all registered workers.
    pub async fn list_agents(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}
