//! # Waggle Core - Agent Dispatch
//!
//! Given a natural-language task, pick exactly one specialised worker to
//! handle it, hand over enough context for that worker to act without
//! re-deriving it, and record the decision for later reuse.
//!
//! ## Architecture
//!
//! ```text
//! task text
//!     │
//!     ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                              │
//! │  • @mention fast path   • unknown targets → default worker │
//! └────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │  HiveRouter                                                │
//! │  • query cache (verbatim task string)                      │
//! │  • semantic recall via the cortex (best effort)            │
//! │  • keyword rules in descending persona priority            │
//! └────────────────────────────────────────────────────────────┘
//!     │ AgentRoute
//!     ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │  Hive ──► Agent::run ──► think → decide → act              │
//! │              │ Handoff                                     │
//! │              ▼                                             │
//! │  HandoffProtocol::transfer ──► next Agent::run             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure philosophy
//!
//! Only configuration errors (no entry point, unknown worker in an
//! explicit handoff) cross component boundaries as typed errors.
//! Execution failures become in-band strings, and a broken cortex
//! degrades to a routing-cache miss: availability of *a* response wins
//! over correctness of *which* worker answered.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agent;
pub mod agents;
pub mod decision;
pub mod error;
pub mod handoff;
pub mod hive;
pub mod orchestrator;
pub mod router;

pub use agent::{Agent, AgentProfile, AgentServices, BaseAgent};
pub use agents::{CoderAgent, OrchestratorAgent, ResearcherAgent, ReviewerAgent};
pub use decision::{
    context_keys, AgentResponse, AgentRoute, Decision, TaskBrief, TaskContext, ToolCall,
};
pub use error::{Error, Result};
pub use handoff::HandoffProtocol;
pub use hive::Hive;
pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorStatus};
pub use router::{extract_mention, shared_router, HiveRouter, Persona};
