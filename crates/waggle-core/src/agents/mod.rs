//! Specialised workers.
//!
//! Each worker fixes its profile at construction and overrides `think`
//! with a small domain policy; everything else comes from the [`Agent`]
//! trait defaults.
//!
//! [`Agent`]: crate::agent::Agent

mod coder;
mod orchestrator;
mod researcher;
mod reviewer;

pub use coder::CoderAgent;
pub use orchestrator::OrchestratorAgent;
pub use researcher::ResearcherAgent;
pub use reviewer::ReviewerAgent;
