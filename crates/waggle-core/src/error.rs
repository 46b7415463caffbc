//! Error types for waggle-core
//!
//! Only configuration errors cross component boundaries as typed errors.
//! Execution failures become in-band strings (see `Agent::act`), and a
//! broken cortex degrades to a routing-cache miss.

use thiserror::Error;

/// Dispatch error type
#[derive(Debug, Error)]
pub enum Error {
    /// No entry-point worker has been designated
    #[error("entry point not set: designate one with Hive::set_entry_point")]
    EntryPointNotSet,

    /// Named worker is not registered in the hive
    #[error("agent '{0}' not found")]
    AgentNotFound(String),

    /// Dispatch was cancelled by the host
    #[error("dispatch cancelled")]
    Cancelled,

    /// A handoff chain exceeded the configured depth
    #[error("max handoff depth exceeded: {0}")]
    MaxDepthExceeded(u32),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
