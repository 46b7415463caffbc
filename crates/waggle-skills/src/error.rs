//! Error types for waggle-skills

use thiserror::Error;

/// Skill invocation error type
#[derive(Debug, Error)]
pub enum Error {
    /// Tool address does not have the `skill.operation` shape
    #[error("malformed tool address '{0}': expected exactly one '.' separator")]
    MalformedAddress(String),

    /// No command registered under the address
    #[error("unknown command: {skill}.{operation}")]
    UnknownCommand {
        /// Skill (namespace) part of the address
        skill: String,
        /// Operation part of the address
        operation: String,
    },

    /// Invalid arguments for a command
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// Command execution failed
    #[error("execution error: {0}")]
    Execution(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
