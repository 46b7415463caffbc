//! Error types for waggle-cortex

use thiserror::Error;

/// Cortex error type
#[derive(Debug, Error)]
pub enum Error {
    /// The cortex backend is not reachable
    #[error("cortex unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the decision store failed
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored decision could not be decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
