//! # Waggle Cortex - Semantic Memory Boundary
//!
//! The cortex recalls routing decisions made for similar past tasks and
//! learns from new ones. The similarity search itself lives in an
//! external service; this crate defines the narrow contract the dispatch
//! core depends on, plus an exact-match in-memory implementation for
//! tests and offline use.
//!
//! Both operations are best-effort from the caller's point of view: the
//! router and the workers log a failed recall or learn and carry on, so
//! a broken cortex never fails a dispatch.
//!
//! ## Example
//!
//! ```ignore
//! use waggle_cortex::{Cortex, InMemoryCortex, RoutingDecision};
//!
//! let cortex = InMemoryCortex::new();
//! let decision = RoutingDecision::new(vec!["git".into()], "review work", 0.85);
//! cortex.learn("run the tests", &decision).await?;
//!
//! if let Some(recalled) = cortex.recall("run the tests").await? {
//!     println!("recalled with confidence {:.2}", recalled.confidence);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod types;

pub use error::{Error, Result};
pub use memory::InMemoryCortex;
pub use types::{RecalledDecision, RoutingDecision};

use async_trait::async_trait;

/// Trait for semantic memory backends.
#[async_trait]
pub trait Cortex: Send + Sync {
    /// Recall the decision recorded for the most similar past query.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is unreachable or the stored
    /// decision cannot be decoded. Callers treat any error as a miss.
    async fn recall(&self, query: &str) -> Result<Option<RecalledDecision>>;

    /// Record a decision for future recall.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend rejects the write. Callers log
    /// and ignore it.
    async fn learn(&self, query: &str, decision: &RoutingDecision) -> Result<()>;
}
