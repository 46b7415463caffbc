//! Skill invocation boundary.
//!
//! The dispatch core talks to the execution engine through this narrow
//! contract; the engine that actually edits files or runs git lives
//! behind it and may be swapped out freely.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Trait for skill execution backends.
#[async_trait]
pub trait SkillInvoker: Send + Sync {
    /// Invoke `skill.operation` with keyword arguments, returning the
    /// textual result.
    ///
    /// # Errors
    ///
    /// Implementations return a descriptive error when the command is
    /// unknown or its execution fails. Callers on the dispatch side
    /// convert these into in-band error strings.
    async fn invoke(
        &self,
        skill: &str,
        operation: &str,
        args: &HashMap<String, Value>,
    ) -> Result<String>;

    /// Check whether a command is registered.
    fn has_command(&self, skill: &str, operation: &str) -> bool;

    /// List registered command addresses in `skill.operation` form.
    fn command_names(&self) -> Vec<String>;
}
