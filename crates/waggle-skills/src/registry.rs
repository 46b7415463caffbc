//! Command registry keyed by `(skill, operation)`.
//!
//! Instead of splitting dotted strings at every call site, commands are
//! registered under their already-separated address parts, so a malformed
//! address is rejected at the registry boundary.

use crate::error::{Error, Result};
use crate::invoker::SkillInvoker;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Trait for a single executable command.
#[async_trait]
pub trait Command: Send + Sync {
    /// Execute with keyword arguments, returning the textual result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] or [`Error::InvalidArgs`] when the
    /// command cannot produce a result.
    async fn call(&self, args: &HashMap<String, Value>) -> Result<String>;
}

/// Adapter turning a plain closure into a [`Command`].
pub struct FnCommand<F> {
    f: F,
}

impl<F> FnCommand<F>
where
    F: Fn(&HashMap<String, Value>) -> Result<String> + Send + Sync,
{
    /// Wrap a closure as a command.
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Command for FnCommand<F>
where
    F: Fn(&HashMap<String, Value>) -> Result<String> + Send + Sync,
{
    async fn call(&self, args: &HashMap<String, Value>) -> Result<String> {
        (self.f)(args)
    }
}

/// Registry mapping `(skill, operation)` pairs to commands.
///
/// Registration is last-write-wins: re-registering an address replaces
/// the prior command without error.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<(String, String), Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under an address.
    pub fn register(
        &mut self,
        skill: impl Into<String>,
        operation: impl Into<String>,
        command: Arc<dyn Command>,
    ) {
        let key = (skill.into(), operation.into());
        if self.commands.contains_key(&key) {
            debug!(skill = %key.0, operation = %key.1, "replacing registered command");
        } else {
            debug!(skill = %key.0, operation = %key.1, "registering command");
        }
        self.commands.insert(key, command);
    }

    /// Register a closure under an address.
    pub fn register_fn<F>(
        &mut self,
        skill: impl Into<String>,
        operation: impl Into<String>,
        f: F,
    ) where
        F: Fn(&HashMap<String, Value>) -> Result<String> + Send + Sync + 'static,
    {
        self.register(skill, operation, Arc::new(FnCommand::new(f)));
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry has no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[async_trait]
impl SkillInvoker for CommandRegistry {
    async fn invoke(
        &self,
        skill: &str,
        operation: &str,
        args: &HashMap<String, Value>,
    ) -> Result<String> {
        let key = (skill.to_string(), operation.to_string());
        let command = self.commands.get(&key).ok_or_else(|| Error::UnknownCommand {
            skill: skill.to_string(),
            operation: operation.to_string(),
        })?;
        debug!(skill, operation, arg_count = args.len(), "invoking command");
        command.call(args).await
    }

    fn has_command(&self, skill: &str, operation: &str) -> bool {
        self.commands
            .contains_key(&(skill.to_string(), operation.to_string()))
    }

    fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .keys()
            .map(|(skill, operation)| format!("{skill}.{operation}"))
            .collect();
        names.sort();
        names
    }
}
