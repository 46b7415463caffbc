//! Dotted tool addressing.
//!
//! Every executable operation is addressed as `skill.operation`, with
//! exactly one `.` separator. A missing or repeated separator is a caller
//! error reported through [`Error::MalformedAddress`], never a panic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Parsed `skill.operation` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolAddress {
    skill: String,
    operation: String,
}

impl ToolAddress {
    /// Create an address from already-separated parts.
    #[must_use]
    pub fn new(skill: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            operation: operation.into(),
        }
    }

    /// Parse a dotted address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedAddress`] when the input does not contain
    /// exactly one `.` separator, or when either part is empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(skill), Some(operation), None) if !skill.is_empty() && !operation.is_empty() => {
                Ok(Self::new(skill, operation))
            }
            _ => Err(Error::MalformedAddress(raw.to_string())),
        }
    }

    /// Skill (namespace) part.
    #[must_use]
    pub fn skill(&self) -> &str {
        &self.skill
    }

    /// Operation part.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl std::fmt::Display for ToolAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.skill, self.operation)
    }
}
