//! # Waggle Skills - Skill Invocation Boundary
//!
//! This crate defines the contract between the dispatch core and the
//! engine that actually performs work (file edits, git operations, test
//! runs). The core never executes anything itself; it addresses
//! operations as `skill.operation` and hands them to a [`SkillInvoker`].
//!
//! ## Core Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ToolAddress`] | Parsed `skill.operation` address |
//! | [`SkillInvoker`] | Trait implemented by execution backends |
//! | [`CommandRegistry`] | Typed registry keyed by `(skill, operation)` |
//! | [`Command`] / [`FnCommand`] | Individual executable operations |
//!
//! ## Example
//!
//! ```ignore
//! use waggle_skills::{CommandRegistry, SkillInvoker, ToolAddress};
//!
//! let mut registry = CommandRegistry::new();
//! registry.register_fn("git", "status", |_args| Ok("clean tree".to_string()));
//!
//! let address = ToolAddress::parse("git.status")?;
//! let output = registry
//!     .invoke(address.skill(), address.operation(), &Default::default())
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod invoker;
pub mod registry;

pub use address::ToolAddress;
pub use error::{Error, Result};
pub use invoker::SkillInvoker;
pub use registry::{Command, CommandRegistry, FnCommand};
