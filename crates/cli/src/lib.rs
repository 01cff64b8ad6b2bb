//! CLI tool for inspecting token range mappings.
//!
//! Provides commands for:
//! - Computing the range-to-replica mapping from a snapshot file
//! - Validating a snapshot against the topology rules

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
