//! CLI configuration and dispatch.

use crate::commands::{self, Command, CommandResult};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "ringctl", about = "Inspect token range replica mappings")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> CommandResult {
        tracing_subscriber::fmt().init();
        commands::run(self.command)
    }
}
