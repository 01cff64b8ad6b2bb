//! CLI commands.

use anyhow::Context;
use clap::Subcommand;
use corelib::snapshot::RingSnapshot;
use std::path::{Path, PathBuf};

/// Result type for command execution.
pub type CommandResult = anyhow::Result<()>;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the token range to replica mapping for a keyspace.
    TokenRanges {
        /// Path to a ring snapshot JSON file.
        #[arg(long)]
        snapshot: PathBuf,
        /// Keyspace to resolve.
        #[arg(long)]
        keyspace: String,
    },
    /// Validate a snapshot file against the topology rules.
    Validate {
        /// Path to a ring snapshot JSON file.
        #[arg(long)]
        snapshot: PathBuf,
    },
}

pub fn run(command: Command) -> CommandResult {
    match command {
        Command::TokenRanges { snapshot, keyspace } => token_ranges(&snapshot, &keyspace),
        Command::Validate { snapshot } => validate(&snapshot),
    }
}

fn load_snapshot(path: &Path) -> anyhow::Result<RingSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot: RingSnapshot =
        serde_json::from_str(&raw).with_context(|| format!("parsing snapshot {}", path.display()))?;
    Ok(snapshot)
}

fn token_ranges(path: &Path, keyspace: &str) -> CommandResult {
    let snapshot = load_snapshot(path)?;
    let mapping = replication::compute_mapping(&snapshot, keyspace)?;
    println!("{}", serde_json::to_string_pretty(&mapping)?);
    Ok(())
}

fn validate(path: &Path) -> CommandResult {
    let snapshot = load_snapshot(path)?;
    snapshot.validate()?;
    println!(
        "snapshot ok: {} nodes, {} keyspaces",
        snapshot.nodes.len(),
        snapshot.keyspaces.len()
    );
    Ok(())
}
