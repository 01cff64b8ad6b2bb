//! Immutable ring snapshots.
//!
//! A `RingSnapshot` is the whole input to one mapping computation: every
//! node's token ownership, placement, and lifecycle state, plus the
//! per-keyspace replication configuration. It is captured once by the
//! topology collector and never mutated; every computation is
//! reproducible from the snapshot alone.

use crate::error::{Error, Result};
use crate::node::{LifecycleState, Node};
use crate::token::Murmur3Token;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Per-keyspace replication configuration, kept in the raw form the
/// store reports it.
///
/// The strategy class stays a string here so an unrecognized kind is
/// representable; the mapping engine parses it and surfaces
/// `UnsupportedStrategy` for anything it does not implement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationConfig {
    /// Strategy class name, e.g. `SimpleStrategy` or
    /// `NetworkTopologyStrategy` (fully qualified names accepted).
    pub class: String,
    /// Global replication factor for the simple strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<usize>,
    /// Per-datacenter replication factors for the network topology
    /// strategy.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub datacenters: BTreeMap<String, usize>,
}

impl ReplicationConfig {
    pub fn simple(replication_factor: usize) -> Self {
        Self {
            class: "SimpleStrategy".into(),
            replication_factor: Some(replication_factor),
            datacenters: BTreeMap::new(),
        }
    }

    pub fn network_topology<I, S>(factors: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self {
            class: "NetworkTopologyStrategy".into(),
            replication_factor: None,
            datacenters: factors.into_iter().map(|(dc, rf)| (dc.into(), rf)).collect(),
        }
    }
}

/// Point-in-time capture of ring topology and replication configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingSnapshot {
    /// Every node participating in the ring, transient or not.
    pub nodes: Vec<Node>,
    /// Keyspace name to replication configuration.
    pub keyspaces: BTreeMap<String, ReplicationConfig>,
    /// Capture timestamp, milliseconds since the epoch.
    pub captured_at_millis: u64,
}

impl RingSnapshot {
    pub fn new(
        nodes: Vec<Node>,
        keyspaces: BTreeMap<String, ReplicationConfig>,
        captured_at_millis: u64,
    ) -> Self {
        Self {
            nodes,
            keyspaces,
            captured_at_millis,
        }
    }

    /// Look up a node by address.
    pub fn node(&self, addr: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.addr == addr)
    }

    /// Replication configuration for `keyspace`, or `InvalidTopology` if
    /// the snapshot was not captured for it.
    pub fn keyspace(&self, keyspace: &str) -> Result<&ReplicationConfig> {
        self.keyspaces.get(keyspace).ok_or_else(|| {
            Error::InvalidTopology(format!("keyspace {} not present in snapshot", keyspace))
        })
    }

    /// Check the snapshot for internal consistency.
    ///
    /// An inconsistent snapshot means the source data is corrupt;
    /// computing a mapping from it would look valid while routing
    /// clients to the wrong replicas, so every check here is terminal.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.iter().all(|node| node.tokens.is_empty()) {
            return Err(Error::InvalidTopology("snapshot contains no tokens".into()));
        }

        let mut addrs = HashSet::new();
        let mut normal_tokens: HashMap<Murmur3Token, &str> = HashMap::new();
        for node in &self.nodes {
            if !addrs.insert(node.addr.as_str()) {
                return Err(Error::InvalidTopology(format!(
                    "node {} appears twice in snapshot",
                    node.addr
                )));
            }
            if node.state.is_transient() && node.tokens.is_empty() {
                return Err(Error::InvalidTopology(format!(
                    "transient node {} has no tokens",
                    node.addr
                )));
            }
            if !node.state.is_transient() {
                for token in &node.tokens {
                    if let Some(other) = normal_tokens.insert(*token, node.addr.as_str()) {
                        return Err(Error::InvalidTopology(format!(
                            "token {} owned by both {} and {}",
                            token, other, node.addr
                        )));
                    }
                }
            }
        }

        self.validate_transitions()
    }

    /// Transient states must carry enough information to compute their
    /// effect, and no node may play two transient roles at once.
    fn validate_transitions(&self) -> Result<()> {
        let mut replace_sources: HashSet<&str> = HashSet::new();
        let mut move_targets: Vec<(Murmur3Token, &str)> = Vec::new();

        for node in &self.nodes {
            match &node.state {
                LifecycleState::Moving { target } => {
                    if node.tokens.len() != 1 {
                        return Err(Error::InvalidTopology(format!(
                            "moving node {} must own exactly one token, owns {}",
                            node.addr,
                            node.tokens.len()
                        )));
                    }
                    move_targets.push((*target, node.addr.as_str()));
                }
                LifecycleState::Replacing { source } => {
                    let replaced = self.node(source).ok_or_else(|| {
                        Error::InvalidTopology(format!(
                            "node {} replaces {}, which is not in the snapshot",
                            node.addr, source
                        ))
                    })?;
                    if replaced.state.is_transient() {
                        return Err(Error::InvalidTopology(format!(
                            "node {} replaces {}, which is itself in state {}",
                            node.addr, source, replaced.state
                        )));
                    }
                    if !replace_sources.insert(source.as_str()) {
                        return Err(Error::InvalidTopology(format!(
                            "node {} is being replaced twice",
                            source
                        )));
                    }
                }
                _ => {}
            }
        }

        // A move target landing on a token being replaced would give one
        // position two simultaneous transient meanings. The source
        // system's conflict policy is unknown, so reject it.
        for (target, mover) in move_targets {
            for source in &replace_sources {
                match self.node(source) {
                    Some(replaced) if replaced.tokens.contains(&target) => {
                        return Err(Error::InvalidTopology(format!(
                            "move target {} of {} collides with replaced node {}",
                            target, mover, source
                        )));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
