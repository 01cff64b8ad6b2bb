//! Mapping assembly: the externally observable result of the engine.

use crate::pending::pending_ranges;
use crate::splitter;
use crate::strategy::Strategy;
use corelib::error::Result;
use corelib::node::{LifecycleState, Node};
use corelib::range::TokenRange;
use corelib::ring::{boundary_tokens, TokenRing};
use corelib::snapshot::RingSnapshot;
use corelib::token::Murmur3Token;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

/// One range and its ordered replica list: natural replicas in ring-walk
/// discovery order, pending replicas appended after them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeReplicas {
    pub range: TokenRange,
    pub replicas: Vec<String>,
}

/// The assembled mapping for one keyspace: per datacenter, every range
/// on the ring with its ordered replica addresses.
///
/// Structurally stable: the same snapshot always assembles to an
/// identical value, so the control plane may cache it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRangeMap {
    pub keyspace: String,
    pub by_datacenter: BTreeMap<String, Vec<RangeReplicas>>,
}

impl TokenRangeMap {
    /// Datacenter-agnostic view, derived by flattening the per-datacenter
    /// mappings in datacenter order.
    pub fn global(&self) -> Vec<RangeReplicas> {
        let mut merged: BTreeMap<TokenRange, Vec<String>> = BTreeMap::new();
        for rows in self.by_datacenter.values() {
            for row in rows {
                let replicas = merged.entry(row.range).or_default();
                for addr in &row.replicas {
                    if !replicas.contains(addr) {
                        replicas.push(addr.clone());
                    }
                }
            }
        }
        merged
            .into_iter()
            .map(|(range, replicas)| RangeReplicas { range, replicas })
            .collect()
    }
}

/// Compute the token range to replica mapping for `keyspace`.
///
/// A pure function of the snapshot: validates it, resolves the keyspace
/// strategy, builds the range set, and assembles natural plus pending
/// replicas per range per datacenter. Never returns a partial mapping.
pub fn compute_mapping(snapshot: &RingSnapshot, keyspace: &str) -> Result<TokenRangeMap> {
    snapshot.validate()?;
    let strategy = Strategy::from_config(snapshot.keyspace(keyspace)?)?;

    let ring = TokenRing::from_snapshot(snapshot);
    let ring_boundaries = boundary_tokens(snapshot)?;
    let pending_boundaries = transition_boundaries(snapshot);
    let ranges = splitter::split(&ring_boundaries, &pending_boundaries);
    debug!(
        keyspace,
        strategy = strategy.name(),
        ranges = ranges.len(),
        "computing token range mapping"
    );

    let naturals: Vec<Vec<&Node>> = ranges
        .iter()
        .map(|range| strategy.natural_replicas(range.start, &ring))
        .collect();
    let pending = pending_ranges(snapshot, &strategy, &ring, &ranges, &naturals);

    let mut pending_by_range: HashMap<TokenRange, Vec<&Node>> = HashMap::new();
    for entry in &pending {
        pending_by_range.entry(entry.range).or_default().push(entry.node);
    }

    let mut by_datacenter = BTreeMap::new();
    for dc in configured_datacenters(&strategy, snapshot) {
        let mut rows = Vec::with_capacity(ranges.len());
        for (range, natural) in ranges.iter().zip(&naturals) {
            let mut replicas = Vec::new();
            let mut seen: HashSet<&str> = HashSet::new();
            let pending_here = pending_by_range.get(range).into_iter().flatten();
            for node in natural.iter().chain(pending_here) {
                if node.datacenter == dc && seen.insert(node.addr.as_str()) {
                    replicas.push(node.addr.clone());
                }
            }
            rows.push(RangeReplicas { range: *range, replicas });
        }
        by_datacenter.insert(dc, rows);
    }

    Ok(TokenRangeMap {
        keyspace: keyspace.to_string(),
        by_datacenter,
    })
}

/// Boundaries the in-flight transitions add on top of the ring model's
/// candidate set: tokens a joining or replacing node brings, and the
/// target of a move. Unioned with the ring model by the splitter.
fn transition_boundaries(snapshot: &RingSnapshot) -> Vec<Murmur3Token> {
    let mut boundaries = Vec::new();
    for node in &snapshot.nodes {
        match node.state {
            LifecycleState::Joining | LifecycleState::Replacing { .. } => {
                boundaries.extend(node.tokens.iter().copied());
            }
            LifecycleState::Moving { target } => boundaries.push(target),
            _ => {}
        }
    }
    boundaries
}

/// The datacenters the assembled mapping reports.
///
/// A network-topology keyspace names its datacenters in configuration;
/// a simple keyspace reports whichever datacenters the snapshot's nodes
/// occupy.
fn configured_datacenters(strategy: &Strategy, snapshot: &RingSnapshot) -> Vec<String> {
    match strategy {
        Strategy::NetworkTopology { datacenters } => datacenters.keys().cloned().collect(),
        Strategy::Simple { .. } => snapshot
            .nodes
            .iter()
            .map(|node| node.datacenter.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::snapshot::ReplicationConfig;

    fn node(addr: &str, dc: &str, rack: &str, token: i64) -> Node {
        Node::new(addr, dc, rack, vec![Murmur3Token(token)])
    }

    fn snapshot_with(nodes: Vec<Node>, config: ReplicationConfig) -> RingSnapshot {
        let mut keyspaces = BTreeMap::new();
        keyspaces.insert("ks".to_string(), config);
        RingSnapshot::new(nodes, keyspaces, 1_700_000_000_000)
    }

    #[test]
    fn test_single_node_ring_spans_whole_ring() {
        let snap = snapshot_with(
            vec![node("a", "dc1", "r1", 0)],
            ReplicationConfig::simple(3),
        );
        let mapping = compute_mapping(&snap, "ks").unwrap();

        let rows = &mapping.by_datacenter["dc1"];
        assert_eq!(rows.len(), 1);
        assert!(rows[0].range.is_full_ring());
        assert_eq!(rows[0].replicas, vec!["a"]);
    }

    #[test]
    fn test_replicas_cascade_around_the_ring() {
        let snap = snapshot_with(
            vec![
                node("a", "dc1", "r1", 10),
                node("b", "dc1", "r1", 20),
                node("c", "dc1", "r1", 30),
            ],
            ReplicationConfig::simple(2),
        );
        let mapping = compute_mapping(&snap, "ks").unwrap();

        let rows = &mapping.by_datacenter["dc1"];
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].replicas, vec!["b", "c"]); // (10, 20]
        assert_eq!(rows[1].replicas, vec!["c", "a"]); // (20, 30]
        assert_eq!(rows[2].replicas, vec!["a", "b"]); // (30, 10]
    }

    #[test]
    fn test_network_topology_groups_by_datacenter() {
        let snap = snapshot_with(
            vec![
                node("a1", "dc1", "r1", 10),
                node("b1", "dc2", "r1", 20),
                node("a2", "dc1", "r2", 30),
                node("b2", "dc2", "r2", 40),
            ],
            ReplicationConfig::network_topology([("dc1", 2), ("dc2", 2)]),
        );
        let mapping = compute_mapping(&snap, "ks").unwrap();

        assert_eq!(
            mapping.by_datacenter.keys().collect::<Vec<_>>(),
            vec!["dc1", "dc2"]
        );
        for rows in mapping.by_datacenter.values() {
            assert_eq!(rows.len(), 4);
            for row in rows {
                assert_eq!(row.replicas.len(), 2);
            }
        }
    }

    #[test]
    fn test_global_view_flattens_datacenters() {
        let snap = snapshot_with(
            vec![
                node("a1", "dc1", "r1", 10),
                node("b1", "dc2", "r1", 20),
            ],
            ReplicationConfig::network_topology([("dc1", 1), ("dc2", 1)]),
        );
        let mapping = compute_mapping(&snap, "ks").unwrap();

        for row in mapping.global() {
            assert_eq!(row.replicas.len(), 2);
        }
    }

    #[test]
    fn test_unknown_keyspace_is_an_error() {
        let snap = snapshot_with(
            vec![node("a", "dc1", "r1", 0)],
            ReplicationConfig::simple(1),
        );
        assert!(compute_mapping(&snap, "other").is_err());
    }

    #[test]
    fn test_mapping_serializes_ranges_as_string_pairs() {
        let snap = snapshot_with(
            vec![node("a", "dc1", "r1", 5), node("b", "dc1", "r1", 50)],
            ReplicationConfig::simple(1),
        );
        let mapping = compute_mapping(&snap, "ks").unwrap();
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["by_datacenter"]["dc1"][0]["range"][0], "5");
        assert_eq!(json["by_datacenter"]["dc1"][0]["range"][1], "50");
    }
}
