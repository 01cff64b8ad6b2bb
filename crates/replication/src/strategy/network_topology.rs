//! Network-topology-aware replication strategy.
//!
//! Each datacenter carries its own replication factor, and replicas
//! inside a datacenter are spread across racks: a node whose rack has
//! already contributed a replica is passed over until either every rack
//! in the datacenter has contributed or the walk completes with the
//! quota still unmet.

use corelib::node::Node;
use corelib::token::Murmur3Token;
use corelib::TokenRing;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Walk the ring once, filling each configured datacenter's quota with
/// rack diversity preferred.
///
/// Nodes from an already-used rack are deferred during the walk and only
/// admitted afterwards, in walk order, for quotas that rack-diverse
/// candidates could not fill. Datacenters absent from `factors` never
/// contribute replicas.
pub(crate) fn natural_replicas<'a>(
    range_start: Murmur3Token,
    factors: &BTreeMap<String, usize>,
    ring: &TokenRing<'a>,
) -> Vec<&'a Node> {
    let rack_totals = ring.rack_counts();
    let mut replicas: Vec<&'a Node> = Vec::new();
    let mut accepted: HashSet<&'a str> = HashSet::new();
    let mut filled: HashMap<&'a str, usize> = HashMap::new();
    let mut racks_used: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();
    let mut deferred: Vec<&'a Node> = Vec::new();

    let quota_met = |filled: &HashMap<&str, usize>| {
        factors
            .iter()
            .all(|(dc, rf)| filled.get(dc.as_str()).copied().unwrap_or(0) >= *rf)
    };

    for &(_, node) in ring.walk_from(range_start) {
        let dc = node.datacenter.as_str();
        let Some(&rf) = factors.get(dc) else {
            continue;
        };
        if accepted.contains(node.addr.as_str())
            || filled.get(dc).copied().unwrap_or(0) >= rf
        {
            continue;
        }

        let used = racks_used.entry(dc).or_default();
        let all_racks_used = rack_totals.get(dc).map_or(true, |total| used.len() >= *total);
        if used.contains(node.rack.as_str()) && !all_racks_used {
            deferred.push(node);
            continue;
        }

        used.insert(node.rack.as_str());
        accepted.insert(node.addr.as_str());
        *filled.entry(dc).or_insert(0) += 1;
        replicas.push(node);
        if quota_met(&filled) {
            return replicas;
        }
    }

    // Quota still unmet after the full walk: admit rack repeats in the
    // order they were passed over.
    for node in deferred {
        let dc = node.datacenter.as_str();
        if filled.get(dc).copied().unwrap_or(0) >= factors[dc] {
            continue;
        }
        if !accepted.insert(node.addr.as_str()) {
            continue;
        }
        *filled.entry(dc).or_insert(0) += 1;
        replicas.push(node);
    }

    replicas
}
