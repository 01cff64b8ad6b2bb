//! Simple replication strategy.
//!
//! Places RF replicas sequentially around the ring, clockwise from the
//! range boundary, ignoring datacenter and rack placement.

use corelib::node::Node;
use corelib::token::Murmur3Token;
use corelib::TokenRing;
use std::collections::HashSet;

/// Collect the first `replication_factor` distinct nodes clockwise from
/// `range_start`.
///
/// Stops early when the ring is exhausted: fewer distinct nodes than the
/// factor is a degraded-but-valid result.
pub(crate) fn natural_replicas<'a>(
    range_start: Murmur3Token,
    replication_factor: usize,
    ring: &TokenRing<'a>,
) -> Vec<&'a Node> {
    let mut replicas = Vec::with_capacity(replication_factor);
    let mut seen: HashSet<&str> = HashSet::with_capacity(replication_factor);

    for (_, node) in ring.walk_from(range_start) {
        if seen.insert(node.addr.as_str()) {
            replicas.push(*node);
            if replicas.len() == replication_factor {
                break;
            }
        }
    }

    replicas
}
