//! The steady-state token ring and the ring model.
//!
//! `TokenRing` is the walk order used by the replication strategy
//! resolver: sorted `(token, node)` entries for every node with
//! steady-state ownership. Transient ownership is deliberately absent —
//! joining and replacing nodes contribute no entries, and a moving node
//! stays at its old position. The pending range calculator builds the
//! hypothetical variants it needs from this ring.

use crate::error::{Error, Result};
use crate::node::Node;
use crate::snapshot::RingSnapshot;
use crate::token::Murmur3Token;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::trace;

/// Sorted view of token ownership for one snapshot.
#[derive(Debug, Clone)]
pub struct TokenRing<'a> {
    entries: Vec<(Murmur3Token, &'a Node)>,
}

impl<'a> TokenRing<'a> {
    /// Build the steady-state ring from a snapshot.
    pub fn from_snapshot(snapshot: &'a RingSnapshot) -> Self {
        let mut entries: Vec<(Murmur3Token, &'a Node)> = snapshot
            .nodes
            .iter()
            .filter(|node| node.state.owns_naturally())
            .flat_map(|node| node.tokens.iter().map(move |token| (*token, node)))
            .collect();
        Self::sort(&mut entries);
        trace!(tokens = entries.len(), "built steady-state ring");
        Self { entries }
    }

    /// Hypothetical ring with `node` owning `tokens` in addition to the
    /// current entries. Used to resolve a joining node as if it had
    /// already completed.
    pub fn with_node_tokens(&self, node: &'a Node, tokens: &[Murmur3Token]) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(tokens.iter().map(|token| (*token, node)));
        Self::sort(&mut entries);
        Self { entries }
    }

    /// Hypothetical ring with every entry of `addr` removed. Used to
    /// resolve the successors of a leaving node.
    pub fn without_node(&self, addr: &str) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(_, node)| node.addr != addr)
            .copied()
            .collect();
        Self { entries }
    }

    /// Hypothetical ring with `node` relocated to `target`. Used to
    /// resolve the post-move topology of a moving node.
    pub fn with_node_moved(&self, node: &'a Node, target: Murmur3Token) -> Self {
        let mut entries: Vec<(Murmur3Token, &'a Node)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.addr != node.addr)
            .copied()
            .collect();
        entries.push((target, node));
        Self::sort(&mut entries);
        Self { entries }
    }

    /// Walk the ring clockwise, starting just after `start` and wrapping
    /// once around.
    pub fn walk_from(
        &self,
        start: Murmur3Token,
    ) -> impl Iterator<Item = &(Murmur3Token, &'a Node)> {
        let split = self.entries.partition_point(|(token, _)| *token <= start);
        self.entries[split..].iter().chain(self.entries[..split].iter())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of distinct nodes contributing entries.
    pub fn node_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, node)| node.addr.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Distinct racks per datacenter among the ring's nodes. The
    /// network-topology walk needs this to know when rack diversity is
    /// exhausted.
    pub fn rack_counts(&self) -> BTreeMap<&'a str, usize> {
        let mut racks: HashMap<&str, HashSet<&str>> = HashMap::new();
        for (_, node) in &self.entries {
            racks
                .entry(node.datacenter.as_str())
                .or_default()
                .insert(node.rack.as_str());
        }
        racks.into_iter().map(|(dc, set)| (dc, set.len())).collect()
    }

    fn sort(entries: &mut Vec<(Murmur3Token, &'a Node)>) {
        // Secondary sort on address keeps the walk deterministic if a
        // transient state legitimately duplicates a token.
        entries.sort_unstable_by(|(ta, na), (tb, nb)| {
            ta.cmp(tb).then_with(|| na.addr.cmp(&nb.addr))
        });
        entries.dedup_by(|(ta, na), (tb, nb)| ta == tb && na.addr == nb.addr);
    }
}

/// The ring model: every token that can start a new range for this
/// snapshot, deduplicated and sorted into the ring's total order.
///
/// Collects each node's owned tokens under `NORMAL`/`LEAVING`/`JOINING`,
/// both the old and target token of a `MOVING` node, and both sides of a
/// `REPLACING` pair. Later stages refine this set further; it is the
/// minimal set of candidate cut points.
pub fn boundary_tokens(snapshot: &RingSnapshot) -> Result<Vec<Murmur3Token>> {
    let mut normal_owners: HashMap<Murmur3Token, &str> = HashMap::new();
    let mut boundaries = BTreeSet::new();

    for node in &snapshot.nodes {
        for token in &node.tokens {
            boundaries.insert(*token);
            if !node.state.is_transient() {
                if let Some(existing) = normal_owners.insert(*token, node.addr.as_str()) {
                    return Err(Error::InvalidTopology(format!(
                        "token {} owned by both {} and {}",
                        token, existing, node.addr
                    )));
                }
            }
        }
        if let crate::node::LifecycleState::Moving { target } = node.state {
            boundaries.insert(target);
        }
    }

    if boundaries.is_empty() {
        return Err(Error::InvalidTopology("snapshot contains no tokens".into()));
    }

    Ok(boundaries.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LifecycleState;
    use crate::snapshot::RingSnapshot;

    fn snapshot(nodes: Vec<Node>) -> RingSnapshot {
        RingSnapshot::new(nodes, BTreeMap::new(), 0)
    }

    fn node(addr: &str, tokens: Vec<i64>) -> Node {
        Node::new(
            addr,
            "dc1",
            "rack1",
            tokens.into_iter().map(Murmur3Token).collect(),
        )
    }

    #[test]
    fn test_walk_starts_just_after_token() {
        let snap = snapshot(vec![
            node("a", vec![10]),
            node("b", vec![20]),
            node("c", vec![30]),
        ]);
        let ring = TokenRing::from_snapshot(&snap);

        let walked: Vec<&str> = ring
            .walk_from(Murmur3Token(10))
            .map(|(_, n)| n.addr.as_str())
            .collect();
        assert_eq!(walked, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_walk_wraps_past_ring_end() {
        let snap = snapshot(vec![node("a", vec![10]), node("b", vec![20])]);
        let ring = TokenRing::from_snapshot(&snap);

        let walked: Vec<&str> = ring
            .walk_from(Murmur3Token(25))
            .map(|(_, n)| n.addr.as_str())
            .collect();
        assert_eq!(walked, vec!["a", "b"]);
    }

    #[test]
    fn test_transient_nodes_excluded_from_natural_ring() {
        let mut joining = node("j", vec![15]);
        joining.state = LifecycleState::Joining;
        let snap = snapshot(vec![node("a", vec![10]), joining]);
        let ring = TokenRing::from_snapshot(&snap);

        assert_eq!(ring.len(), 1);
        assert_eq!(ring.node_count(), 1);
    }

    #[test]
    fn test_boundaries_include_moving_target() {
        let mut mover = node("m", vec![10]);
        mover.state = LifecycleState::Moving { target: Murmur3Token(55) };
        let snap = snapshot(vec![node("a", vec![30]), mover]);

        let boundaries = boundary_tokens(&snap).unwrap();
        assert_eq!(
            boundaries,
            vec![Murmur3Token(10), Murmur3Token(30), Murmur3Token(55)]
        );
    }

    #[test]
    fn test_empty_ring_is_invalid() {
        let snap = snapshot(vec![]);
        assert!(matches!(
            boundary_tokens(&snap),
            Err(Error::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_normal_token_collision_is_invalid() {
        let snap = snapshot(vec![node("a", vec![10]), node("b", vec![10])]);
        assert!(matches!(
            boundary_tokens(&snap),
            Err(Error::InvalidTopology(_))
        ));
    }
}
