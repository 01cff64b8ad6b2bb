//! Pending range calculation.
//!
//! A node in a transient lifecycle state changes which replicas must be
//! written to keep the consistency window closed during the transition.
//! This module derives, per final range, the extra (pending) replica
//! relationships each transient node introduces:
//!
//! - a joining node is pending on every range it will naturally own;
//! - a leaving node's ranges gain the successors that take over once it
//!   is gone;
//! - a moving node keeps both sides of the boundary change live, so the
//!   pending set is the post-move natural set minus the pre-move one;
//! - a replacement node shadows every range of the node it replaces.
//!
//! All of it is resolved against hypothetical rings derived from the
//! steady-state ring, never by mutating it.

use crate::strategy::Strategy;
use corelib::node::{LifecycleState, Node};
use corelib::range::TokenRange;
use corelib::snapshot::RingSnapshot;
use corelib::TokenRing;
use std::collections::HashSet;
use tracing::trace;

/// The transition a pending replica originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransitionKind {
    Join,
    Leave,
    Move,
    Replace,
}

/// A transient replica relationship: `node` is pending on `range` for
/// the duration of the originating transition.
#[derive(Debug, Clone)]
pub struct PendingRange<'a> {
    pub range: TokenRange,
    pub node: &'a Node,
    pub kind: TransitionKind,
}

/// Derive every pending replica relationship in the snapshot.
///
/// `naturals` must hold the natural replica set of `ranges[i]` at index
/// `i`, resolved against `ring` — the caller already has them for the
/// assembly step, so they are passed in rather than recomputed.
///
/// Pending entries are deduplicated per (range, node): overlapping
/// transitions union their effects. Entry order follows snapshot node
/// order, then range order, which keeps the assembled output stable.
pub fn pending_ranges<'a>(
    snapshot: &'a RingSnapshot,
    strategy: &Strategy,
    ring: &TokenRing<'a>,
    ranges: &[TokenRange],
    naturals: &[Vec<&'a Node>],
) -> Vec<PendingRange<'a>> {
    debug_assert_eq!(ranges.len(), naturals.len());

    let mut pending: Vec<PendingRange<'a>> = Vec::new();
    let mut claimed: HashSet<(TokenRange, &'a str)> = HashSet::new();

    for node in &snapshot.nodes {
        match &node.state {
            LifecycleState::Normal => {}
            LifecycleState::Joining => {
                let hypothetical = ring.with_node_tokens(node, &node.tokens);
                for (range, natural) in ranges.iter().zip(naturals) {
                    let would_own = strategy
                        .natural_replicas(range.start, &hypothetical)
                        .iter()
                        .any(|replica| replica.addr == node.addr);
                    let already_holds = natural.iter().any(|replica| replica.addr == node.addr);
                    if would_own && !already_holds {
                        push(&mut pending, &mut claimed, *range, node, TransitionKind::Join);
                    }
                }
            }
            LifecycleState::Leaving => {
                let hypothetical = ring.without_node(&node.addr);
                for (range, natural) in ranges.iter().zip(naturals) {
                    for successor in gained(strategy, range, &hypothetical, natural) {
                        push(&mut pending, &mut claimed, *range, successor, TransitionKind::Leave);
                    }
                }
            }
            LifecycleState::Moving { target } => {
                let hypothetical = ring.with_node_moved(node, *target);
                for (range, natural) in ranges.iter().zip(naturals) {
                    for gainer in gained(strategy, range, &hypothetical, natural) {
                        push(&mut pending, &mut claimed, *range, gainer, TransitionKind::Move);
                    }
                }
            }
            LifecycleState::Replacing { source } => {
                for (range, natural) in ranges.iter().zip(naturals) {
                    if natural.iter().any(|replica| &replica.addr == source) {
                        push(&mut pending, &mut claimed, *range, node, TransitionKind::Replace);
                    }
                }
            }
        }
        if node.state.is_transient() {
            trace!(node = %node.addr, state = %node.state, "derived pending ranges");
        }
    }

    pending
}

/// Record a pending entry unless the (range, node) pair is already
/// claimed by an earlier transition.
fn push<'a>(
    pending: &mut Vec<PendingRange<'a>>,
    claimed: &mut HashSet<(TokenRange, &'a str)>,
    range: TokenRange,
    node: &'a Node,
    kind: TransitionKind,
) {
    if claimed.insert((range, node.addr.as_str())) {
        pending.push(PendingRange { range, node, kind });
    }
}

/// Nodes in the hypothetical natural set of `range` that are absent from
/// its current natural set.
fn gained<'a>(
    strategy: &Strategy,
    range: &TokenRange,
    hypothetical: &TokenRing<'a>,
    natural: &[&'a Node],
) -> Vec<&'a Node> {
    strategy
        .natural_replicas(range.start, hypothetical)
        .into_iter()
        .filter(|candidate| !natural.iter().any(|replica| replica.addr == candidate.addr))
        .collect()
}
