//! Node abstractions for the token ring.
//!
//! Nodes represent store instances participating in the ring. They are
//! identified by their address, which is also what the assembled mapping
//! reports to clients.

use crate::token::Murmur3Token;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a node as captured in a snapshot.
///
/// A closed enumeration carrying only the payload each transient state
/// needs: a move carries its target token, a replacement carries the
/// address of the node being replaced. Keeping the payload on the variant
/// lets the pending range calculator stay exhaustive and compiler-checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "UPPERCASE")]
pub enum LifecycleState {
    Normal,
    Joining,
    Leaving,
    Moving { target: Murmur3Token },
    Replacing { source: String },
}

impl LifecycleState {
    /// True for every state other than `Normal`.
    pub fn is_transient(&self) -> bool {
        !matches!(self, LifecycleState::Normal)
    }

    /// True if a node in this state still owns its tokens for natural
    /// replica placement.
    ///
    /// Leaving nodes serve until they are gone, and a moving node acts
    /// from its old position until the move completes. Joining and
    /// replacing nodes have no steady-state ownership yet.
    pub fn owns_naturally(&self) -> bool {
        matches!(
            self,
            LifecycleState::Normal | LifecycleState::Leaving | LifecycleState::Moving { .. }
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Normal => write!(f, "NORMAL"),
            LifecycleState::Joining => write!(f, "JOINING"),
            LifecycleState::Leaving => write!(f, "LEAVING"),
            LifecycleState::Moving { target } => write!(f, "MOVING({})", target),
            LifecycleState::Replacing { source } => write!(f, "REPLACING({})", source),
        }
    }
}

/// A store instance participating in the ring.
///
/// Keep this struct small and cheap to clone; it is owned by the snapshot
/// and referenced read-only by every stage of the computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Address of the instance; also its identity within a snapshot.
    pub addr: String,
    /// Data center the node belongs to.
    pub datacenter: String,
    /// Rack within the data center.
    pub rack: String,
    /// Tokens owned by this node, kept sorted.
    pub tokens: Vec<Murmur3Token>,
    /// Current lifecycle state.
    #[serde(flatten)]
    pub state: LifecycleState,
}

impl Node {
    /// Construct a node in `Normal` state.
    pub fn new(
        addr: impl Into<String>,
        datacenter: impl Into<String>,
        rack: impl Into<String>,
        tokens: Vec<Murmur3Token>,
    ) -> Self {
        Self::with_state(addr, datacenter, rack, tokens, LifecycleState::Normal)
    }

    pub fn with_state(
        addr: impl Into<String>,
        datacenter: impl Into<String>,
        rack: impl Into<String>,
        mut tokens: Vec<Murmur3Token>,
        state: LifecycleState,
    ) -> Self {
        tokens.sort_unstable();
        Self {
            addr: addr.into(),
            datacenter: datacenter.into(),
            rack: rack.into(),
            tokens,
            state,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}/{}] {}", self.addr, self.datacenter, self.rack, self.state)
    }
}
