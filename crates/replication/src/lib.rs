//! The token-range-to-replica mapping engine.
//!
//! Given an immutable ring snapshot, this crate computes, for every
//! contiguous token range on the ring, the ordered set of replica nodes
//! responsible for it — including the transient replica relationships
//! introduced by nodes that are joining, leaving, moving, or being
//! replaced. The computation is a pure function of the snapshot:
//!
//! snapshot -> ring model -> {strategy resolver, pending calculator}
//!          -> range splitter -> mapping assembler -> result

pub mod mapping;
pub mod pending;
pub mod splitter;
pub mod strategy;

pub use mapping::{compute_mapping, RangeReplicas, TokenRangeMap};
pub use pending::{pending_ranges, PendingRange, TransitionKind};
pub use strategy::Strategy;
