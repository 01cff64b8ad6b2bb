//! Token ranges on the ring.

use crate::token::{Murmur3Token, Token};
use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use std::fmt;

/// A half-open interval on the ring: `(start, end]`.
///
/// The start token is exclusive and the end token inclusive, matching the
/// ownership rule that a node owns every token after its predecessor up
/// to and including its own. A range whose start equals its end spans the
/// whole ring.
///
/// # Invariants
///
/// The full set of ranges emitted for one snapshot partitions the ring
/// exactly once: no gaps, no overlaps, spans summing to the ring width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenRange {
    /// Start token, exclusive.
    pub start: Murmur3Token,
    /// End token, inclusive.
    pub end: Murmur3Token,
}

impl TokenRange {
    pub fn new(start: Murmur3Token, end: Murmur3Token) -> Self {
        Self { start, end }
    }

    /// True if this range covers the entire ring.
    pub fn is_full_ring(&self) -> bool {
        self.start == self.end
    }

    /// True if `token` falls inside `(start, end]`, accounting for
    /// wraparound at the ring end.
    pub fn contains(&self, token: Murmur3Token) -> bool {
        if self.is_full_ring() {
            return true;
        }
        if self.start < self.end {
            token > self.start && token <= self.end
        } else {
            token > self.start || token <= self.end
        }
    }

    /// Number of token positions covered by this range.
    pub fn span(&self) -> u128 {
        if self.is_full_ring() {
            Murmur3Token::ring_width()
        } else {
            self.start.distance_to(&self.end)
        }
    }
}

impl fmt::Display for TokenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.start, self.end)
    }
}

// Rendered as a pair of string-encoded tokens, the wire form the control
// plane serves to clients.
impl Serialize for TokenRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.start.to_string())?;
        tuple.serialize_element(&self.end.to_string())?;
        tuple.end()
    }
}
