//! Core token trait definitions.
//!
//! The `Token` trait is minimal so the ring, the range splitter, and the
//! strategy resolver work without caring about the concrete ring width.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

/// Minimal token trait for the hash ring.
///
/// Tokens are immutable, totally ordered positions. Implementations must
/// be thread-safe and cheap to compare/hash. The total order wraps around
/// at the ring end, which is why distances are computed clockwise.
pub trait Token:
    Copy + Clone + Ord + Hash + Send + Sync + Debug + Display + FromStr + 'static
{
    /// Minimum token value (start of ring).
    fn min_token() -> Self;
    /// Maximum token value (end of ring).
    fn max_token() -> Self;
    /// True if this token is the minimum.
    fn is_min(&self) -> bool;
    /// Clockwise distance from `self` to `other` on the ring.
    ///
    /// Returned as `u128` so a full-width ring span is representable
    /// without overflow.
    fn distance_to(&self, other: &Self) -> u128;
    /// Total width of the ring in token positions.
    fn ring_width() -> u128;
}
