//! Range splitting.
//!
//! The final range set is cut at every token where replica-set
//! composition can change: the ring model's candidate boundaries plus
//! any boundary a transition introduces. Within an emitted range the
//! replica set is uniform.

use corelib::range::TokenRange;
use corelib::token::Murmur3Token;
use std::collections::BTreeSet;

/// Union both boundary sets and emit one range per adjacent pair,
/// wrapping at the ring end.
///
/// A single-token ring cannot be split; it emits the one ring-spanning
/// range `(t, t]`.
pub fn split(
    ring_boundaries: &[Murmur3Token],
    pending_boundaries: &[Murmur3Token],
) -> Vec<TokenRange> {
    let boundaries: BTreeSet<Murmur3Token> = ring_boundaries
        .iter()
        .chain(pending_boundaries)
        .copied()
        .collect();
    let tokens: Vec<Murmur3Token> = boundaries.into_iter().collect();

    match tokens.as_slice() {
        [] => Vec::new(),
        [only] => vec![TokenRange::new(*only, *only)],
        _ => (0..tokens.len())
            .map(|i| TokenRange::new(tokens[i], tokens[(i + 1) % tokens.len()]))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::token::Token;

    fn tokens(values: &[i64]) -> Vec<Murmur3Token> {
        values.iter().copied().map(Murmur3Token).collect()
    }

    #[test]
    fn test_adjacent_pairs_with_wrap() {
        let ranges = split(&tokens(&[10, 20, 30]), &[]);
        assert_eq!(
            ranges,
            vec![
                TokenRange::new(Murmur3Token(10), Murmur3Token(20)),
                TokenRange::new(Murmur3Token(20), Murmur3Token(30)),
                TokenRange::new(Murmur3Token(30), Murmur3Token(10)),
            ]
        );
    }

    #[test]
    fn test_boundary_sets_are_unioned() {
        let ranges = split(&tokens(&[10, 30]), &tokens(&[20, 30]));
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0], TokenRange::new(Murmur3Token(10), Murmur3Token(20)));
    }

    #[test]
    fn test_single_token_emits_full_ring() {
        let ranges = split(&tokens(&[42]), &[]);
        assert_eq!(ranges, vec![TokenRange::new(Murmur3Token(42), Murmur3Token(42))]);
        assert!(ranges[0].is_full_ring());
    }

    #[test]
    fn test_partition_covers_ring_exactly() {
        let ranges = split(&tokens(&[-500, -1, 0, 77, 4096]), &tokens(&[13]));
        let total: u128 = ranges.iter().map(|r| r.span()).sum();
        assert_eq!(total, Murmur3Token::ring_width());
    }
}
