//! Longest-match search over the sliding window.
//!
//! Every finder returns the same match for the same input: the longest run
//! (at least two bytes, at most the configured maximum) and, among
//! runs of that length, the one with the smallest distance (or the largest,
//! under [`TieBreak::Farthest`]). The encoded bytes depend on this, so
//! strategies are interchangeable only because they agree exactly.

pub mod brute;
pub mod hash_chain;

pub use brute::{find_match, BruteForceMatcher};
pub use hash_chain::HashChainMatcher;

use crate::format::{Match, MIN_MATCH_LENGTH};
use crate::{CodecConfig, MatchStrategy, TieBreak};

/// Finds back-references for an encoder walking an input left to right
pub trait MatchFinder {
    /// Best match for the bytes starting at `cursor`, or `None` if no run of
    /// at least two bytes repeats within the window.
    ///
    /// Within one input, calls must use non-decreasing cursors. Call
    /// [`MatchFinder::reset`] before starting on a new input.
    fn find_match(&mut self, input: &[u8], cursor: usize) -> Option<Match>;

    /// Forget any state collected from a previous input
    fn reset(&mut self) {}
}

/// Create the finder selected by `config`
pub fn new_match_finder(config: &CodecConfig) -> Box<dyn MatchFinder> {
    match config.strategy() {
        MatchStrategy::BruteForce => Box::new(BruteForceMatcher::new(config)),
        MatchStrategy::HashChain => Box::new(HashChainMatcher::new(config)),
    }
}

/// Whether a candidate run of `length` takes over from the best so far
///
/// Finders visit candidates nearest first, so letting an equal length win
/// ends on the farthest of them.
#[inline]
pub(crate) fn replaces_best(length: usize, best_length: usize, tie_break: TieBreak) -> bool {
    match tie_break {
        TieBreak::Nearest => length > best_length,
        TieBreak::Farthest => length >= best_length.max(MIN_MATCH_LENGTH),
    }
}

/// Length of the run at `cursor` that repeats the bytes at `source`, capped at `limit`
///
/// The source run is replicated with period `cursor - source`, so a run may
/// extend past the cursor (distance smaller than length). Comparing
/// `input[source + k]` with `input[cursor + k]` gives exactly that: once
/// `source + k` reaches the cursor it reads bytes already proven equal to the
/// period. This is the same order in which the decoder replays a copy.
///
/// Callers guarantee `source < cursor` and `cursor + limit <= input.len()`.
#[inline]
pub(crate) fn match_length(input: &[u8], source: usize, cursor: usize, limit: usize) -> usize {
    debug_assert!(source < cursor && cursor + limit <= input.len());

    let lhs = &input[source..source + limit];
    let rhs = &input[cursor..cursor + limit];
    lhs.iter().zip(rhs).take_while(|(a, b)| a == b).count()
}
