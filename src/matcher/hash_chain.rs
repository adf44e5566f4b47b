use super::{match_length, replaces_best, MatchFinder};
use crate::format::{Match, MAX_WINDOW_SIZE, MIN_MATCH_LENGTH};
use crate::{CodecConfig, TieBreak};

/// One chain head per possible two-byte prefix
const HEAD_SIZE: usize = 1 << 16;

/// Chain links are kept for the last 4096 positions (covers the largest window)
const LINK_SIZE: usize = 4096;
const LINK_MASK: usize = LINK_SIZE - 1;

const NIL: usize = usize::MAX;

/// Match finder that links earlier positions sharing the same first two bytes
///
/// The two bytes are used directly as the chain key, so a chain holds only
/// true candidates. Chains are walked nearest first and in full up to the
/// window edge, which keeps results identical to the brute-force search.
pub struct HashChainMatcher {
    window_size: usize,
    max_match_length: usize,
    tie_break: TieBreak,
    /// Most recent position for each two-byte prefix
    head: Vec<usize>,
    /// Previous position with the same prefix, indexed by `pos & LINK_MASK`
    prev: Vec<usize>,
    /// Positions `0..inserted` have been linked
    inserted: usize,
}

impl HashChainMatcher {
    pub fn new(config: &CodecConfig) -> Self {
        debug_assert!(MAX_WINDOW_SIZE < LINK_SIZE);
        Self {
            window_size: config.window_size(),
            max_match_length: config.max_match_length(),
            tie_break: config.tie_break(),
            head: vec![NIL; HEAD_SIZE],
            prev: vec![NIL; LINK_SIZE],
            inserted: 0,
        }
    }

    #[inline]
    fn key(input: &[u8], pos: usize) -> usize {
        (input[pos] as usize) << 8 | input[pos + 1] as usize
    }

    /// Link every position before `end` that has a two-byte prefix
    ///
    /// Positions more than a link ring behind `end` can never be reached
    /// from a cursor at or after `end`, so a forward jump skips them.
    fn insert_until(&mut self, input: &[u8], end: usize) {
        self.inserted = self.inserted.max(end.saturating_sub(LINK_SIZE));
        while self.inserted < end {
            let pos = self.inserted;
            if pos + 1 < input.len() {
                let key = Self::key(input, pos);
                self.prev[pos & LINK_MASK] = self.head[key];
                self.head[key] = pos;
            }
            self.inserted += 1;
        }
    }
}

impl MatchFinder for HashChainMatcher {
    fn find_match(&mut self, input: &[u8], cursor: usize) -> Option<Match> {
        if cursor >= input.len() {
            return None;
        }

        let limit = self.max_match_length.min(input.len() - cursor);
        if limit < MIN_MATCH_LENGTH {
            return None;
        }

        self.insert_until(input, cursor);

        let mut best: Option<Match> = None;
        let mut best_length = MIN_MATCH_LENGTH - 1;
        let mut candidate = self.head[Self::key(input, cursor)];

        while candidate != NIL {
            let source = candidate;
            let distance = cursor - source;
            if distance > self.window_size {
                break;
            }

            let length = match_length(input, source, cursor, limit);
            if replaces_best(length, best_length, self.tie_break) {
                best_length = length;
                best = Some(Match::new(distance as u16, length as u8));
                if length == limit && self.tie_break == TieBreak::Nearest {
                    break;
                }
            }

            // Links for positions inside the window are never overwritten:
            // a slot is reused only by a position 4096 bytes later.
            candidate = self.prev[source & LINK_MASK];
        }

        best
    }

    fn reset(&mut self) {
        self.head.fill(NIL);
        self.prev.fill(NIL);
        self.inserted = 0;
    }
}
