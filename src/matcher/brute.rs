use super::{match_length, replaces_best, MatchFinder};
use crate::format::{Match, MIN_MATCH_LENGTH};
use crate::{CodecConfig, TieBreak};

/// Exhaustive search of every position in the window
///
/// Cost is O(window * max_match_length) per cursor. Kept as the reference
/// strategy; [`HashChainMatcher`](super::HashChainMatcher) returns the same
/// matches faster.
#[derive(Clone, Debug)]
pub struct BruteForceMatcher {
    window_size: usize,
    max_match_length: usize,
    tie_break: TieBreak,
}

impl BruteForceMatcher {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            window_size: config.window_size(),
            max_match_length: config.max_match_length(),
            tie_break: config.tie_break(),
        }
    }
}

impl MatchFinder for BruteForceMatcher {
    fn find_match(&mut self, input: &[u8], cursor: usize) -> Option<Match> {
        find_match(input, cursor, self.window_size, self.max_match_length, self.tie_break)
    }
}

/// Longest match for `input[cursor..]` within `window_size` bytes behind it
///
/// Candidates are visited nearest first. With [`TieBreak::Nearest`] only a
/// strictly longer run replaces the current best; with
/// [`TieBreak::Farthest`] an equally long one does too.
pub fn find_match(
    input: &[u8],
    cursor: usize,
    window_size: usize,
    max_match_length: usize,
    tie_break: TieBreak,
) -> Option<Match> {
    if cursor >= input.len() {
        return None;
    }

    let limit = max_match_length.min(input.len() - cursor);
    if limit < MIN_MATCH_LENGTH {
        return None;
    }

    let start = cursor.saturating_sub(window_size);
    let mut best: Option<Match> = None;
    let mut best_length = MIN_MATCH_LENGTH - 1;

    // Only positions holding the cursor's byte can start a match
    for offset in memchr::memrchr_iter(input[cursor], &input[start..cursor]) {
        let source = start + offset;
        let length = match_length(input, source, cursor, limit);
        if replaces_best(length, best_length, tie_break) {
            best_length = length;
            best = Some(Match::new((cursor - source) as u16, length as u8));
            if length == limit && tie_break == TieBreak::Nearest {
                break;
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_at_start() {
        assert_eq!(find_match(b"aaaa", 0, 4095, 15, TieBreak::Nearest), None);
    }

    #[test]
    fn test_run_length_match() {
        // Single byte repeated: distance 1 covers the whole run
        let input = b"aaaaaaaaaa";
        assert_eq!(find_match(input, 1, 4095, 15, TieBreak::Nearest), Some(Match::new(1, 9)));
    }

    #[test]
    fn test_single_byte_never_matches() {
        // A lone repeated byte at the end is shorter than the minimum
        assert_eq!(find_match(b"abca", 3, 4095, 15, TieBreak::Nearest), None);
    }

    #[test]
    fn test_prefers_smaller_distance_on_tie() {
        // "ab" occurs at distance 6 and 3; neither extends to "abc"
        let input = b"abxabyab";
        assert_eq!(find_match(input, 6, 4095, 15, TieBreak::Nearest), Some(Match::new(3, 2)));
    }

    #[test]
    fn test_longer_match_wins_over_distance() {
        // "abcd" at distance 8, "ab" at distance 4
        let input = b"abcdabxyabcd";
        assert_eq!(find_match(input, 8, 4095, 15, TieBreak::Nearest), Some(Match::new(8, 4)));
    }

    #[test]
    fn test_window_limits_search() {
        let input = b"abcdefabc";
        assert_eq!(find_match(input, 6, 6, 15, TieBreak::Nearest), Some(Match::new(6, 3)));
        assert_eq!(find_match(input, 6, 5, 15, TieBreak::Nearest), None);
    }

    #[test]
    fn test_max_match_length_cap() {
        let input = [7u8; 40];
        assert_eq!(find_match(&input, 1, 4095, 15, TieBreak::Nearest), Some(Match::new(1, 15)));
        assert_eq!(find_match(&input, 1, 4095, 14, TieBreak::Nearest), Some(Match::new(1, 14)));
    }

    #[test]
    fn test_farthest_tie_break() {
        // "ab" at distance 6 and 3: the legacy order keeps the farther one
        let input = b"abxabyab";
        assert_eq!(find_match(input, 6, 4095, 15, TieBreak::Farthest), Some(Match::new(6, 2)));
        // A longer run still beats a farther one
        let input = b"abcdabxyabcd";
        assert_eq!(find_match(input, 8, 4095, 15, TieBreak::Farthest), Some(Match::new(8, 4)));
        // Every distance in a run matches; the farthest inside the window wins
        let input = [b'z'; 30];
        assert_eq!(find_match(&input, 20, 16, 15, TieBreak::Farthest), Some(Match::new(16, 10)));
    }

    #[test]
    fn test_cursor_past_end() {
        assert_eq!(find_match(b"ab", 2, 4095, 15, TieBreak::Nearest), None);
    }
}
