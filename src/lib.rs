pub mod bits;
pub mod codec;
pub mod error;
pub mod format;
pub mod matcher;

pub use codec::{Decoder, Encoder};
pub use error::{Error, Result};
pub use format::{Match, Token, MAX_MATCH_LENGTH, MAX_WINDOW_SIZE, MIN_MATCH_LENGTH};
pub use matcher::{new_match_finder, MatchFinder};

/// Match search strategy used by the encoder
///
/// Both strategies produce byte-identical output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Scan every window position (reference search, slow for large windows)
    BruteForce,
    /// Follow chains of positions sharing the same two leading bytes
    #[default]
    HashChain,
}

/// Which match wins when several distances give the same longest run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Smallest distance
    #[default]
    Nearest,
    /// Largest distance, as written by the legacy encoder
    Farthest,
}

/// Configuration shared by the encoder and decoder
///
/// The window size is not stored in the stream: both sides must be built
/// from the same configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    window_size: usize,
    max_match_length: usize,
    strategy: MatchStrategy,
    tie_break: TieBreak,
    buffer_size: usize,
}

impl CodecConfig {
    /// Create a configuration for the given window size
    ///
    /// Sizes above 4095 are clamped to 4095; zero is rejected.
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::InvalidWindowSize(window_size));
        }
        Ok(Self { window_size: window_size.min(MAX_WINDOW_SIZE), ..Default::default() })
    }

    /// Settings that reproduce the legacy encoder's streams byte for byte
    ///
    /// The legacy search never tries the full 15-byte length and keeps the
    /// farthest of equally long matches.
    pub fn legacy(window_size: usize) -> Result<Self> {
        Ok(Self::new(window_size)?
            .with_max_match_length(MAX_MATCH_LENGTH - 1)?
            .with_tie_break(TieBreak::Farthest))
    }

    /// Set the longest run a single reference may cover (2-15, larger values clamp)
    pub fn with_max_match_length(mut self, max_match_length: usize) -> Result<Self> {
        if max_match_length < MIN_MATCH_LENGTH {
            return Err(Error::InvalidMatchLength(max_match_length));
        }
        self.max_match_length = max_match_length.min(MAX_MATCH_LENGTH);
        Ok(self)
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Buffer size for I/O operations
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn max_match_length(&self) -> usize {
        self.max_match_length
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            window_size: MAX_WINDOW_SIZE,
            max_match_length: MAX_MATCH_LENGTH,
            strategy: MatchStrategy::HashChain,
            tie_break: TieBreak::Nearest,
            buffer_size: 128 * 1024,
        }
    }
}

/// Statistics from a compress or decompress operation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodecStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub literals: u64,
    pub references: u64,
    /// Uncompressed bytes covered by references
    pub matched_bytes: u64,
}

impl CodecStats {
    pub(crate) fn record(&mut self, token: &Token) {
        match token {
            Token::Literal(_) => self.literals += 1,
            Token::Reference { length, .. } => {
                self.references += 1;
                self.matched_bytes += *length as u64;
            }
        }
    }
}

/// Compress `input` into a new buffer
pub fn compress(input: &[u8], config: &CodecConfig) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    Encoder::new(config.clone()).encode(input, &mut output)?;
    Ok(output)
}

/// Decompress a complete token stream into a new buffer
pub fn decompress(input: &[u8], config: &CodecConfig) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    Decoder::new(config.clone()).decode(input, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size_clamped() {
        assert_eq!(CodecConfig::new(10_000).unwrap(), CodecConfig::new(4095).unwrap());
        assert_eq!(CodecConfig::new(1).unwrap().window_size(), 1);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(CodecConfig::new(0), Err(Error::InvalidWindowSize(0))));
    }

    #[test]
    fn test_max_match_length_bounds() {
        let config = CodecConfig::default();
        assert!(matches!(
            config.clone().with_max_match_length(1),
            Err(Error::InvalidMatchLength(1))
        ));
        assert_eq!(config.clone().with_max_match_length(99).unwrap().max_match_length(), 15);
        assert_eq!(config.with_max_match_length(14).unwrap().max_match_length(), 14);
    }

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.window_size(), 4095);
        assert_eq!(config.max_match_length(), 15);
        assert_eq!(config.strategy(), MatchStrategy::HashChain);
        assert_eq!(config.tie_break(), TieBreak::Nearest);
    }

    #[test]
    fn test_legacy_config() {
        let config = CodecConfig::legacy(100).unwrap();
        assert_eq!(config.window_size(), 100);
        assert_eq!(config.max_match_length(), 14);
        assert_eq!(config.tie_break(), TieBreak::Farthest);
        assert!(matches!(CodecConfig::legacy(0), Err(Error::InvalidWindowSize(0))));
    }

    #[test]
    fn test_compress_decompress() {
        let config = CodecConfig::new(64).unwrap();
        let data = b"to be or not to be, that is the question".to_vec();
        let packed = compress(&data, &config).unwrap();
        assert_eq!(decompress(&packed, &config).unwrap(), data);
    }
}
