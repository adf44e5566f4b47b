use crate::error::Result;
use crate::format::{Token, TokenWriter};
use crate::matcher::{new_match_finder, MatchFinder};
use crate::{CodecConfig, CodecStats};
use std::io::{BufWriter, Write};

/// Greedy left-to-right encoder
///
/// At every position the longest match in the window is taken as a
/// reference; positions without a match become literals. There is no
/// lookahead or re-parsing of earlier choices.
pub struct Encoder {
    config: CodecConfig,
    finder: Box<dyn MatchFinder>,
}

impl Encoder {
    pub fn new(config: CodecConfig) -> Self {
        let finder = new_match_finder(&config);
        Self { config, finder }
    }

    /// Split `input` into the token sequence the encoder would emit
    pub fn tokenize(&mut self, input: &[u8]) -> Vec<Token> {
        self.finder.reset();
        let mut tokens = Vec::new();
        let mut cursor = 0;

        while cursor < input.len() {
            let token = self.next_token(input, cursor);
            cursor += token.uncompressed_size();
            tokens.push(token);
        }
        tokens
    }

    /// Compress `input`, writing the token stream to `output`
    ///
    /// On error the bytes already written to `output` are not a valid
    /// stream and should be discarded.
    pub fn encode<W: Write>(&mut self, input: &[u8], output: W) -> Result<CodecStats> {
        tracing::debug!(
            input_bytes = input.len(),
            window = self.config.window_size(),
            strategy = ?self.config.strategy(),
            tie_break = ?self.config.tie_break(),
            "encoding"
        );

        let writer = BufWriter::with_capacity(self.config.buffer_size(), output);
        let mut tokens = TokenWriter::with_capacity(writer, self.config.buffer_size());
        let mut stats = CodecStats { input_bytes: input.len() as u64, ..Default::default() };

        self.finder.reset();
        let mut cursor = 0;
        while cursor < input.len() {
            let token = self.next_token(input, cursor);
            tokens.write_token(&token)?;
            stats.record(&token);
            cursor += token.uncompressed_size();
        }

        stats.output_bytes = tokens.bytes_written();
        // Pads the last byte and flushes through the BufWriter
        tokens.finish()?;

        tracing::debug!(
            output_bytes = stats.output_bytes,
            literals = stats.literals,
            references = stats.references,
            "encoding complete"
        );
        Ok(stats)
    }

    /// Reference for the longest match at `cursor`, otherwise the literal byte
    fn next_token(&mut self, input: &[u8], cursor: usize) -> Token {
        match self.finder.find_match(input, cursor) {
            Some(m) => {
                tracing::trace!(
                    cursor,
                    distance = m.distance,
                    length = m.length,
                    overlap = m.is_overlapping(),
                    "match"
                );
                Token::from(m)
            }
            None => Token::Literal(input[cursor]),
        }
    }
}
