use super::window::SlidingWindow;
use crate::error::{Error, Result};
use crate::format::{Token, TokenReader, MAX_MATCH_LENGTH};
use crate::{CodecConfig, CodecStats};
use std::io::{BufReader, BufWriter, Read, Write};

/// Rebuilds the original bytes from a token stream
///
/// Decoded bytes go straight to the output sink; the last 4096 of them are
/// kept in a [`SlidingWindow`] so references can be replayed.
pub struct Decoder {
    config: CodecConfig,
    window: SlidingWindow,
}

impl Decoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config, window: SlidingWindow::new() }
    }

    /// Decode the whole token stream in `input`, writing the result to `output`
    ///
    /// Decoding stops at the end of `input`. A stream that ends inside a
    /// token, or a reference pointing before the start of the output or
    /// beyond the configured window, fails the whole call; bytes already
    /// written to `output` should then be discarded.
    pub fn decode<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<CodecStats> {
        tracing::debug!(window = self.config.window_size(), "decoding");

        self.window.clear();
        let reader = BufReader::with_capacity(self.config.buffer_size(), input);
        let mut tokens = TokenReader::new(reader);
        let mut writer = BufWriter::with_capacity(self.config.buffer_size(), output);
        let mut stats = CodecStats::default();

        while let Some(token) = tokens.next_token()? {
            self.apply(&token, &mut writer)?;
            stats.record(&token);
        }
        writer.flush()?;

        stats.input_bytes = tokens.bytes_read();
        stats.output_bytes = self.window.total_written();

        tracing::debug!(
            input_bytes = stats.input_bytes,
            output_bytes = stats.output_bytes,
            "decoding complete"
        );
        Ok(stats)
    }

    /// Append the bytes one token stands for
    fn apply<W: Write>(&mut self, token: &Token, output: &mut W) -> Result<()> {
        match *token {
            Token::Literal(byte) => {
                self.window.push_byte(byte);
                output.write_all(&[byte])?;
            }
            Token::Reference { distance, length } => {
                self.check_reference(distance)?;
                tracing::trace!(distance, length, "copy");

                let mut run = [0u8; MAX_MATCH_LENGTH];
                let mut produced = 0;
                self.window.copy_match(distance, length, |byte| {
                    run[produced] = byte;
                    produced += 1;
                });
                output.write_all(&run[..produced])?;
            }
        }
        Ok(())
    }

    fn check_reference(&self, distance: u16) -> Result<()> {
        let available = self.window.total_written();
        if distance == 0 || distance as u64 > available {
            return Err(Error::InvalidBackReference { distance, available });
        }
        if distance as usize > self.config.window_size() {
            return Err(Error::DistanceExceedsWindow {
                distance,
                window: self.config.window_size() as u16,
            });
        }
        Ok(())
    }
}
