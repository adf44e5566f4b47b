use super::tokens::{Token, DISTANCE_BITS, LENGTH_BITS, MAX_MATCH_LENGTH, MAX_WINDOW_SIZE};
use crate::bits::{BitReader, BitWriter};
use crate::error::Result;
use std::io::{Read, Write};

/// Serialises tokens onto a bit stream
///
/// A reference is written as a set flag bit followed by 16 bits: the top 8
/// bits of the distance, then the low 4 bits of the distance and the 4-bit
/// length packed into one byte.
pub struct TokenWriter<W: Write> {
    bits: BitWriter<W>,
}

impl<W: Write> TokenWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { bits: BitWriter::new(inner) }
    }

    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        Self { bits: BitWriter::with_capacity(inner, capacity) }
    }

    /// Append one token
    ///
    /// Reference fields must fit their widths: distance at most 4095 and
    /// length at most 15.
    pub fn write_token(&mut self, token: &Token) -> Result<()> {
        match *token {
            Token::Literal(byte) => {
                self.bits.write_bit(false)?;
                self.bits.write_byte(byte)
            }
            Token::Reference { distance, length } => {
                debug_assert!(
                    distance as usize <= MAX_WINDOW_SIZE,
                    "distance {} too wide",
                    distance
                );
                debug_assert!(length as usize <= MAX_MATCH_LENGTH, "length {} too wide", length);
                self.bits.write_bit(true)?;
                self.bits.write_byte((distance >> 4) as u8)?;
                self.bits.write_byte((((distance & 0x0F) as u8) << 4) | (length & 0x0F))
            }
        }
    }

    /// Bytes produced so far, counting a partially filled final byte
    pub fn bytes_written(&self) -> u64 {
        self.bits.bytes_written()
    }

    /// Pad, flush, and return the inner writer
    pub fn finish(self) -> Result<W> {
        self.bits.finish()
    }
}

/// Parses tokens from a bit stream
pub struct TokenReader<R: Read> {
    bits: BitReader<R>,
}

impl<R: Read> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        Self { bits: BitReader::new(reader) }
    }

    /// Read the next token, or `None` at the clean end of the stream
    ///
    /// The stream carries no terminator: it ends when the source runs out
    /// at a token boundary (ignoring zero padding in the last byte). A
    /// source that runs out inside a token is an error.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.bits.is_exhausted()? {
            return Ok(None);
        }

        let flag = match self.bits.read_bit()? {
            Some(flag) => flag,
            None => return Ok(None),
        };

        if !flag {
            return Ok(Some(Token::Literal(self.bits.read_byte()?)));
        }

        let distance = self.bits.read_bits(DISTANCE_BITS)? as u16;
        let length = self.bits.read_bits(LENGTH_BITS)? as u8;
        Ok(Some(Token::Reference { distance, length }))
    }

    /// Bytes consumed from the source so far
    pub fn bytes_read(&self) -> u64 {
        self.bits.bytes_read()
    }
}

impl<R: Read> Iterator for TokenReader<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
