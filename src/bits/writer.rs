use crate::error::Result;
use std::io::Write;

/// Completed bytes are handed to the inner writer in chunks of this size
const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Bit-level writer for the token stream
///
/// Writes bits MSB-first: the most significant bit of each field lands in the
/// highest free bit of the current byte.
pub struct BitWriter<W: Write> {
    inner: W,
    /// Completed bytes not yet handed to `inner`
    output: Vec<u8>,
    /// Flush threshold for `output`
    capacity: usize,
    /// Current byte being built
    current_byte: u8,
    /// Bits written to current byte (0-7)
    bits_in_byte: u8,
    /// Bytes already handed to `inner`
    flushed: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            output: Vec::with_capacity(capacity),
            capacity,
            current_byte: 0,
            bits_in_byte: 0,
            flushed: 0,
        }
    }

    /// Write the low `n` bits (0-32) of `value`, most significant first
    pub fn write_bits(&mut self, value: u32, n: u8) -> Result<()> {
        debug_assert!(n <= 32);

        let mut remaining = n;
        while remaining > 0 {
            let space = 8 - self.bits_in_byte;
            let to_write = remaining.min(space);
            let shift = remaining - to_write;

            let mask = (1u32 << to_write) - 1;
            let bits = ((value >> shift) & mask) as u8;
            self.current_byte |= bits << (space - to_write);

            self.bits_in_byte += to_write;
            remaining -= to_write;

            if self.bits_in_byte == 8 {
                self.output.push(self.current_byte);
                self.current_byte = 0;
                self.bits_in_byte = 0;
            }
        }

        if self.output.len() >= self.capacity {
            self.flush_buffer()?;
        }
        Ok(())
    }

    /// Write a single bit
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u32, 1)
    }

    /// Write 8 bits at the current (possibly unaligned) position
    #[inline]
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write_bits(byte as u32, 8)
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if !self.output.is_empty() {
            self.inner.write_all(&self.output)?;
            self.flushed += self.output.len() as u64;
            self.output.clear();
        }
        Ok(())
    }

    /// Pad the final byte with zero bits, flush, and return the inner writer
    pub fn finish(mut self) -> Result<W> {
        if self.bits_in_byte > 0 {
            self.output.push(self.current_byte);
            self.current_byte = 0;
            self.bits_in_byte = 0;
        }
        self.flush_buffer()?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Output length in bytes so far (including partial byte)
    pub fn bytes_written(&self) -> u64 {
        self.flushed + self.output.len() as u64 + u64::from(self.bits_in_byte > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_bits() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b110, 3).unwrap();
        writer.write_bits(0b10011, 5).unwrap();
        let output = writer.finish().unwrap();
        assert_eq!(output, vec![0xD3]);
    }

    #[test]
    fn test_write_cross_byte() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        writer.write_bits(0xABC, 12).unwrap();
        // 1 1010 1011 1100 + 3 bits padding
        let output = writer.finish().unwrap();
        assert_eq!(output, vec![0b1101_0101, 0b1110_0000]);
    }

    #[test]
    fn test_unaligned_byte() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(false).unwrap();
        writer.write_byte(b'a').unwrap();
        assert_eq!(writer.bytes_written(), 2);
        let output = writer.finish().unwrap();
        assert_eq!(output, vec![0b0011_0000, 0b1000_0000]);
    }

    #[test]
    fn test_empty_finish() {
        let writer = BitWriter::new(Vec::new());
        assert_eq!(writer.bytes_written(), 0);
        assert!(writer.finish().unwrap().is_empty());
    }

    #[test]
    fn test_small_capacity_flushes() {
        let mut writer = BitWriter::with_capacity(Vec::new(), 2);
        for byte in 0..10u8 {
            writer.write_bits(byte as u32, 8).unwrap();
        }
        assert_eq!(writer.bytes_written(), 10);
        let output = writer.finish().unwrap();
        assert_eq!(output, (0..10u8).collect::<Vec<_>>());
    }
}
