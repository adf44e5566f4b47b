use crate::error::{Error, Result};
use std::io::{ErrorKind, Read};

/// Bit-level reader for the token stream
///
/// Bits are read MSB-first within each byte. Multi-bit fields are assembled
/// left to right: the first bit read becomes the most significant bit.
pub struct BitReader<R: Read> {
    reader: R,
    /// Unconsumed bits, right-aligned (the next bit is bit `bits_available - 1`)
    buffer: u64,
    /// Number of valid bits in buffer (0-64)
    bits_available: u8,
    /// Total bytes read (for error reporting)
    bytes_read: u64,
    /// The underlying reader has returned end-of-file
    drained: bool,
}

impl<R: Read> BitReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buffer: 0, bits_available: 0, bytes_read: 0, drained: false }
    }

    /// Try to hold at least `n` bits in the buffer
    ///
    /// Uses bulk refill: reads as many whole bytes as the buffer has room for.
    /// Stops quietly at end-of-file; callers decide whether a short buffer
    /// is an error.
    fn fill_buffer(&mut self, n: u8) -> Result<()> {
        debug_assert!(n <= 56, "Cannot request more than 56 bits at once");

        while self.bits_available < n && !self.drained {
            let bytes_to_read = ((64 - self.bits_available) / 8) as usize;
            let mut bulk_buf = [0u8; 8];

            match self.reader.read(&mut bulk_buf[..bytes_to_read]) {
                Ok(0) => self.drained = true,
                Ok(count) => {
                    for &byte in &bulk_buf[..count] {
                        self.buffer = (self.buffer << 8) | byte as u64;
                        self.bits_available += 8;
                    }
                    self.bytes_read += count as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {
                    // Retry on interrupt
                }
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(())
    }

    /// Read `n` bits (0-32) MSB-first
    ///
    /// Fails with [`Error::UnexpectedEof`] if the source ends before `n` bits
    /// are available.
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        debug_assert!(n <= 32, "Cannot read more than 32 bits at once");

        if n == 0 {
            return Ok(0);
        }

        self.fill_buffer(n)?;
        if self.bits_available < n {
            return Err(Error::UnexpectedEof);
        }

        self.bits_available -= n;
        let mask = (1u64 << n) - 1;
        Ok(((self.buffer >> self.bits_available) & mask) as u32)
    }

    /// Read a single bit, or `None` once the source has no more input
    #[inline]
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        self.fill_buffer(1)?;
        if self.bits_available == 0 {
            return Ok(None);
        }
        self.read_bits(1).map(|bit| Some(bit != 0))
    }

    /// Read the next 8 bits as a byte (no alignment, the stream is bit-packed)
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        self.read_bits(8).map(|v| v as u8)
    }

    /// Whether only writer padding remains
    ///
    /// True once the source is drained and fewer than 8 bits are left, all of
    /// them zero. The writer pads the final byte with zeros, so this is the
    /// clean end of a stream. Anything else left over must still be decoded
    /// (and fails as [`Error::UnexpectedEof`] if it is a truncated token).
    pub fn is_exhausted(&mut self) -> Result<bool> {
        self.fill_buffer(8)?;
        if self.bits_available >= 8 {
            return Ok(false);
        }
        let mask = (1u64 << self.bits_available) - 1;
        Ok(self.buffer & mask == 0)
    }

    /// Get position in bytes (approximate, for error reporting)
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out one byte per call
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match (self.0.split_first(), buf.first_mut()) {
                (Some((&byte, rest)), Some(slot)) => {
                    *slot = byte;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_read_bits_msb_first() {
        // Binary: 11010011 10101010 = 0xD3 0xAA
        let data = vec![0xD3, 0xAA];
        let mut reader = BitReader::new(data.as_slice());

        assert_eq!(reader.read_bits(3).unwrap(), 0b110);
        assert_eq!(reader.read_bits(5).unwrap(), 0b10011);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAA);
    }

    #[test]
    fn test_read_bit() {
        let data = vec![0b10110001];
        let mut reader = BitReader::new(data.as_slice());

        let bits: Vec<bool> = (0..8).map(|_| reader.read_bit().unwrap().unwrap()).collect();
        assert_eq!(bits, vec![true, false, true, true, false, false, false, true]);
        assert_eq!(reader.read_bit().unwrap(), None);
    }

    #[test]
    fn test_cross_byte_boundary() {
        let data = vec![0xAB, 0xCD];
        let mut reader = BitReader::new(data.as_slice());

        assert!(reader.read_bit().unwrap().unwrap());
        // Next 12 bits: 0101011 11001
        assert_eq!(reader.read_bits(12).unwrap(), 0b0101_0111_1001);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
    }

    #[test]
    fn test_read_bits_past_end() {
        let data = vec![0xFF];
        let mut reader = BitReader::new(data.as_slice());

        reader.read_bits(4).unwrap();
        assert!(matches!(reader.read_bits(12), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_empty_source() {
        let mut reader = BitReader::new(&[0u8; 0][..]);
        assert!(reader.is_exhausted().unwrap());
        assert_eq!(reader.read_bit().unwrap(), None);
    }

    #[test]
    fn test_is_exhausted_on_zero_padding() {
        // One flag bit plus a literal, then seven padding zeros
        let data = vec![0b0011_0000, 0b1000_0000];
        let mut reader = BitReader::new(data.as_slice());

        assert!(!reader.is_exhausted().unwrap());
        assert!(!reader.read_bit().unwrap().unwrap());
        assert_eq!(reader.read_byte().unwrap(), 0x61);
        assert!(reader.is_exhausted().unwrap());
    }

    #[test]
    fn test_is_exhausted_with_nonzero_remainder() {
        let data = vec![0b1000_0000];
        let mut reader = BitReader::new(data.as_slice());

        reader.read_bits(0).unwrap();
        assert!(!reader.is_exhausted().unwrap());
        assert!(reader.read_bit().unwrap().unwrap());
        // Seven zero bits remain
        assert!(reader.is_exhausted().unwrap());
    }

    #[test]
    fn test_zero_byte_is_not_padding() {
        // A whole zero byte can be the tail of a literal 0x00 token
        let data = vec![0x00, 0x00];
        let mut reader = BitReader::new(data.as_slice());

        assert!(!reader.is_exhausted().unwrap());
        assert!(!reader.read_bit().unwrap().unwrap());
        assert_eq!(reader.read_byte().unwrap(), 0x00);
        assert!(reader.is_exhausted().unwrap());
    }

    #[test]
    fn test_short_reads() {
        let data = [0x12, 0x34, 0x56];
        let mut reader = BitReader::new(Trickle(&data));

        assert_eq!(reader.read_bits(20).unwrap(), 0x12345);
        assert_eq!(reader.read_bits(4).unwrap(), 0x6);
        assert_eq!(reader.bytes_read(), 3);
        assert_eq!(reader.read_bit().unwrap(), None);
    }
}
