/// Largest distance a reference can carry (12-bit field)
pub const MAX_WINDOW_SIZE: usize = (1 << DISTANCE_BITS) - 1;

/// Largest length a reference can carry (4-bit field)
pub const MAX_MATCH_LENGTH: usize = (1 << LENGTH_BITS) - 1;

/// Shortest run the encoder turns into a reference
pub const MIN_MATCH_LENGTH: usize = 2;

pub const DISTANCE_BITS: u8 = 12;
pub const LENGTH_BITS: u8 = 4;

/// A candidate back-reference found by a match finder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    /// Bytes back from the cursor to the start of the run (1-4095)
    pub distance: u16,
    /// Bytes covered by the run (2-15)
    pub length: u8,
}

impl Match {
    pub fn new(distance: u16, length: u8) -> Self {
        debug_assert!(distance >= 1 && distance as usize <= MAX_WINDOW_SIZE);
        debug_assert!(length as usize <= MAX_MATCH_LENGTH);
        Self { distance, length }
    }

    /// Whether the run reads past its own start while being copied
    pub fn is_overlapping(&self) -> bool {
        (self.distance as usize) < self.length as usize
    }
}

impl From<Match> for Token {
    fn from(m: Match) -> Self {
        Token::Reference { distance: m.distance, length: m.length }
    }
}

/// Represents a single token in the stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// A literal byte (flag 0, 8 bits)
    Literal(u8),
    /// Copy `length` bytes from `distance` bytes back (flag 1, 12 + 4 bits)
    Reference { distance: u16, length: u8 },
}

impl Token {
    /// Returns the uncompressed size this token represents
    pub fn uncompressed_size(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Reference { length, .. } => *length as usize,
        }
    }

    /// Size of this token on the wire, in bits
    pub fn encoded_bits(&self) -> u32 {
        match self {
            Token::Literal(_) => 9,
            Token::Reference { .. } => 1 + DISTANCE_BITS as u32 + LENGTH_BITS as u32,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Literal(byte) if byte.is_ascii_graphic() || *byte == b' ' => {
                write!(f, "L '{}'", *byte as char)
            }
            Token::Literal(byte) => write!(f, "L 0x{:02x}", byte),
            Token::Reference { distance, length } => write!(f, "R d={} l={}", distance, length),
        }
    }
}
