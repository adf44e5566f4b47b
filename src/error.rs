use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Invalid window size: {0} (must be 1-4095)")]
    InvalidWindowSize(usize),

    #[error("Invalid maximum match length: {0} (must be 2-15)")]
    InvalidMatchLength(usize),

    // Token stream errors
    #[error("Back-reference distance {distance} exceeds available output {available}")]
    InvalidBackReference { distance: u16, available: u64 },

    #[error("Back-reference distance {distance} exceeds window size {window}")]
    DistanceExceedsWindow { distance: u16, window: u16 },

    /// The token stream ended part way through a token
    #[error("Unexpected end of input")]
    UnexpectedEof,
}

pub type Result<T> = std::result::Result<T, Error>;
