pub mod stream;
pub mod tokens;

pub use stream::{TokenReader, TokenWriter};
pub use tokens::{Match, Token, MAX_MATCH_LENGTH, MAX_WINDOW_SIZE, MIN_MATCH_LENGTH};
