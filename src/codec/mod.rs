pub mod decoder;
pub mod encoder;
pub mod window;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use window::SlidingWindow;
