/// Ring size; one more than the largest distance a reference can carry
const WINDOW_SIZE: usize = 4096;
const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// 4KB circular buffer holding the most recent decoded bytes
pub struct SlidingWindow {
    buffer: Box<[u8; WINDOW_SIZE]>,
    /// Next write position (0-4095)
    write_pos: usize,
    /// Total bytes ever written
    total_written: u64,
}

impl SlidingWindow {
    pub fn new() -> Self {
        Self { buffer: Box::new([0u8; WINDOW_SIZE]), write_pos: 0, total_written: 0 }
    }

    /// Add a single byte to the window
    #[inline]
    pub fn push_byte(&mut self, byte: u8) {
        self.buffer[self.write_pos] = byte;
        self.write_pos = (self.write_pos + 1) & WINDOW_MASK;
        self.total_written += 1;
    }

    /// Byte `distance` positions behind the next write (1 = most recent)
    #[inline]
    pub fn byte_at(&self, distance: u16) -> u8 {
        debug_assert!(distance >= 1 && distance as u64 <= self.available() as u64);
        self.buffer[(self.write_pos + WINDOW_SIZE - distance as usize) & WINDOW_MASK]
    }

    /// Replay a back-reference one byte at a time
    ///
    /// Each step reads `distance` bytes behind the current end and appends
    /// that byte before the next step, so when `length > distance` the copy
    /// reads bytes it produced itself (run-length patterns). Every produced
    /// byte is passed to `emit` in order.
    pub fn copy_match<F: FnMut(u8)>(&mut self, distance: u16, length: u8, mut emit: F) {
        debug_assert!(distance >= 1 && (distance as usize) < WINDOW_SIZE);

        for _ in 0..length {
            let byte = self.byte_at(distance);
            self.push_byte(byte);
            emit(byte);
        }
    }

    /// Get available window size
    pub fn available(&self) -> usize {
        self.total_written.min(WINDOW_SIZE as u64) as usize
    }

    /// Get total bytes written
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Reset the window
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.total_written = 0;
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}
