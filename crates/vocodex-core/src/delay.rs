//! Fixed-length circular delay line.
//!
//! The echo reads the sample written exactly `len` samples ago, then
//! overwrites it with the new feedback value. No interpolation is needed
//! because the echo time never moves while running.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Heap-allocated delay line that never reallocates after construction.
///
/// # Example
///
/// ```rust
/// use vocodex_core::DelayLine;
///
/// let mut line = DelayLine::new(3);
/// assert_eq!(line.push(1.0), 0.0);
/// assert_eq!(line.push(0.0), 0.0);
/// assert_eq!(line.push(0.0), 0.0);
/// assert_eq!(line.push(0.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    pos: usize,
}

impl DelayLine {
    /// Create a delay of `len` samples. A zero length is bumped to one.
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            pos: 0,
        }
    }

    /// Create a delay from a time in milliseconds.
    pub fn from_ms(delay_ms: f32, sample_rate: f32) -> Self {
        Self::new(crate::math::ms_to_samples(delay_ms, sample_rate) as usize)
    }

    /// The sample that will be replaced by the next [`push`](Self::push).
    #[inline]
    pub fn peek(&self) -> f32 {
        self.buffer[self.pos]
    }

    /// Write `sample`, advance, and return the sample it replaced.
    #[inline]
    pub fn push(&mut self, sample: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        self.buffer[self.pos] = crate::math::flush_denormal(sample);
        self.pos += 1;
        if self.pos == self.buffer.len() {
            self.pos = 0;
        }
        delayed
    }

    /// Delay length in samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false; the line holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Zero the contents.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_exact_length() {
        let mut line = DelayLine::new(100);
        line.push(1.0);
        for _ in 0..98 {
            assert_eq!(line.push(0.0), 0.0);
        }
        assert_eq!(line.peek(), 1.0);
        assert_eq!(line.push(0.0), 1.0);
    }

    #[test]
    fn test_from_ms() {
        let line = DelayLine::from_ms(300.0, 48000.0);
        assert_eq!(line.len(), 14400);
    }

    #[test]
    fn test_zero_length_is_one() {
        let mut line = DelayLine::new(0);
        assert_eq!(line.len(), 1);
        line.push(0.5);
        assert_eq!(line.push(0.0), 0.5);
    }

    #[test]
    fn test_clear() {
        let mut line = DelayLine::new(4);
        line.push(1.0);
        line.clear();
        for _ in 0..4 {
            assert_eq!(line.push(0.0), 0.0);
        }
    }
}
