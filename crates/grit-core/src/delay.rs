//! Fixed-capacity circular delay line.
//!
//! The buffer is allocated once at construction and never reallocates. Reads
//! are whole-sample: taps are set in milliseconds and rounded once, so the
//! feedback network never needs interpolation.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Integer-tap circular delay line.
///
/// ```rust
/// use grit_core::DelayLine;
///
/// let mut line = DelayLine::new(4);
/// line.write(1.0);
/// line.write(2.0);
/// assert_eq!(line.read(1), 2.0);
/// assert_eq!(line.read(2), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    /// Slot the next write goes to.
    write_pos: usize,
}

impl DelayLine {
    /// Creates a silent line holding `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Delay size must be > 0");
        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Creates a line long enough for `max_ms` at `sample_rate`.
    pub fn from_time(sample_rate: f32, max_ms: f32) -> Self {
        let samples = (crate::ms_to_samples(max_ms, sample_rate) as usize).max(1) + 1;
        Self::new(samples)
    }

    /// Number of samples the line holds.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Sample written `delay` writes ago.
    ///
    /// `delay` is clamped to `[1, capacity]`.
    #[inline]
    pub fn read(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay.clamp(1, len);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Pushes one sample, overwriting the oldest.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Zeroes the buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
