//! Random sources for the distortion stage.

/// A stream of uniformly distributed 32-bit words.
///
/// Only [`next_u32`](Self::next_u32) is required; the range helpers are
/// derived from it.
pub trait RandomSource {
    /// Next raw word.
    fn next_u32(&mut self) -> u32;

    /// Uniform integer in `[0, bound)`. Returns 0 when `bound` is 0.
    #[inline]
    fn below(&mut self, bound: u32) -> u32 {
        // Multiply-shift range reduction, no division and no modulo bias
        // worth caring about at these bounds.
        ((u64::from(self.next_u32()) * u64::from(bound)) >> 32) as u32
    }

    /// Uniform float in `[-1, 1]`.
    #[inline]
    fn bipolar(&mut self) -> f32 {
        // Top 16 bits; the low bits of an LCG are weak.
        let hi = (self.next_u32() >> 16) as u16;
        f32::from(hi) / 32767.5 - 1.0
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

/// 32-bit linear congruential generator (Numerical Recipes constants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Seed used by [`Default`].
    pub const DEFAULT_SEED: u32 = 0x1234_5678;

    /// Creates a generator from `seed`.
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Restarts the sequence from `seed`.
    pub fn reseed(&mut self, seed: u32) {
        self.state = seed;
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl RandomSource for Lcg {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state
    }
}
