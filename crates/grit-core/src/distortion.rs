//! The per-sample glitch: probabilistic bit-crushing plus noise.
//!
//! For each dirty sample a die is rolled against `density`. On a hit the
//! sample is truncated to `2^bits` levels, where `bits` falls from 8 to 2 as
//! `noise_amount` rises, and uniform noise scaled by `noise_amount / 100` is
//! added on top. On a miss the sample passes through untouched.
//!
//! | noise_amount | bits | steps | noise peak |
//! |--------------|------|-------|------------|
//! | 0            | 8    | 256   | 0.0        |
//! | 20           | 6    | 64    | 0.2        |
//! | 40           | 4    | 16    | 0.4        |
//! | 60           | 2    | 4     | 0.6        |

use libm::truncf;

use crate::math::saturate;
use crate::params::{NOISE_MAX, ParamSnapshot};
use crate::rng::RandomSource;

/// Bit depth the crusher reduces to for a given `noise_amount`.
///
/// `clamp(8 - noise_amount / 10, 2, 8)` with integer division; values above
/// 60 are treated as 60.
#[inline]
pub const fn crush_bits(noise_amount: u8) -> u32 {
    let n = if noise_amount > NOISE_MAX {
        NOISE_MAX
    } else {
        noise_amount
    };
    let bits = 8 - (n / 10) as u32;
    if bits < 2 { 2 } else { bits }
}

/// Number of quantization levels per unit for a given `noise_amount`.
#[inline]
pub const fn crush_steps(noise_amount: u8) -> f32 {
    (1_u32 << crush_bits(noise_amount)) as f32
}

/// Truncate `sample` toward zero onto a grid of `steps` levels per unit.
#[inline]
pub fn quantize(sample: f32, steps: f32) -> f32 {
    truncf(sample * steps) / steps
}

/// Runs one dirty sample through the crusher.
///
/// Consumes one draw from `rng` for the density roll and, on a hit, one more
/// for the noise. The result is always within `[-1, 1]`.
///
/// ```rust
/// use grit_core::{Lcg, ParamSnapshot, distort};
///
/// let mut rng = Lcg::default();
/// let params = ParamSnapshot { density: 0, ..ParamSnapshot::default() };
/// assert_eq!(distort(0.3, &params, &mut rng), 0.3);
/// ```
#[inline]
pub fn distort<R: RandomSource + ?Sized>(sample: f32, params: &ParamSnapshot, rng: &mut R) -> f32 {
    if rng.below(100) >= u32::from(params.density) {
        return sample;
    }

    let crushed = quantize(sample, crush_steps(params.noise_amount));
    let noise = rng.bipolar() * f32::from(params.noise_amount) / 100.0;
    saturate(crushed + noise)
}
