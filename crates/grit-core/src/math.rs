//! Sample conversion and small numeric helpers.
//!
//! Blocks carry raw signed 16-bit samples; every stage that does arithmetic
//! works in normalized `f32`. The two conversions are deliberately asymmetric:
//! reading divides by 32768 so the full `i16` range lands in `[-1, 1)`, while
//! writing multiplies by 32767 so a full-scale `1.0` never wraps.

use libm::{expf, logf};

/// Divisor used when normalizing a raw sample into `[-1, 1)`.
pub const NORMALIZE_SCALE: f32 = 32768.0;

/// Multiplier used when writing a normalized value back into a raw sample.
pub const DENORMALIZE_SCALE: f32 = 32767.0;

/// Convert a raw block sample to the normalized float range.
///
/// # Example
///
/// ```rust
/// use grit_core::sample_to_float;
///
/// assert_eq!(sample_to_float(0), 0.0);
/// assert_eq!(sample_to_float(i16::MIN), -1.0);
/// assert!(sample_to_float(i16::MAX) < 1.0);
/// ```
#[inline]
pub fn sample_to_float(sample: i16) -> f32 {
    f32::from(sample) / NORMALIZE_SCALE
}

/// Convert a normalized float back into a raw block sample.
///
/// The value is saturated to `[-1, 1]` first, so out-of-range input clips
/// instead of wrapping. The final cast truncates toward zero.
#[inline]
pub fn float_to_sample(value: f32) -> i16 {
    (saturate(value) * DENORMALIZE_SCALE) as i16
}

/// Saturating clamp to `[-1, 1]`.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn saturate(x: f32) -> f32 {
    x.clamp(-1.0, 1.0)
}

/// Convert decibels to linear gain.
///
/// ```rust
/// use grit_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels (floored at -200 dB).
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Convert milliseconds to a (fractional) sample count.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Flush values in the subnormal neighbourhood to zero.
///
/// A decaying feedback loop drifts toward zero forever; once the values go
/// subnormal, float arithmetic gets dramatically slower on most CPUs.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_endpoints() {
        assert_eq!(float_to_sample(1.0), 32767);
        assert_eq!(float_to_sample(-1.0), -32767);
        assert_eq!(float_to_sample(0.0), 0);
        assert_eq!(sample_to_float(-32768), -1.0);
    }

    #[test]
    fn float_to_sample_saturates() {
        assert_eq!(float_to_sample(4.0), 32767);
        assert_eq!(float_to_sample(-4.0), -32767);
        assert_eq!(float_to_sample(f32::NAN), 0);
    }

    #[test]
    fn round_trip_is_within_one_lsb() {
        for raw in [-32768_i16, -12345, -1, 0, 1, 255, 16383, 32767] {
            let back = float_to_sample(sample_to_float(raw));
            assert!(
                (i32::from(back) - i32::from(raw)).abs() <= 1,
                "{raw} came back as {back}"
            );
        }
    }

    #[test]
    fn db_conversions_are_inverse() {
        for db in [-40.0_f32, -6.0, -1.0, 0.0, 3.0] {
            assert!((linear_to_db(db_to_linear(db)) - db).abs() < 1e-3);
        }
    }

    #[test]
    fn ms_to_samples_at_48k() {
        assert_eq!(ms_to_samples(1.0, 48000.0), 48.0);
        assert_eq!(ms_to_samples(200.0, 44100.0), 8820.0);
    }

    #[test]
    fn flush_denormal_zeroes_tiny_values() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }
}
