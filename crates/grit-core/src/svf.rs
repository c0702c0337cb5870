//! Input-conditioning low-pass.
//!
//! Topology-preserving transform state variable filter (Zavalishin, "The Art
//! of VA Filter Design", ch. 3), low-pass output only. The engine runs the
//! live input through it before splitting into the clean and dirty paths, so
//! the crusher works on a darker signal and the feedback loop loses top end
//! on every pass.

use core::f32::consts::PI;
use libm::tanf;

use crate::math::flush_denormal;

/// Lowest cutoff in Hz.
const MIN_CUTOFF: f32 = 20.0;

/// Lowest accepted resonance (Q).
pub const MIN_RESONANCE: f32 = 0.5;

/// Highest accepted resonance (Q).
pub const MAX_RESONANCE: f32 = 20.0;

/// Two-pole TPT low-pass filter.
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
    g: f32,
    k: f32,
    ic1eq: f32,
    ic2eq: f32,
}

impl StateVariableFilter {
    /// Creates a filter at 1 kHz, Q 0.707.
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff: 1000.0,
            resonance: core::f32::consts::FRAC_1_SQRT_2,
            g: 0.0,
            k: 0.0,
            ic1eq: 0.0,
            ic2eq: 0.0,
        };
        filter.update_coefficients();
        filter
    }

    /// Sets the cutoff in Hz, clamped to `[20, 0.49 * sample_rate]`.
    ///
    /// The upper bound wins at sample rates too low for that range.
    pub fn set_cutoff(&mut self, freq: f32) {
        self.cutoff = freq.max(MIN_CUTOFF).min(self.sample_rate * 0.49);
        self.update_coefficients();
    }

    /// Cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Sets Q, clamped to `[MIN_RESONANCE, MAX_RESONANCE]`.
    pub fn set_resonance(&mut self, q: f32) {
        self.resonance = q.clamp(MIN_RESONANCE, MAX_RESONANCE);
        self.update_coefficients();
    }

    /// Q.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    fn update_coefficients(&mut self) {
        self.g = tanf(PI * self.cutoff / self.sample_rate);
        self.k = 1.0 / self.resonance;
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let v3 = input - self.ic2eq;
        let v1 = (self.g * v3 + self.ic1eq) / (1.0 + self.g * (self.g + self.k));
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        v2
    }

    /// Clears the integrator state.
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rms_after_settle(filter: &mut StateVariableFilter, freq: f32, sr: f32) -> f32 {
        let n = 4800;
        let mut sum = 0.0;
        for i in 0..n {
            let x = libm::sinf(2.0 * PI * freq * i as f32 / sr);
            let y = filter.process(x);
            if i >= n / 2 {
                sum += y * y;
            }
        }
        libm::sqrtf(sum / (n / 2) as f32)
    }

    #[test]
    fn passes_dc() {
        let mut f = StateVariableFilter::new(48000.0);
        f.set_cutoff(500.0);
        let mut y = 0.0;
        for _ in 0..5000 {
            y = f.process(1.0);
        }
        assert!((y - 1.0).abs() < 1e-3, "dc gain {y}");
    }

    #[test]
    fn attenuates_above_cutoff() {
        let sr = 48000.0;
        let mut f = StateVariableFilter::new(sr);
        f.set_cutoff(500.0);
        f.set_resonance(0.7);
        let low = rms_after_settle(&mut f, 100.0, sr);
        f.reset();
        let high = rms_after_settle(&mut f, 8000.0, sr);
        assert!(high < low * 0.05, "low {low} high {high}");
    }

    #[test]
    fn parameters_clamp() {
        let mut f = StateVariableFilter::new(44100.0);
        f.set_cutoff(1e6);
        assert!(f.cutoff() < 22050.0);
        f.set_resonance(0.0);
        assert_eq!(f.resonance(), MIN_RESONANCE);
        f.set_resonance(100.0);
        assert_eq!(f.resonance(), MAX_RESONANCE);
    }

    #[test]
    fn very_low_sample_rate_clamps_to_nyquist() {
        let mut f = StateVariableFilter::new(32.0);
        f.set_cutoff(500.0);
        assert!(f.cutoff() <= 16.0);
        for _ in 0..1000 {
            assert!(f.process(1.0).is_finite());
        }
    }

    #[test]
    fn reset_clears_state() {
        let mut f = StateVariableFilter::new(44100.0);
        for _ in 0..100 {
            f.process(1.0);
        }
        f.reset();
        assert_eq!(f.process(0.0), 0.0);
    }
}
