//! Linear parameter ramps.
//!
//! Block-rate parameter updates would otherwise step the per-sample gain
//! once every [`BLOCK_SAMPLES`](crate::BLOCK_SAMPLES) samples, which is
//! audible as zipper noise on the feedback path. A ramp spreads the step
//! over a fixed number of samples, so a new value is fully in force a known
//! number of samples after it is set.

/// A scalar that moves toward its target at a constant rate.
///
/// ```rust
/// use grit_core::SmoothedParam;
///
/// let mut gain = SmoothedParam::with_ramp(0.0, 128);
/// gain.set_target(0.5);
/// for _ in 0..128 {
///     gain.advance();
/// }
/// assert_eq!(gain.get(), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    increment: f32,
    remaining: u32,
    ramp_samples: u32,
}

impl SmoothedParam {
    /// Creates an unsmoothed parameter (changes apply instantly).
    pub fn new(initial: f32) -> Self {
        Self::with_ramp(initial, 0)
    }

    /// Creates a parameter whose changes take `ramp_samples` samples.
    pub fn with_ramp(initial: f32, ramp_samples: u32) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: 0.0,
            remaining: 0,
            ramp_samples,
        }
    }

    /// Sets the value to ramp toward.
    ///
    /// Setting the current target again does not restart the ramp.
    pub fn set_target(&mut self, target: f32) {
        if target.to_bits() == self.target.to_bits() {
            return;
        }
        self.target = target;
        if self.ramp_samples == 0 {
            self.snap_to_target();
        } else {
            self.increment = (target - self.current) / self.ramp_samples as f32;
            self.remaining = self.ramp_samples;
        }
    }

    /// Sets target and current value together.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.snap_to_target();
    }

    /// Advances one sample and returns the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else {
                self.current + self.increment
            };
        }
        self.current
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// `true` once the ramp has reached its target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.remaining == 0
    }

    /// Jumps to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.increment = 0.0;
        self.remaining = 0;
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
