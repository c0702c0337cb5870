//! Recirculating delay that produces the dirty signal.
//!
//! ```text
//!              +-----------------------------+
//!              |                             |
//! input --(+)--+--> [ delay line ] --tap 0---+--(x gain)--+
//!          ^                        \                     |
//!          |                         +--tap 1             |
//!          +----------------------------------------------+
//! ```
//!
//! Tap 0 feeds the left dirty queue and the feedback path, tap 1 feeds the
//! right dirty queue. The input gain of the summing junction is fixed at 1.
//!
//! # Stability
//!
//! The loop gain is the feedback gain, so it must stay strictly below 1. The
//! network never applies more than [`MAX_FEEDBACK_GAIN`]; larger requests are
//! clamped and reported as [`GainUpdate::Clamped`].

use crate::block::BLOCK_SAMPLES;
use crate::channel::Channel;
use crate::delay::DelayLine;
use crate::math::{flush_denormal, ms_to_samples};
use crate::smoothing::SmoothedParam;

/// Highest feedback gain the network will apply.
pub const MAX_FEEDBACK_GAIN: f32 = 0.98;

/// Length of a gain change, in samples. A new gain is fully applied one
/// block after it is set.
const GAIN_RAMP_SAMPLES: u32 = BLOCK_SAMPLES as u32;

/// Result of [`FeedbackDelayNetwork::set_feedback_gain`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GainUpdate {
    /// The request was in range and is now the target.
    Applied,
    /// The request was out of range (or not a number); `applied` is the
    /// target actually in use.
    Clamped {
        /// Gain that was asked for.
        requested: f32,
        /// Gain now in use.
        applied: f32,
    },
}

impl GainUpdate {
    /// `true` for [`GainUpdate::Clamped`].
    pub fn is_clamped(&self) -> bool {
        matches!(self, GainUpdate::Clamped { .. })
    }
}

/// Delay line with attenuated re-injection and two output taps.
///
/// ```rust
/// use grit_core::{Channel, FeedbackDelayNetwork, GainUpdate};
///
/// let mut net = FeedbackDelayNetwork::new(48000.0, 500.0);
/// net.set_tap_time(Channel::Left, 100.0);
/// assert_eq!(net.set_feedback_gain(0.5), GainUpdate::Applied);
/// assert!(net.set_feedback_gain(1.2).is_clamped());
/// ```
#[derive(Debug, Clone)]
pub struct FeedbackDelayNetwork {
    line: DelayLine,
    taps: [usize; Channel::COUNT],
    gain: SmoothedParam,
    last_request: f32,
    sample_rate: f32,
}

impl FeedbackDelayNetwork {
    /// Default tap time for both channels.
    pub const DEFAULT_TAP_MS: f32 = 200.0;

    /// Creates a silent network able to delay up to `max_delay_ms`.
    ///
    /// Both taps start at [`Self::DEFAULT_TAP_MS`] (or the maximum, if
    /// shorter) and the gain at 0.
    pub fn new(sample_rate: f32, max_delay_ms: f32) -> Self {
        let mut net = Self {
            line: DelayLine::from_time(sample_rate, max_delay_ms),
            taps: [1; Channel::COUNT],
            gain: SmoothedParam::with_ramp(0.0, GAIN_RAMP_SAMPLES),
            last_request: 0.0,
            sample_rate,
        };
        for channel in Channel::ALL {
            net.set_tap_time(channel, Self::DEFAULT_TAP_MS);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            max_delay_ms,
            capacity = net.line.capacity(),
            "feedback network created"
        );

        net
    }

    /// Sets the feedback gain target.
    ///
    /// The target is clamped into `[0, MAX_FEEDBACK_GAIN]`; non-finite
    /// requests leave the target unchanged. The loop gain ramps linearly to
    /// the new target and reaches it within one block.
    pub fn set_feedback_gain(&mut self, gain: f32) -> GainUpdate {
        let applied = if gain.is_finite() {
            gain.clamp(0.0, MAX_FEEDBACK_GAIN)
        } else {
            self.gain.target()
        };
        self.gain.set_target(applied);

        let changed = gain.to_bits() != self.last_request.to_bits();
        self.last_request = gain;

        if applied.to_bits() == gain.to_bits() {
            return GainUpdate::Applied;
        }

        #[cfg(feature = "tracing")]
        if changed && (gain >= 1.0 || gain.is_nan()) {
            tracing::warn!(
                requested = gain,
                applied,
                "feedback gain >= 1 would be unstable, clamped"
            );
        }
        #[cfg(not(feature = "tracing"))]
        let _ = changed;

        GainUpdate::Clamped {
            requested: gain,
            applied,
        }
    }

    /// Gain target currently in force.
    pub fn feedback_gain(&self) -> f32 {
        self.gain.target()
    }

    /// Loop gain applied to the most recent sample.
    pub fn applied_gain(&self) -> f32 {
        self.gain.get()
    }

    /// Sets the tap for `channel` in milliseconds.
    ///
    /// The time is rounded to whole samples and clamped to
    /// `[1, capacity - 1]`. Returns the tap length in samples.
    pub fn set_tap_time(&mut self, channel: Channel, ms: f32) -> usize {
        let samples = if ms.is_finite() {
            libm::roundf(ms_to_samples(ms.max(0.0), self.sample_rate)) as usize
        } else {
            self.taps[channel.index()]
        };
        let max = self.line.capacity().saturating_sub(1).max(1);
        let tap = samples.clamp(1, max);
        self.taps[channel.index()] = tap;
        tap
    }

    /// Tap length for `channel` in samples.
    pub fn tap_samples(&self, channel: Channel) -> usize {
        self.taps[channel.index()]
    }

    /// Delay line length in samples.
    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }

    /// Runs one input sample, returning the `(left, right)` dirty taps.
    #[inline]
    pub fn process(&mut self, input: f32) -> (f32, f32) {
        let left = self.line.read(self.taps[Channel::Left.index()]);
        let right = self.line.read(self.taps[Channel::Right.index()]);
        let gain = self.gain.advance();
        self.line.write(flush_denormal(input + left * gain));
        (left, right)
    }

    /// Runs a block. All slices must have the same length.
    pub fn process_block(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(input.len(), left.len());
        debug_assert_eq!(input.len(), right.len());
        for ((&x, l), r) in input.iter().zip(left.iter_mut()).zip(right.iter_mut()) {
            (*l, *r) = self.process(x);
        }
    }

    /// Silences the line and snaps the gain to its target.
    pub fn reset(&mut self) {
        self.line.clear();
        self.gain.snap_to_target();
    }
}
