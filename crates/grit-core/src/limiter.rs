//! Output limiter and the queues the output stage drains.
//!
//! The limiter is the [`BlockSink`] the mixer hands finished blocks to. Each
//! channel has its own peak envelope with attack, hold and release times;
//! the gain is `min(1, threshold / envelope)` and whatever the envelope has
//! not caught yet is clipped at the threshold, so no sample leaves the
//! limiter above it.
//!
//! Processed blocks wait in one [`BlockQueue`] per channel until the output
//! stage pops them. When a queue is full the block is released to the pool
//! and counted as an overflow.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use libm::expf;

use crate::block::{BlockHandle, BlockPool};
use crate::channel::Channel;
use crate::math::{db_to_linear, float_to_sample, ms_to_samples, sample_to_float};
use crate::queue::{BlockQueue, BlockSink};
use crate::stats::EngineStats;

/// Envelope constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterSettings {
    /// Time for the envelope to rise toward a new peak.
    pub attack_ms: f32,
    /// Time the envelope stays at a peak before releasing.
    pub hold_ms: f32,
    /// Time for the envelope to fall back.
    pub release_ms: f32,
    /// Output ceiling in dBFS.
    pub threshold_db: f32,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            attack_ms: 5.0,
            hold_ms: 50.0,
            release_ms: 100.0,
            threshold_db: -1.0,
        }
    }
}

/// One-pole coefficient for a time constant in ms (0 means instant).
fn time_coeff(ms: f32, sample_rate: f32) -> f32 {
    let tau = ms_to_samples(ms, sample_rate);
    if tau < 1.0 { 0.0 } else { expf(-1.0 / tau) }
}

#[derive(Debug, Clone, Copy, Default)]
struct Envelope {
    level: f32,
    hold_left: u32,
}

/// Attack/hold/release peak limiter with per-channel output queues.
#[derive(Debug)]
pub struct Limiter {
    settings: LimiterSettings,
    threshold: f32,
    attack_coeff: f32,
    release_coeff: f32,
    hold_samples: u32,
    envelopes: [Envelope; Channel::COUNT],
    outputs: [BlockQueue; Channel::COUNT],
    stats: Arc<EngineStats>,
}

impl Limiter {
    /// Creates a limiter whose output queues hold `queue_depth` blocks each.
    pub fn new(
        settings: LimiterSettings,
        sample_rate: f32,
        queue_depth: usize,
        stats: Arc<EngineStats>,
    ) -> Self {
        Self {
            settings,
            threshold: db_to_linear(settings.threshold_db).min(1.0),
            attack_coeff: time_coeff(settings.attack_ms, sample_rate),
            release_coeff: time_coeff(settings.release_ms, sample_rate),
            hold_samples: ms_to_samples(settings.hold_ms.max(0.0), sample_rate) as u32,
            envelopes: [Envelope::default(); Channel::COUNT],
            outputs: [BlockQueue::new(queue_depth), BlockQueue::new(queue_depth)],
            stats,
        }
    }

    /// Envelope constants in use.
    pub fn settings(&self) -> &LimiterSettings {
        &self.settings
    }

    /// Linear output ceiling.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Current gain reduction for `channel` in dB (0 or negative).
    pub fn gain_reduction_db(&self, channel: Channel) -> f32 {
        let env = self.envelopes[channel.index()].level;
        if env > self.threshold {
            crate::math::linear_to_db(self.threshold / env)
        } else {
            0.0
        }
    }

    /// Limits one normalized sample on `channel`.
    #[inline]
    pub fn process_sample(&mut self, channel: Channel, x: f32) -> f32 {
        let env = &mut self.envelopes[channel.index()];
        let peak = x.abs();

        if peak > env.level {
            env.level = self.attack_coeff * env.level + (1.0 - self.attack_coeff) * peak;
            env.hold_left = self.hold_samples;
        } else if env.hold_left > 0 {
            env.hold_left -= 1;
        } else {
            env.level = self.release_coeff * env.level + (1.0 - self.release_coeff) * peak;
        }

        let gain = if env.level > self.threshold {
            self.threshold / env.level
        } else {
            1.0
        };
        (x * gain).clamp(-self.threshold, self.threshold)
    }

    /// Limits every sample of the block behind `block` in place.
    pub fn process_block(&mut self, pool: &mut BlockPool, block: &BlockHandle, channel: Channel) {
        for raw in pool.get_mut(block).samples_mut().iter_mut() {
            let y = self.process_sample(channel, sample_to_float(*raw));
            *raw = float_to_sample(y);
        }
    }

    /// Queue of finished blocks for `channel`.
    pub fn output_queue(&mut self, channel: Channel) -> &mut BlockQueue {
        &mut self.outputs[channel.index()]
    }

    /// Number of finished blocks waiting on `channel`.
    pub fn queued(&self, channel: Channel) -> usize {
        self.outputs[channel.index()].len()
    }

    /// Clears the envelopes and releases every queued block.
    pub fn reset(&mut self, pool: &mut BlockPool) {
        self.envelopes = [Envelope::default(); Channel::COUNT];
        for queue in &mut self.outputs {
            queue.drain_into(pool);
        }
    }
}

impl BlockSink for Limiter {
    fn accept(&mut self, pool: &mut BlockPool, block: BlockHandle, channel: Channel) {
        self.process_block(pool, &block, channel);
        if let Err(block) = self.outputs[channel.index()].push(block) {
            pool.release(block);
            self.stats.record_queue_overflow();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::BlockSource;

    fn limiter(depth: usize) -> (Limiter, Arc<EngineStats>) {
        let stats = Arc::new(EngineStats::new());
        let lim = Limiter::new(LimiterSettings::default(), 48000.0, depth, Arc::clone(&stats));
        (lim, stats)
    }

    #[test]
    fn quiet_signal_passes_untouched() {
        let (mut lim, _) = limiter(2);
        for i in 0..1000 {
            let x = 0.3 * ((i % 10) as f32 / 10.0);
            assert_eq!(lim.process_sample(Channel::Left, x), x);
        }
    }

    #[test]
    fn output_never_exceeds_threshold() {
        let (mut lim, _) = limiter(2);
        let thr = lim.threshold();
        for i in 0..48_000 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = lim.process_sample(Channel::Right, x);
            assert!(y.abs() <= thr + 1e-6);
        }
        assert!(lim.gain_reduction_db(Channel::Right) < 0.0);
    }

    #[test]
    fn gain_recovers_after_release() {
        let (mut lim, _) = limiter(2);
        for _ in 0..4800 {
            lim.process_sample(Channel::Left, 1.0);
        }
        assert!(lim.gain_reduction_db(Channel::Left) < -0.5);
        // hold (50 ms) then several release time constants
        for _ in 0..48_000 {
            lim.process_sample(Channel::Left, 0.1);
        }
        assert_eq!(lim.gain_reduction_db(Channel::Left), 0.0);
        assert_eq!(lim.process_sample(Channel::Left, 0.1), 0.1);
    }

    #[test]
    fn channels_are_independent() {
        let (mut lim, _) = limiter(2);
        for _ in 0..4800 {
            lim.process_sample(Channel::Left, 1.0);
        }
        assert_eq!(lim.gain_reduction_db(Channel::Right), 0.0);
    }

    #[test]
    fn accept_queues_then_overflows() {
        let (mut lim, stats) = limiter(1);
        let mut pool = BlockPool::new(4);

        for _ in 0..2 {
            let block = pool.acquire().unwrap();
            lim.accept(&mut pool, block, Channel::Left);
        }
        assert_eq!(lim.queued(Channel::Left), 1);
        assert_eq!(stats.snapshot().queue_overflows, 1);
        assert_eq!(pool.in_use(), 1);

        let h = lim.output_queue(Channel::Left).read_block().unwrap();
        pool.release(h);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn reset_releases_queued_blocks() {
        let (mut lim, _) = limiter(2);
        let mut pool = BlockPool::new(4);
        for channel in Channel::ALL {
            let block = pool.acquire().unwrap();
            lim.accept(&mut pool, block, channel);
        }
        lim.reset(&mut pool);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn zero_times_are_instant() {
        let stats = Arc::new(EngineStats::new());
        let settings = LimiterSettings {
            attack_ms: 0.0,
            hold_ms: 0.0,
            release_ms: 0.0,
            threshold_db: -6.0,
        };
        let mut lim = Limiter::new(settings, 48000.0, 1, stats);
        let y = lim.process_sample(Channel::Left, 1.0);
        assert!((y - lim.threshold()).abs() < 1e-6);
        assert_eq!(lim.process_sample(Channel::Left, 0.1), 0.1);
    }
}
