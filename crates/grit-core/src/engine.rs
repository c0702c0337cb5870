//! Block-by-block execution of the signal graph.
//!
//! [`Engine`] owns every stage in [`TOPOLOGY`](crate::TOPOLOGY). Each call to
//! [`Engine::process_block`] snapshots the parameters once, then walks
//! [`SCHEDULE`], the compile-time execution order of that table:
//!
//! - input and filter produce the clean signal,
//! - the feedback mixer retargets the loop gain and the delay runs the
//!   dirty signal,
//! - the queue stages fill a clean and a dirty block per channel,
//! - the mixer blends each pair into the limiter,
//! - the output drains one limited block per channel into the host buffers.
//!
//! # Real-time Safety
//!
//! Everything is allocated in [`Engine::new`]. `process_block` only moves
//! handles between pre-sized queues, does arithmetic, and bumps atomics.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::block::{BLOCK_SAMPLES, BlockHandle, BlockPool};
use crate::channel::Channel;
use crate::feedback::FeedbackDelayNetwork;
use crate::limiter::{Limiter, LimiterSettings};
use crate::mixer::BlockMixer;
use crate::params::{ParamSnapshot, ParameterSet};
use crate::queue::BlockQueue;
use crate::rng::{Lcg, RandomSource};
use crate::stats::{EngineStats, StatsSnapshot};
use crate::svf::StateVariableFilter;
use crate::topology::{SCHEDULE, Stage};

/// Construction-time constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Blocks in the pool. A tick needs four at its peak.
    pub pool_blocks: usize,
    /// Capacity of each source and output queue, in blocks.
    pub queue_depth: usize,
    /// Longest tap the delay line can hold.
    pub max_delay_ms: f32,
    /// Initial tap times, indexed by channel.
    pub tap_ms: [f32; Channel::COUNT],
    /// Input low-pass cutoff.
    pub filter_cutoff_hz: f32,
    /// Input low-pass Q.
    pub filter_resonance: f32,
    /// Output limiter constants.
    pub limiter: LimiterSettings,
    /// Seed for the distortion random source.
    pub seed: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            pool_blocks: 60,
            queue_depth: 4,
            max_delay_ms: 500.0,
            tap_ms: [FeedbackDelayNetwork::DEFAULT_TAP_MS; Channel::COUNT],
            filter_cutoff_hz: 500.0,
            filter_resonance: 0.7,
            limiter: LimiterSettings::default(),
            seed: Lcg::DEFAULT_SEED,
        }
    }
}

/// The complete dirt engine.
#[derive(Debug)]
pub struct Engine<R = Lcg> {
    settings: EngineSettings,
    params: Arc<ParameterSet>,
    stats: Arc<EngineStats>,
    pool: BlockPool,
    filter: StateVariableFilter,
    network: FeedbackDelayNetwork,
    dirty: [BlockQueue; Channel::COUNT],
    clean: [BlockQueue; Channel::COUNT],
    mixer: BlockMixer<R>,
    limiter: Limiter,
    signal: [f32; BLOCK_SAMPLES],
    taps: [[f32; BLOCK_SAMPLES]; Channel::COUNT],
    staged: [Option<BlockHandle>; Channel::COUNT],
    last_params: ParamSnapshot,
    starved: bool,
}

impl Engine<Lcg> {
    /// Creates an engine using an [`Lcg`] seeded from `settings.seed`.
    pub fn new(settings: EngineSettings, params: Arc<ParameterSet>) -> Self {
        Self::with_rng(settings, params, Lcg::new(settings.seed))
    }
}

impl<R: RandomSource> Engine<R> {
    /// Creates an engine with a caller-supplied random source.
    ///
    /// `pool_blocks` and `queue_depth` are raised to at least 1.
    pub fn with_rng(settings: EngineSettings, params: Arc<ParameterSet>, rng: R) -> Self {
        let sr = settings.sample_rate;
        let depth = settings.queue_depth.max(1);
        let stats = Arc::new(EngineStats::new());

        let mut filter = StateVariableFilter::new(sr);
        filter.set_cutoff(settings.filter_cutoff_hz);
        filter.set_resonance(settings.filter_resonance);

        let mut network = FeedbackDelayNetwork::new(sr, settings.max_delay_ms);
        for channel in Channel::ALL {
            network.set_tap_time(channel, settings.tap_ms[channel.index()]);
        }
        let initial = params.snapshot();
        network.set_feedback_gain(initial.feedback);
        network.reset();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = sr,
            pool_blocks = settings.pool_blocks,
            queue_depth = depth,
            "engine created"
        );

        Self {
            settings,
            pool: BlockPool::new(settings.pool_blocks.clamp(1, BlockPool::MAX_CAPACITY)),
            filter,
            network,
            dirty: [BlockQueue::new(depth), BlockQueue::new(depth)],
            clean: [BlockQueue::new(depth), BlockQueue::new(depth)],
            mixer: BlockMixer::new(rng, Arc::clone(&stats)),
            limiter: Limiter::new(settings.limiter, sr, depth, Arc::clone(&stats)),
            stats,
            params,
            signal: [0.0; BLOCK_SAMPLES],
            taps: [[0.0; BLOCK_SAMPLES]; Channel::COUNT],
            staged: [None, None],
            last_params: initial,
            starved: false,
        }
    }

    /// Processes one block.
    ///
    /// `input` shorter than [`BLOCK_SAMPLES`] is zero-padded and extra
    /// samples are ignored. Each output receives `BLOCK_SAMPLES` samples (or
    /// its length, if shorter); samples past that are zeroed.
    pub fn process_block(&mut self, input: &[f32], out_left: &mut [f32], out_right: &mut [f32]) {
        let params = self.params.snapshot();
        self.last_params = params;

        let mut starved = false;
        for stage in SCHEDULE {
            match stage {
                Stage::Input => {
                    for (i, x) in self.signal.iter_mut().enumerate() {
                        *x = input.get(i).copied().unwrap_or(0.0);
                    }
                }
                Stage::Filter => {
                    for x in &mut self.signal {
                        *x = self.filter.process(*x);
                    }
                }
                Stage::FeedbackMixer => {
                    self.network.set_feedback_gain(params.feedback);
                }
                Stage::Delay => {
                    let [tap_left, tap_right] = &mut self.taps;
                    self.network.process_block(&self.signal, tap_left, tap_right);
                }
                Stage::DirtyQueue(channel) => starved |= !self.produce_dirty(channel),
                Stage::CleanQueue(channel) => self.produce_clean(channel),
                Stage::Mixer => {
                    for channel in Channel::ALL {
                        let i = channel.index();
                        self.mixer.mix_channel(
                            channel,
                            &mut self.dirty[i],
                            &mut self.clean[i],
                            &mut self.limiter,
                            &mut self.pool,
                            &params,
                        );
                    }
                }
                // The limiter is the mixer's sink and has already run.
                Stage::Limiter => {}
                Stage::Output => {
                    self.drain(Channel::Left, out_left);
                    self.drain(Channel::Right, out_right);
                }
            }
        }
        self.note_starvation(starved);
    }

    /// Queues a dirty block for `channel` and stages its clean partner.
    ///
    /// Blocks are taken from the pool in pairs, so a channel gets both or
    /// neither. Returns `false` if the pool ran dry.
    fn produce_dirty(&mut self, channel: Channel) -> bool {
        let i = channel.index();
        if self.clean[i].is_full() || self.dirty[i].is_full() {
            self.stats.record_queue_overflow();
            return true;
        }

        let Ok(clean) = self.pool.acquire() else {
            self.stats.record_pool_exhausted();
            return false;
        };
        let Ok(dirty) = self.pool.acquire() else {
            self.pool.release(clean);
            self.stats.record_pool_exhausted();
            return false;
        };

        self.pool.get_mut(&dirty).fill_from_float(&self.taps[i]);
        // Capacity was checked above.
        if let Err(block) = self.dirty[i].push(dirty) {
            self.pool.release(block);
        }
        self.staged[i] = Some(clean);
        true
    }

    /// Fills and queues the clean block staged for `channel`, if any.
    fn produce_clean(&mut self, channel: Channel) {
        let i = channel.index();
        let Some(clean) = self.staged[i].take() else {
            return;
        };
        self.pool.get_mut(&clean).fill_from_float(&self.signal);
        if let Err(block) = self.clean[i].push(clean) {
            self.pool.release(block);
        }
    }

    fn note_starvation(&mut self, starved: bool) {
        if starved && !self.starved {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                capacity = self.pool.capacity(),
                "block pool exhausted, dropping source blocks"
            );
        }
        self.starved = starved;
    }

    fn drain(&mut self, channel: Channel, out: &mut [f32]) {
        match self.limiter.output_queue(channel).pop() {
            Some(block) => {
                let n = out.len().min(BLOCK_SAMPLES);
                self.pool.get(&block).write_to_float(&mut out[..n]);
                out[n..].fill(0.0);
                self.pool.release(block);
            }
            None => {
                out.fill(0.0);
                self.stats.record_output_underrun();
            }
        }
    }

    /// Silences every stage and returns all queued blocks to the pool.
    ///
    /// Statistics are kept.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.network.reset();
        for block in self.staged.iter_mut().filter_map(Option::take) {
            self.pool.release(block);
        }
        for queue in self.dirty.iter_mut().chain(self.clean.iter_mut()) {
            queue.drain_into(&mut self.pool);
        }
        self.limiter.reset(&mut self.pool);
        self.starved = false;
    }

    /// Moves the tap for `channel`. Returns the tap length in samples.
    pub fn set_tap_time(&mut self, channel: Channel, ms: f32) -> usize {
        self.network.set_tap_time(channel, ms)
    }

    /// Construction-time constants.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Shared parameter set.
    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    /// Parameters used for the most recent block.
    pub fn last_params(&self) -> ParamSnapshot {
        self.last_params
    }

    /// Shared statistics counters.
    pub fn stats(&self) -> &Arc<EngineStats> {
        &self.stats
    }

    /// Current statistics.
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// The block pool.
    pub fn pool(&self) -> &BlockPool {
        &self.pool
    }

    /// The feedback delay network.
    pub fn network(&self) -> &FeedbackDelayNetwork {
        &self.network
    }

    /// The output limiter.
    pub fn limiter(&self) -> &Limiter {
        &self.limiter
    }

    /// The distortion random source.
    pub fn rng_mut(&mut self) -> &mut R {
        self.mixer.rng_mut()
    }
}
