//! Per-channel dirty/clean blending.
//!
//! Each tick the mixer takes one dirty and one clean block for a channel,
//! crushes the dirty samples, blends them into the clean block and hands the
//! clean block to the sink. The dirty block goes straight back to the pool.
//! A channel is only processed when both blocks are there; a lone block is
//! never mixed against silence.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::block::{AudioBlock, BlockPool};
use crate::channel::Channel;
use crate::distortion::distort;
use crate::math::{float_to_sample, saturate, sample_to_float};
use crate::params::ParamSnapshot;
use crate::queue::{BlockSink, BlockSource};
use crate::rng::{Lcg, RandomSource};
use crate::stats::EngineStats;

/// What [`BlockMixer::mix_channel`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixOutcome {
    /// A pair was blended and passed to the sink.
    Mixed,
    /// No complete pair was available; nothing was passed on.
    Skipped,
}

/// Blends `dirty` into `clean` in place.
///
/// For every sample: `(1 - mix) * clean + mix * distort(dirty)`, clamped and
/// written back as a raw sample.
pub fn mix_samples<R: RandomSource + ?Sized>(
    dirty: &AudioBlock,
    clean: &mut AudioBlock,
    params: &ParamSnapshot,
    rng: &mut R,
) {
    let dry = 1.0 - params.mix;
    for (c, &d) in clean.samples_mut().iter_mut().zip(dirty.samples().iter()) {
        let crushed = distort(sample_to_float(d), params, rng);
        let mixed = dry * sample_to_float(*c) + params.mix * crushed;
        *c = float_to_sample(saturate(mixed));
    }
}

/// The block-level mixing stage.
#[derive(Debug)]
pub struct BlockMixer<R = Lcg> {
    rng: R,
    stats: Arc<EngineStats>,
}

impl<R: RandomSource> BlockMixer<R> {
    /// Creates a mixer drawing randomness from `rng`.
    pub fn new(rng: R, stats: Arc<EngineStats>) -> Self {
        Self { rng, stats }
    }

    /// Random source, e.g. for reseeding.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Mixes one channel pair if both halves are available.
    ///
    /// On [`MixOutcome::Mixed`] the clean block has been handed to `sink`
    /// and the dirty block released. On [`MixOutcome::Skipped`] nothing was
    /// passed on; any block that was read without its partner has been freed.
    pub fn mix_channel<D, C, K>(
        &mut self,
        channel: Channel,
        dirty_source: &mut D,
        clean_source: &mut C,
        sink: &mut K,
        pool: &mut BlockPool,
        params: &ParamSnapshot,
    ) -> MixOutcome
    where
        D: BlockSource + ?Sized,
        C: BlockSource + ?Sized,
        K: BlockSink + ?Sized,
    {
        if !(dirty_source.available() && clean_source.available()) {
            self.stats.record_skipped();
            return MixOutcome::Skipped;
        }

        let (dirty, clean) = match (dirty_source.read_block(), clean_source.read_block()) {
            (Some(dirty), Some(clean)) => (dirty, clean),
            (Some(dirty), None) => {
                dirty_source.free_block(pool, dirty);
                self.stats.record_skipped();
                return MixOutcome::Skipped;
            }
            (None, Some(clean)) => {
                clean_source.free_block(pool, clean);
                self.stats.record_skipped();
                return MixOutcome::Skipped;
            }
            (None, None) => {
                self.stats.record_skipped();
                return MixOutcome::Skipped;
            }
        };

        let (dirty_block, clean_block) = pool.pair_mut(&dirty, &clean);
        mix_samples(dirty_block, clean_block, params, &mut self.rng);

        dirty_source.free_block(pool, dirty);
        sink.accept(pool, clean, channel);
        self.stats.record_mixed();
        MixOutcome::Mixed
    }
}
