//! Engine health counters.
//!
//! The audio thread bumps these with relaxed atomic adds; any other thread
//! can read a [`StatsSnapshot`] at any time. Counters are 32-bit so they stay
//! lock-free on targets without 64-bit atomics, and wrap on overflow.

use core::sync::atomic::{AtomicU32, Ordering};

/// Shared, lock-free engine counters.
#[derive(Debug, Default)]
pub struct EngineStats {
    mixed: AtomicU32,
    skipped: AtomicU32,
    pool_exhausted: AtomicU32,
    queue_overflows: AtomicU32,
    output_underruns: AtomicU32,
}

impl EngineStats {
    /// All counters at zero.
    pub const fn new() -> Self {
        Self {
            mixed: AtomicU32::new(0),
            skipped: AtomicU32::new(0),
            pool_exhausted: AtomicU32::new(0),
            queue_overflows: AtomicU32::new(0),
            output_underruns: AtomicU32::new(0),
        }
    }

    /// A channel pair was mixed and handed to the sink.
    #[inline]
    pub fn record_mixed(&self) {
        self.mixed.fetch_add(1, Ordering::Relaxed);
    }

    /// A channel tick found no complete pair.
    #[inline]
    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// A source stage could not get a block from the pool.
    #[inline]
    pub fn record_pool_exhausted(&self) {
        self.pool_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// A block was released because its destination queue was full.
    #[inline]
    pub fn record_queue_overflow(&self) {
        self.queue_overflows.fetch_add(1, Ordering::Relaxed);
    }

    /// The output stage had nothing to play for a channel.
    #[inline]
    pub fn record_output_underrun(&self) {
        self.output_underruns.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            mixed: self.mixed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            pool_exhausted: self.pool_exhausted.load(Ordering::Relaxed),
            queue_overflows: self.queue_overflows.load(Ordering::Relaxed),
            output_underruns: self.output_underruns.load(Ordering::Relaxed),
        }
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        for counter in [
            &self.mixed,
            &self.skipped,
            &self.pool_exhausted,
            &self.queue_overflows,
            &self.output_underruns,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Channel pairs mixed.
    pub mixed: u32,
    /// Channel ticks skipped for lack of a complete pair.
    pub skipped: u32,
    /// Source ticks dropped because the pool was empty.
    pub pool_exhausted: u32,
    /// Blocks released because a queue was full.
    pub queue_overflows: u32,
    /// Output channel ticks filled with silence.
    pub output_underruns: u32,
}

impl StatsSnapshot {
    /// Blocks that never reached the output.
    pub fn dropped_blocks(&self) -> u32 {
        self.pool_exhausted.wrapping_add(self.queue_overflows)
    }

    /// Counter deltas since `earlier`.
    #[must_use]
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            mixed: self.mixed.wrapping_sub(earlier.mixed),
            skipped: self.skipped.wrapping_sub(earlier.skipped),
            pool_exhausted: self.pool_exhausted.wrapping_sub(earlier.pool_exhausted),
            queue_overflows: self.queue_overflows.wrapping_sub(earlier.queue_overflows),
            output_underruns: self.output_underruns.wrapping_sub(earlier.output_underruns),
        }
    }
}

impl core::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "mixed={} skipped={} pool_exhausted={} queue_overflows={} underruns={}",
            self.mixed, self.skipped, self.pool_exhausted, self.queue_overflows, self.output_underruns
        )
    }
}
