//! Audio blocks and the bounded pool they live in.
//!
//! Every block in the engine comes out of a [`BlockPool`] that is sized once
//! at construction. A block is addressed by a [`BlockHandle`], a move-only
//! token: whoever holds the handle owns the block, and ownership passes from
//! stage to stage by moving the handle. Because handles cannot be cloned,
//! aliasing a block or releasing it twice is a compile error rather than a
//! runtime bug. The one remaining failure mode, forgetting to release, shows
//! up in [`BlockPool::in_use`].
//!
//! # Real-time Behaviour
//!
//! The free list is a stack of slot indices with capacity reserved for every
//! slot, so [`acquire`](BlockPool::acquire) and
//! [`release`](BlockPool::release) are O(1) and never allocate.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::math::{float_to_sample, sample_to_float};

/// Number of samples in every audio block.
pub const BLOCK_SAMPLES: usize = 128;

/// One block of raw signed 16-bit samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlock {
    data: [i16; BLOCK_SAMPLES],
}

impl AudioBlock {
    /// A block of digital silence.
    pub const fn silent() -> Self {
        Self {
            data: [0; BLOCK_SAMPLES],
        }
    }

    /// Raw samples.
    #[inline]
    pub fn samples(&self) -> &[i16; BLOCK_SAMPLES] {
        &self.data
    }

    /// Mutable raw samples.
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [i16; BLOCK_SAMPLES] {
        &mut self.data
    }

    /// Sets every sample to `value`.
    pub fn fill(&mut self, value: i16) {
        self.data.fill(value);
    }

    /// Writes normalized floats into the block.
    ///
    /// Reads at most [`BLOCK_SAMPLES`] values; samples past the end of a
    /// short `input` are set to zero.
    pub fn fill_from_float(&mut self, input: &[f32]) {
        for (i, slot) in self.data.iter_mut().enumerate() {
            *slot = input.get(i).map_or(0, |&x| float_to_sample(x));
        }
    }

    /// Reads the block out as normalized floats.
    ///
    /// Writes `min(output.len(), BLOCK_SAMPLES)` values.
    pub fn write_to_float(&self, output: &mut [f32]) {
        for (out, &raw) in output.iter_mut().zip(self.data.iter()) {
            *out = sample_to_float(raw);
        }
    }
}

impl Default for AudioBlock {
    fn default() -> Self {
        Self::silent()
    }
}

/// Exclusive ownership of one pool slot.
///
/// Handles are only created by [`BlockPool::acquire`] and only destroyed by
/// [`BlockPool::release`]. They are deliberately neither `Clone` nor `Copy`.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a block handle must be queued, handed to a sink, or released to its pool"]
pub struct BlockHandle {
    slot: u16,
}

impl BlockHandle {
    /// Pool slot index this handle owns.
    #[inline]
    pub fn slot(&self) -> usize {
        usize::from(self.slot)
    }
}

/// Errors returned by [`BlockPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Every slot is currently owned by some stage.
    Exhausted {
        /// Total number of slots in the pool.
        capacity: usize,
    },
}

#[cfg(feature = "std")]
impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Exhausted { capacity } => {
                write!(f, "block pool exhausted (all {capacity} blocks in use)")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PoolError {}

/// Bounded pool of pre-allocated audio blocks.
///
/// # Example
///
/// ```rust
/// use grit_core::{BlockPool, PoolError};
///
/// let mut pool = BlockPool::new(2);
/// let a = pool.acquire().unwrap();
/// let b = pool.acquire().unwrap();
/// assert_eq!(pool.acquire(), Err(PoolError::Exhausted { capacity: 2 }));
///
/// pool.release(a);
/// pool.release(b);
/// assert_eq!(pool.in_use(), 0);
/// ```
#[derive(Debug)]
pub struct BlockPool {
    blocks: Vec<AudioBlock>,
    /// Stack of free slot indices. Capacity is reserved for every slot.
    free: Vec<u16>,
    peak_in_use: usize,
}

impl BlockPool {
    /// Maximum number of blocks a pool can hold.
    pub const MAX_CAPACITY: usize = u16::MAX as usize;

    /// Creates a pool of `capacity` silent blocks.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or exceeds [`Self::MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Block pool must hold at least one block");
        assert!(
            capacity <= Self::MAX_CAPACITY,
            "Block pool capacity exceeds {}",
            Self::MAX_CAPACITY
        );

        let blocks = (0..capacity).map(|_| AudioBlock::silent()).collect();
        let mut free = Vec::with_capacity(capacity);
        // Lowest slot on top so fresh pools hand out 0, 1, 2, ...
        free.extend((0..capacity as u16).rev());

        Self {
            blocks,
            free,
            peak_in_use: 0,
        }
    }

    /// Takes a block out of the pool.
    ///
    /// The block keeps whatever samples its previous owner left in it;
    /// producers overwrite the full block.
    #[inline]
    pub fn acquire(&mut self) -> Result<BlockHandle, PoolError> {
        let slot = self.free.pop().ok_or(PoolError::Exhausted {
            capacity: self.blocks.len(),
        })?;
        self.peak_in_use = self.peak_in_use.max(self.in_use());
        Ok(BlockHandle { slot })
    }

    /// Returns a block to the pool.
    #[inline]
    pub fn release(&mut self, handle: BlockHandle) {
        debug_assert!(
            !self.free.contains(&handle.slot),
            "slot {} released while already free",
            handle.slot
        );
        self.free.push(handle.slot);
    }

    /// Shared access to the block behind a handle.
    #[inline]
    pub fn get(&self, handle: &BlockHandle) -> &AudioBlock {
        &self.blocks[handle.slot()]
    }

    /// Exclusive access to the block behind a handle.
    #[inline]
    pub fn get_mut(&mut self, handle: &BlockHandle) -> &mut AudioBlock {
        &mut self.blocks[handle.slot()]
    }

    /// Reads one block while writing another.
    ///
    /// Handles are unique, so the two slots are always distinct.
    #[inline]
    pub fn pair_mut(
        &mut self,
        read: &BlockHandle,
        write: &BlockHandle,
    ) -> (&AudioBlock, &mut AudioBlock) {
        let (r, w) = (read.slot(), write.slot());
        assert_ne!(r, w, "distinct handles must own distinct slots");
        if r < w {
            let (lo, hi) = self.blocks.split_at_mut(w);
            (&lo[r], &mut hi[0])
        } else {
            let (lo, hi) = self.blocks.split_at_mut(r);
            (&hi[0], &mut lo[w])
        }
    }

    /// Total number of blocks.
    pub fn capacity(&self) -> usize {
        self.blocks.len()
    }

    /// Number of blocks that can still be acquired.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of blocks currently owned by some stage.
    pub fn in_use(&self) -> usize {
        self.blocks.len() - self.free.len()
    }

    /// Highest simultaneous [`in_use`](Self::in_use) seen since construction.
    pub fn peak_in_use(&self) -> usize {
        self.peak_in_use
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_until_exhausted_then_recover() {
        let mut pool = BlockPool::new(3);
        let handles: Vec<_> = (0..3).map(|_| pool.acquire().unwrap()).collect();
        assert_eq!(pool.available(), 0);
        assert_eq!(
            pool.acquire().unwrap_err(),
            PoolError::Exhausted { capacity: 3 }
        );

        for h in handles {
            pool.release(h);
        }
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.peak_in_use(), 3);
        assert!(pool.acquire().is_ok());
    }

    #[test]
    fn fresh_pool_hands_out_low_slots_first() {
        let mut pool = BlockPool::new(4);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(a.slot(), 0);
        assert_eq!(b.slot(), 1);
        pool.release(a);
        pool.release(b);
    }

    #[test]
    fn released_slot_is_reused() {
        let mut pool = BlockPool::new(2);
        let a = pool.acquire().unwrap();
        let slot = a.slot();
        pool.release(a);
        let b = pool.acquire().unwrap();
        assert_eq!(b.slot(), slot);
        pool.release(b);
    }

    #[test]
    fn pair_mut_in_both_orders() {
        let mut pool = BlockPool::new(2);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        pool.get_mut(&a).fill(7);

        let (src, dst) = pool.pair_mut(&a, &b);
        dst.samples_mut().copy_from_slice(src.samples());
        assert_eq!(pool.get(&b).samples()[0], 7);

        pool.get_mut(&b).fill(-3);
        let (src, dst) = pool.pair_mut(&b, &a);
        dst.samples_mut().copy_from_slice(src.samples());
        assert_eq!(pool.get(&a).samples()[BLOCK_SAMPLES - 1], -3);

        pool.release(a);
        pool.release(b);
    }

    #[test]
    fn float_round_trip_through_block() {
        let mut block = AudioBlock::silent();
        let input: Vec<f32> = (0..BLOCK_SAMPLES)
            .map(|i| (i as f32 / BLOCK_SAMPLES as f32) * 2.0 - 1.0)
            .collect();
        block.fill_from_float(&input);

        let mut output = [0.0_f32; BLOCK_SAMPLES];
        block.write_to_float(&mut output);
        for (a, b) in input.iter().zip(output.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn short_input_zero_fills() {
        let mut block = AudioBlock::silent();
        block.fill(100);
        block.fill_from_float(&[0.5; 4]);
        assert!(block.samples()[0] > 0);
        assert_eq!(block.samples()[4], 0);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_panics() {
        let _pool = BlockPool::new(0);
    }
}
