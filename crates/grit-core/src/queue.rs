//! Stage-to-stage block transport.
//!
//! Stages never share blocks; they pass [`BlockHandle`]s through bounded
//! [`BlockQueue`]s. Upstream stages expose themselves as [`BlockSource`]s and
//! downstream stages as [`BlockSink`]s, so the mixer can be driven by the
//! engine's own queues or by anything else that hands out pool blocks.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::block::{BlockHandle, BlockPool};
use crate::channel::Channel;

/// Upstream side of a stage boundary.
pub trait BlockSource {
    /// Whether [`read_block`](Self::read_block) would return a block now.
    fn available(&self) -> bool;

    /// Takes the next block, transferring ownership to the caller.
    fn read_block(&mut self) -> Option<BlockHandle>;

    /// Gives a block obtained from this source back to the pool.
    fn free_block(&mut self, pool: &mut BlockPool, block: BlockHandle) {
        pool.release(block);
    }
}

/// Downstream side of a stage boundary.
pub trait BlockSink {
    /// Takes ownership of `block` for `channel`.
    ///
    /// The sink must eventually queue the block or release it to `pool`.
    fn accept(&mut self, pool: &mut BlockPool, block: BlockHandle, channel: Channel);
}

/// Bounded FIFO of block handles.
///
/// Storage is reserved up front; [`push`](Self::push) hands the block back
/// when the queue is full instead of growing.
#[derive(Debug)]
pub struct BlockQueue {
    slots: Vec<Option<BlockHandle>>,
    head: usize,
    len: usize,
}

impl BlockQueue {
    /// Creates an empty queue holding at most `capacity` blocks.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Queue capacity must be > 0");
        Self {
            slots: core::iter::repeat_with(|| None).take(capacity).collect(),
            head: 0,
            len: 0,
        }
    }

    /// Appends a block, or returns it if the queue is full.
    pub fn push(&mut self, block: BlockHandle) -> Result<(), BlockHandle> {
        if self.is_full() {
            return Err(block);
        }
        let tail = (self.head + self.len) % self.slots.len();
        self.slots[tail] = Some(block);
        self.len += 1;
        Ok(())
    }

    /// Removes the oldest block.
    pub fn pop(&mut self) -> Option<BlockHandle> {
        if self.len == 0 {
            return None;
        }
        let block = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        block
    }

    /// Number of queued blocks.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` when [`push`](Self::push) would fail.
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Maximum number of queued blocks.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Releases every queued block to `pool`.
    pub fn drain_into(&mut self, pool: &mut BlockPool) {
        while let Some(block) = self.pop() {
            pool.release(block);
        }
    }
}

impl BlockSource for BlockQueue {
    fn available(&self) -> bool {
        !self.is_empty()
    }

    fn read_block(&mut self) -> Option<BlockHandle> {
        self.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut pool = BlockPool::new(4);
        let mut queue = BlockQueue::new(4);
        for value in 1..=3 {
            let h = pool.acquire().unwrap();
            pool.get_mut(&h).fill(value);
            queue.push(h).unwrap();
        }
        for expected in 1..=3 {
            let h = queue.read_block().unwrap();
            assert_eq!(pool.get(&h).samples()[0], expected);
            queue.free_block(&mut pool, h);
        }
        assert!(!queue.available());
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn full_queue_returns_block() {
        let mut pool = BlockPool::new(3);
        let mut queue = BlockQueue::new(2);
        queue.push(pool.acquire().unwrap()).unwrap();
        queue.push(pool.acquire().unwrap()).unwrap();
        assert!(queue.is_full());

        let rejected = queue.push(pool.acquire().unwrap()).unwrap_err();
        pool.release(rejected);
        assert_eq!(queue.len(), 2);

        queue.drain_into(&mut pool);
        assert!(queue.is_empty());
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn wraps_around() {
        let mut pool = BlockPool::new(2);
        let mut queue = BlockQueue::new(2);
        for _ in 0..10 {
            queue.push(pool.acquire().unwrap()).unwrap();
            let h = queue.pop().unwrap();
            pool.release(h);
        }
        assert_eq!(queue.len(), 0);
        assert_eq!(pool.in_use(), 0);
    }
}
