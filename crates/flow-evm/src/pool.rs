//! Reuse of per-frame stack and memory allocations
//!
//! Nested calls create a fresh stack pair and memory for every frame. The
//! pool hands back cleared buffers from earlier frames so their capacity is
//! reused. It is private to one interpreter and has no observable effect.

use crate::memory::Memory;
use crate::stack::DualStack;

/// Upper bound on retained buffers of each kind
pub const POOL_LIMIT: usize = 256;

/// Free lists of cleared frame buffers
#[derive(Debug, Default)]
pub struct FramePool {
    stacks: Vec<DualStack>,
    memories: Vec<Memory>,
}

impl FramePool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a cleared stack pair
    pub fn acquire_stack(&mut self) -> DualStack {
        self.stacks.pop().unwrap_or_default()
    }

    /// Take a cleared memory
    pub fn acquire_memory(&mut self) -> Memory {
        self.memories.pop().unwrap_or_default()
    }

    /// Return a frame's buffers; dropped once the pool is full
    pub fn release(&mut self, mut stack: DualStack, mut memory: Memory) {
        if self.stacks.len() < POOL_LIMIT {
            stack.clear();
            self.stacks.push(stack);
        }
        if self.memories.len() < POOL_LIMIT {
            memory.clear();
            self.memories.push(memory);
        }
    }

    /// Number of retained (stack, memory) buffers
    pub fn retained(&self) -> (usize, usize) {
        (self.stacks.len(), self.memories.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_primitives::{TaintLabel, Word};

    #[test]
    fn test_released_buffers_come_back_cleared() {
        let mut pool = FramePool::new();
        let mut stack = pool.acquire_stack();
        let mut memory = pool.acquire_memory();
        stack.push(Word::one(), TaintLabel::param(0)).unwrap();
        memory.resize(64);

        pool.release(stack, memory);
        assert_eq!(pool.retained(), (1, 1));

        let stack = pool.acquire_stack();
        let memory = pool.acquire_memory();
        assert!(stack.is_empty());
        assert!(memory.is_empty());
        assert_eq!(memory.label_len(), 0);
        assert_eq!(pool.retained(), (0, 0));
    }

    #[test]
    fn test_pool_limit() {
        let mut pool = FramePool::new();
        for _ in 0..POOL_LIMIT + 10 {
            pool.release(DualStack::new(), Memory::new());
        }
        assert_eq!(pool.retained(), (POOL_LIMIT, POOL_LIMIT));
    }
}
