//! Value and taint stacks
//!
//! [`DualStack`] keeps a word stack and a label stack index-aligned: every
//! public operation touches both by the same amount, so their lengths can
//! never diverge.

use crate::error::{EvmError, EvmResult};
use crate::gas::cost::MAX_STACK_SIZE;
use flow_primitives::{TaintLabel, Word};

/// Bounded LIFO stack
#[derive(Clone, Debug)]
pub struct Stack<T> {
    data: Vec<T>,
}

impl<T: Copy> Stack<T> {
    /// Create new empty stack
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(MAX_STACK_SIZE),
        }
    }

    /// Push value onto stack
    pub fn push(&mut self, value: T) -> EvmResult<()> {
        if self.data.len() >= MAX_STACK_SIZE {
            return Err(EvmError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop value from stack
    pub fn pop(&mut self) -> EvmResult<T> {
        self.data.pop().ok_or(EvmError::StackUnderflow)
    }

    /// Peek at top value
    pub fn peek(&self) -> EvmResult<T> {
        self.data.last().copied().ok_or(EvmError::StackUnderflow)
    }

    /// Peek at value at depth (0 = top)
    pub fn peek_at(&self, depth: usize) -> EvmResult<T> {
        if depth >= self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        Ok(self.data[self.data.len() - 1 - depth])
    }

    /// Swap top with item at depth (1 = second item)
    pub fn swap(&mut self, depth: usize) -> EvmResult<()> {
        let len = self.data.len();
        if depth == 0 || depth >= len {
            return Err(EvmError::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - depth);
        Ok(())
    }

    /// Duplicate item at depth (1 = top)
    pub fn dup(&mut self, depth: usize) -> EvmResult<()> {
        if depth == 0 || depth > self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        let value = self.data[self.data.len() - depth];
        self.push(value)
    }

    /// Get stack length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear stack
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Items from bottom to top
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Copy> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Word stack paired with its label stack
#[derive(Clone, Debug, Default)]
pub struct DualStack {
    values: Stack<Word>,
    labels: Stack<TaintLabel>,
}

impl DualStack {
    /// Create new empty stacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a word with its label
    pub fn push(&mut self, value: Word, label: TaintLabel) -> EvmResult<()> {
        if self.values.len() >= MAX_STACK_SIZE {
            return Err(EvmError::StackOverflow);
        }
        self.values.push(value)?;
        self.labels.push(label)
    }

    /// Push a word that carries no taint
    pub fn push_safe(&mut self, value: Word) -> EvmResult<()> {
        self.push(value, TaintLabel::SAFE)
    }

    /// Pop the top word and its label
    pub fn pop(&mut self) -> EvmResult<(Word, TaintLabel)> {
        let value = self.values.pop()?;
        let label = self.labels.pop()?;
        Ok((value, label))
    }

    /// Pop `N` items, top first. Nothing is popped if fewer than `N` exist.
    pub fn popn<const N: usize>(&mut self) -> EvmResult<[(Word, TaintLabel); N]> {
        self.require(N)?;
        let mut items = [(Word::zero(), TaintLabel::SAFE); N];
        for item in items.iter_mut() {
            *item = self.pop()?;
        }
        Ok(items)
    }

    /// Top word and label
    pub fn peek(&self) -> EvmResult<(Word, TaintLabel)> {
        Ok((self.values.peek()?, self.labels.peek()?))
    }

    /// Word and label at depth (0 = top)
    pub fn peek_at(&self, depth: usize) -> EvmResult<(Word, TaintLabel)> {
        Ok((self.values.peek_at(depth)?, self.labels.peek_at(depth)?))
    }

    /// Duplicate item at depth (1 = top) on both stacks
    pub fn dup(&mut self, depth: usize) -> EvmResult<()> {
        let (value, label) = self.peek_at(depth.wrapping_sub(1))?;
        self.push(value, label)
    }

    /// Swap top with item at depth on both stacks
    pub fn swap(&mut self, depth: usize) -> EvmResult<()> {
        self.values.swap(depth)?;
        self.labels.swap(depth)
    }

    /// Fail with StackUnderflow unless at least `n` items are present
    pub fn require(&self, n: usize) -> EvmResult<()> {
        if self.values.len() < n {
            return Err(EvmError::StackUnderflow);
        }
        Ok(())
    }

    /// Stack depth
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Label stack depth, always equal to [`DualStack::len`]
    pub fn label_len(&self) -> usize {
        self.labels.len()
    }

    /// Clear both stacks
    pub fn clear(&mut self) {
        self.values.clear();
        self.labels.clear();
    }

    /// Words from bottom to top
    pub fn values(&self) -> &[Word] {
        self.values.as_slice()
    }

    /// Labels from bottom to top
    pub fn labels(&self) -> &[TaintLabel] {
        self.labels.as_slice()
    }
}
