//! Frame memory with per-byte taint labels
//!
//! [`Memory`] holds the byte buffer and a label buffer of the same length.
//! Both grow together in 32-byte words and never shrink. Writes require the
//! caller to have resized first; the interpreter always charges expansion gas
//! and resizes before a store. Reads past the end yield zero bytes labelled
//! [`TaintLabel::SAFE`].

use flow_primitives::{TaintLabel, Word};

/// Byte-addressable memory and its shadow labels
#[derive(Clone, Debug, Default)]
pub struct Memory {
    bytes: Vec<u8>,
    labels: Vec<TaintLabel>,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Current size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if memory is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the label buffer, always equal to [`Memory::len`]
    pub fn label_len(&self) -> usize {
        self.labels.len()
    }

    /// Word-aligned size needed to access `[offset, offset + size)`.
    ///
    /// Zero-sized accesses need nothing. `None` when the end overflows.
    pub fn required_size(offset: usize, size: usize) -> Option<usize> {
        if size == 0 {
            return Some(0);
        }
        let end = offset.checked_add(size)?;
        end.div_ceil(32).checked_mul(32)
    }

    /// Grow both buffers to at least `size` bytes
    pub fn resize(&mut self, size: usize) {
        if size > self.bytes.len() {
            self.bytes.resize(size, 0);
            self.labels.resize(size, TaintLabel::SAFE);
        }
    }

    fn check_bounds(&self, offset: usize, size: usize) {
        assert!(
            offset.checked_add(size).is_some_and(|end| end <= self.bytes.len()),
            "memory access [{}, +{}) beyond size {}",
            offset,
            size,
            self.bytes.len()
        );
    }

    /// Write bytes with one label per byte
    pub fn set(&mut self, offset: usize, bytes: &[u8], labels: &[TaintLabel]) {
        assert_eq!(bytes.len(), labels.len(), "label count must match byte count");
        if bytes.is_empty() {
            return;
        }
        self.check_bounds(offset, bytes.len());
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.labels[offset..offset + labels.len()].copy_from_slice(labels);
    }

    /// Write bytes, giving every byte the same label
    pub fn set_with_label(&mut self, offset: usize, bytes: &[u8], label: TaintLabel) {
        if bytes.is_empty() {
            return;
        }
        self.check_bounds(offset, bytes.len());
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.labels[offset..offset + bytes.len()].fill(label);
    }

    /// Store a 32-byte word; all 32 bytes take `label`
    pub fn set_word(&mut self, offset: usize, value: Word, label: TaintLabel) {
        let mut buf = [0u8; 32];
        value.to_big_endian(&mut buf);
        self.set_with_label(offset, &buf, label);
    }

    /// Store a single byte
    pub fn set_byte(&mut self, offset: usize, value: u8, label: TaintLabel) {
        self.check_bounds(offset, 1);
        self.bytes[offset] = value;
        self.labels[offset] = label;
    }

    /// Copy `size` bytes and labels out, zero/SAFE padded past the end
    pub fn get(&self, offset: usize, size: usize) -> (Vec<u8>, Vec<TaintLabel>) {
        let mut bytes = vec![0u8; size];
        let mut labels = vec![TaintLabel::SAFE; size];
        if offset < self.bytes.len() {
            let end = offset.saturating_add(size).min(self.bytes.len());
            let n = end - offset;
            bytes[..n].copy_from_slice(&self.bytes[offset..end]);
            labels[..n].copy_from_slice(&self.labels[offset..end]);
        }
        (bytes, labels)
    }

    /// Borrow `size` bytes and labels in place
    pub fn get_ptr(&self, offset: usize, size: usize) -> (&[u8], &[TaintLabel]) {
        if size == 0 {
            return (&[], &[]);
        }
        self.check_bounds(offset, size);
        (
            &self.bytes[offset..offset + size],
            &self.labels[offset..offset + size],
        )
    }

    /// Load a 32-byte word and the OR of its byte labels
    pub fn load_word(&self, offset: usize) -> (Word, TaintLabel) {
        let (bytes, labels) = self.get(offset, 32);
        (Word::from_big_endian(&bytes), TaintLabel::join_all(&labels))
    }

    /// OR of the labels in `[offset, offset + size)`
    pub fn fold_labels(&self, offset: usize, size: usize) -> TaintLabel {
        if offset >= self.labels.len() || size == 0 {
            return TaintLabel::SAFE;
        }
        let end = offset.saturating_add(size).min(self.labels.len());
        TaintLabel::join_all(&self.labels[offset..end])
    }

    /// Clear memory
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.labels.clear();
    }

    /// Raw byte buffer
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw label buffer
    pub fn labels(&self) -> &[TaintLabel] {
        &self.labels
    }
}
