//! Jump destination analysis

use flow_primitives::H256;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Set-membership oracle for valid JUMP targets
pub trait JumpDestOracle: Send + Sync {
    /// Whether `position` in `code` is a JUMPDEST outside PUSH data
    fn is_valid_jump_dest(&self, code_hash: &H256, code: &[u8], position: usize) -> bool;
}

/// Mark every JUMPDEST that is an instruction, skipping PUSH operands
pub fn analyze_jump_dests(code: &[u8]) -> Vec<bool> {
    let mut dests = vec![false; code.len()];
    let mut i = 0;

    while i < code.len() {
        let opcode = code[i];
        if opcode == 0x5b {
            dests[i] = true;
        }
        // Skip PUSH operands
        if (0x60..=0x7f).contains(&opcode) {
            i += (opcode - 0x5f) as usize;
        }
        i += 1;
    }

    dests
}

/// Analysis memoized per code hash, shareable between interpreters
#[derive(Debug, Default)]
pub struct JumpDestCache {
    entries: RwLock<HashMap<H256, Arc<Vec<bool>>>>,
}

impl JumpDestCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of analysed code hashes
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing has been analysed yet
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn analysis(&self, code_hash: &H256, code: &[u8]) -> Arc<Vec<bool>> {
        if let Some(dests) = self.entries.read().get(code_hash) {
            return Arc::clone(dests);
        }
        let dests = Arc::new(analyze_jump_dests(code));
        self.entries
            .write()
            .entry(*code_hash)
            .or_insert_with(|| Arc::clone(&dests));
        dests
    }
}

impl JumpDestOracle for JumpDestCache {
    fn is_valid_jump_dest(&self, code_hash: &H256, code: &[u8], position: usize) -> bool {
        if position >= code.len() {
            return false;
        }
        self.analysis(code_hash, code)
            .get(position)
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_primitives::keccak256;

    #[test]
    fn test_analysis_skips_push_data() {
        // PUSH1 0x5b, JUMPDEST, PUSH2 0x5b5b, JUMPDEST
        let code = [0x60, 0x5b, 0x5b, 0x61, 0x5b, 0x5b, 0x5b];
        let dests = analyze_jump_dests(&code);
        assert_eq!(dests, vec![false, false, true, false, false, false, true]);
    }

    #[test]
    fn test_truncated_push() {
        // PUSH32 with only two bytes of data
        let code = [0x7f, 0x5b, 0x5b];
        assert!(analyze_jump_dests(&code).iter().all(|d| !d));
    }

    #[test]
    fn test_cache_memoizes_by_hash() {
        let cache = JumpDestCache::new();
        let code = [0x5b, 0x00];
        let hash = keccak256(&code);

        assert!(cache.is_empty());
        assert!(cache.is_valid_jump_dest(&hash, &code, 0));
        assert!(!cache.is_valid_jump_dest(&hash, &code, 1));
        assert!(!cache.is_valid_jump_dest(&hash, &code, 99));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_shared_across_threads() {
        let cache = Arc::new(JumpDestCache::new());
        let code = vec![0x00, 0x5b];
        let hash = keccak256(&code);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let code = code.clone();
                std::thread::spawn(move || cache.is_valid_jump_dest(&hash, &code, 1))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(cache.len(), 1);
    }
}
