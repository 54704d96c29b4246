//! Translated code cache.
//!
//! Concurrent lookup from every hardware thread; racing compilations of
//! the same address are harmless because translation is a pure function
//! of guest memory, so the first installed block wins and the loser is
//! dropped.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::block::TranslatedBlock;

/// Guest-address-keyed cache of translated blocks
pub struct BlockCache {
    blocks: RwLock<HashMap<u32, Arc<TranslatedBlock>>>,
}

impl BlockCache {
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the block starting at `addr`
    pub fn get(&self, addr: u32) -> Option<Arc<TranslatedBlock>> {
        self.blocks.read().get(&addr).cloned()
    }

    /// Install a freshly translated block. If another thread won the
    /// race for this address, its block is kept and returned.
    pub fn insert(&self, block: TranslatedBlock) -> Arc<TranslatedBlock> {
        let mut blocks = self.blocks.write();
        Arc::clone(
            blocks
                .entry(block.start)
                .or_insert_with(|| Arc::new(block)),
        )
    }

    /// Drop every block overlapping the given guest range. Called when
    /// guest memory is known to have changed (icbi, loader writes).
    pub fn invalidate(&self, addr: u32, len: u32) {
        let mut blocks = self.blocks.write();
        blocks.retain(|_, block| !block.overlaps(addr, len));
    }

    /// Drop the entire cache
    pub fn clear(&self) {
        self.blocks.write().clear();
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl Default for BlockCache {
    fn default() -> Self {
        Self::new()
    }
}
