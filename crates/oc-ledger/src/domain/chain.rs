//! The shared append-only chain.

use super::{Block, LedgerError, LedgerResult};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use shared_types::{hash_hex, GENESIS_PARENT};
use std::sync::Arc;
use tracing::info;

/// Ordered, append-only sequence of blocks with a fixed difficulty.
///
/// Seeded with a single genesis block whose parent hash is the fixed
/// sentinel. The chain only ever grows; reward settlement drains a
/// separate ledger of fee entries, never the chain itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blockchain {
    chain: Vec<Block>,
    difficulty: usize,
}

impl Blockchain {
    /// Create a chain holding only the genesis block.
    pub fn new(difficulty: usize) -> LedgerResult<Self> {
        if difficulty == 0 || difficulty > 64 {
            return Err(LedgerError::DifficultyOutOfRange(difficulty));
        }
        Ok(Self {
            chain: vec![Block::new(GENESIS_PARENT, Vec::new(), 0)],
            difficulty,
        })
    }

    /// Leading zero hex digits a valid block hash must carry.
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// The last appended block, or genesis when nothing has been appended.
    pub fn latest(&self) -> &Block {
        self.chain
            .last()
            .unwrap_or_else(|| unreachable!("chain always holds genesis"))
    }

    /// Append a block built against the current head.
    ///
    /// Callers supply blocks linked to `latest()`; a mismatch is a
    /// programming error, not a recoverable condition.
    pub fn append(&mut self, block: Block) {
        assert_eq!(
            block.previous_hash(),
            self.latest().hash(),
            "block built against a stale head"
        );
        info!(
            "chain: appended block {} (length {})",
            hash_hex(&block.hash()),
            self.chain.len() + 1
        );
        self.chain.push(block);
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false; the genesis block is permanent.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All blocks in append order.
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Sum of fees recorded on committed blocks.
    pub fn total_fees(&self) -> f64 {
        self.chain.iter().map(Block::fee).sum()
    }
}

/// Cloneable handle to the one chain instance a run shares.
///
/// Admin, Internet, and rewarded miners all hold clones of the same
/// handle: once the Admin appends a block, every holder observes the new
/// length. The mutex enforces the single-writer discipline; only the
/// Admin commit path acquires it for writing.
#[derive(Debug, Clone)]
pub struct ChainHandle {
    inner: Arc<Mutex<Blockchain>>,
}

impl ChainHandle {
    /// Wrap a chain for sharing.
    pub fn new(chain: Blockchain) -> Self {
        Self {
            inner: Arc::new(Mutex::new(chain)),
        }
    }

    /// Lock the chain for reading or the single writer's append.
    pub fn lock(&self) -> MutexGuard<'_, Blockchain> {
        self.inner.lock()
    }
}
