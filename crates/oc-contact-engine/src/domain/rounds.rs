//! Mining round bookkeeping and pure selection functions.

use oc_ledger::{Batch, Block};
use shared_types::NodeId;
use std::collections::HashSet;

/// One mining competition: a fixed quorum of distinct miners each produce
/// a candidate block, then the fastest candidate wins.
///
/// The visited set makes candidate accumulation idempotent under repeated
/// contacts with the same miner.
#[derive(Debug)]
pub struct MiningRound {
    quorum: usize,
    candidates: Vec<Block>,
    visited: HashSet<NodeId>,
}

impl MiningRound {
    /// Start an empty round with the given quorum.
    pub fn new(quorum: usize) -> Self {
        Self {
            quorum,
            candidates: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Distinct miners required before a winner is picked.
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    /// Whether this miner already contributed to the round.
    pub fn has_visited(&self, miner: NodeId) -> bool {
        self.visited.contains(&miner)
    }

    /// Record a miner's participation. Returns false if it already
    /// participated.
    pub fn visit(&mut self, miner: NodeId) -> bool {
        self.visited.insert(miner)
    }

    /// Add a mined candidate.
    pub fn push_candidate(&mut self, block: Block) {
        self.candidates.push(block);
    }

    /// Candidates collected so far.
    pub fn candidates(&self) -> &[Block] {
        &self.candidates
    }

    /// Whether the quorum of distinct miners has been consulted.
    pub fn is_complete(&self) -> bool {
        self.visited.len() >= self.quorum
    }

    /// Take the winning candidate out of the round and reset it for the
    /// next competition. Returns `None` when no candidate was produced.
    pub fn take_best(&mut self) -> Option<Block> {
        let winner = select_best(&self.candidates).map(|index| self.candidates[index].clone());
        self.candidates.clear();
        self.visited.clear();
        winner
    }
}

/// Index of the candidate with the smallest mining duration; the earliest
/// candidate wins ties. `None` for an empty slate.
pub fn select_best(candidates: &[Block]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut min = u64::MAX;
    for (index, block) in candidates.iter().enumerate() {
        if block.mining_interval_ms() < min {
            min = block.mining_interval_ms();
            best = Some(index);
        }
    }
    best
}

/// Index of the batch with the highest total amount.
///
/// Scans in order and keeps the first index whose total strictly exceeds
/// the running maximum (started at zero), so ties keep the earlier index
/// and an empty or all-zero list yields `None`.
pub fn best_batch_index(batches: &[Batch]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut max_total = 0.0;
    for (index, batch) in batches.iter().enumerate() {
        let total = batch.total_amount();
        if total > max_total {
            max_total = total;
            best = Some(index);
        }
    }
    best
}
