//! Proof-of-work blocks.

use super::Transaction;
use serde::{Deserialize, Serialize};
use shared_crypto::Sha256Hasher;
use shared_types::{leading_zero_nibbles, Hash, NodeId};

/// A bundle of transactions behind a proof-of-work nonce.
///
/// The hash is a pure function of (previous hash, timestamp, nonce,
/// transaction hashes) and is recomputed whenever the nonce changes.
/// Mining metadata (duration, miner, fee) is attached by the decision
/// engine during a mining round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    previous_hash: Hash,
    transactions: Vec<Transaction>,
    timestamp_millis: u64,
    nonce: u64,
    hash: Hash,
    mining_interval_ms: u64,
    mined_by: Option<NodeId>,
    fee: f64,
}

impl Block {
    /// Build a block against a known head. No mining is performed; the
    /// nonce starts at zero and the hash reflects it.
    pub fn new(previous_hash: Hash, transactions: Vec<Transaction>, timestamp_millis: u64) -> Self {
        let mut block = Self {
            previous_hash,
            transactions,
            timestamp_millis,
            nonce: 0,
            hash: [0u8; 32],
            mining_interval_ms: 0,
            mined_by: None,
            fee: 0.0,
        };
        block.hash = block.calculate_hash();
        block
    }

    /// Digest of previous hash, timestamp, nonce, and the transaction
    /// hashes in order. Pure and deterministic.
    pub fn calculate_hash(&self) -> Hash {
        let mut hasher = Sha256Hasher::new();
        hasher.update(&self.previous_hash);
        hasher.update(&self.timestamp_millis.to_le_bytes());
        hasher.update(&self.nonce.to_le_bytes());
        for tx in &self.transactions {
            hasher.update(&tx.tx_hash);
        }
        hasher.finalize()
    }

    /// Whether the stored hash has at least `difficulty` leading zero hex
    /// digits.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        leading_zero_nibbles(&self.hash) >= difficulty
    }

    /// Increment the nonce and rehash until the hash meets the target
    /// difficulty. Unbounded search; termination is assumed because the
    /// digest output is effectively uniform.
    pub fn mine(&mut self, difficulty: usize) {
        while !self.meets_difficulty(difficulty) {
            self.nonce += 1;
            self.hash = self.calculate_hash();
        }
    }

    /// The stored hash, current as of the last nonce change.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Parent linkage.
    pub fn previous_hash(&self) -> Hash {
        self.previous_hash
    }

    /// The bundled transactions.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Creation timestamp in milliseconds.
    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp_millis
    }

    /// Current nonce value.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Time the winning miner spent on the proof-of-work search.
    pub fn mining_interval_ms(&self) -> u64 {
        self.mining_interval_ms
    }

    /// Record the measured mining duration.
    pub fn set_mining_interval_ms(&mut self, interval: u64) {
        self.mining_interval_ms = interval;
    }

    /// Identity of the miner that produced this block, if any.
    pub fn mined_by(&self) -> Option<NodeId> {
        self.mined_by
    }

    /// Record the producing miner.
    pub fn set_mined_by(&mut self, miner: NodeId) {
        self.mined_by = Some(miner);
    }

    /// Aggregate fee owed to the miner on commit.
    pub fn fee(&self) -> f64 {
        self.fee
    }

    /// Record the aggregate fee.
    pub fn set_fee(&mut self, fee: f64) {
        self.fee = fee;
    }
}
