//! Miner wallets and reward bookkeeping.

use serde::{Deserialize, Serialize};
use shared_types::NodeId;

/// Balance held by a mining or generating node.
///
/// Credited only by the reward settlement step; balances never decrease
/// during a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wallet {
    balance: f64,
}

impl Wallet {
    /// Current balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Add a mining fee to the balance.
    pub fn credit(&mut self, amount: f64) {
        debug_assert!(amount >= 0.0, "wallet credits must be non-negative");
        self.balance += amount;
    }
}

/// A fee owed to a miner, recorded when its block is committed.
///
/// The Admin drains these during reward settlement; keeping them apart
/// from the chain preserves the append-only chain invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEntry {
    /// Miner that produced the committed block.
    pub miner: NodeId,
    /// Fee recorded on that block.
    pub fee: f64,
}
