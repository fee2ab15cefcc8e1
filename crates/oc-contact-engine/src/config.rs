//! Configuration for the contact decision engine.

use crate::error::ConfigError;
use serde::Deserialize;
use shared_types::SimTime;

/// Runtime configuration consumed by the engine at construction.
///
/// The defaults mirror the reference deployment: a 7-vote commit
/// threshold, 15 miners per round, 8 operator proxies feeding each home
/// relay, and the 20 000-second bootstrap phase (the first 10 000 seconds
/// for transaction dissemination, grouping between 15 000 and 20 000).
#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
    /// Exact vote count that commits a verified block.
    pub vote_threshold: u32,

    /// Global cap on transactions accepted into proxy buffers.
    pub max_transactions: usize,

    /// Smallest batch produced when grouping a proxy buffer.
    pub batch_min: usize,

    /// Largest batch produced when grouping a proxy buffer.
    pub batch_max: usize,

    /// Operator proxies a home relay must collect from before forwarding.
    pub proxies_per_home: usize,

    /// Distinct miners consulted per mining round.
    pub miner_quorum: usize,

    /// Simulated time after which the transport stops forwarding.
    pub bootstrap_deadline: SimTime,

    /// Simulated-time window in which proxies group their buffers.
    pub grouping_window: (SimTime, SimTime),

    /// Simulated time at which the exchange protocol activates.
    pub exchange_start: SimTime,

    /// Block fee as a share of the mined batch's value.
    pub fee_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vote_threshold: 7,
            max_transactions: 1_000,
            batch_min: 5,
            batch_max: 8,
            proxies_per_home: 8,
            miner_quorum: 15,
            bootstrap_deadline: 10_000.0,
            grouping_window: (15_000.0, 20_000.0),
            exchange_start: 20_000.0,
            fee_rate: 0.01,
        }
    }
}

impl EngineConfig {
    /// Reject out-of-range configuration.
    ///
    /// A violation is a setup error, not a runtime condition: engine
    /// construction fails immediately.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.miner_quorum == 0 {
            return Err(ConfigError::QuorumZero);
        }
        if self.proxies_per_home == 0 {
            return Err(ConfigError::HomeQuorumZero);
        }
        if self.vote_threshold == 0 || self.vote_threshold as usize > self.miner_quorum {
            return Err(ConfigError::ThresholdOutOfRange {
                threshold: self.vote_threshold,
                quorum: self.miner_quorum,
            });
        }
        if self.batch_min == 0 || self.batch_min > self.batch_max {
            return Err(ConfigError::BatchBoundsInvalid {
                min: self.batch_min,
                max: self.batch_max,
            });
        }
        let (start, end) = self.grouping_window;
        if start >= end {
            return Err(ConfigError::GroupingWindowInverted { start, end });
        }
        if !(0.0..=1.0).contains(&self.fee_rate) {
            return Err(ConfigError::FeeRateOutOfRange(self.fee_rate));
        }
        Ok(())
    }
}
