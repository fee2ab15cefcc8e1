//! Error types for the contact decision engine.

use thiserror::Error;

/// Configuration rejected at engine construction.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Miner quorum of zero would stall every mining round.
    #[error("miner quorum must be at least 1")]
    QuorumZero,

    /// A home relay that waits for zero proxies never forwards.
    #[error("proxies per home must be at least 1")]
    HomeQuorumZero,

    /// The vote threshold must be reachable by the miner quorum.
    #[error("vote threshold {threshold} outside 1..={quorum}")]
    ThresholdOutOfRange {
        /// Configured threshold.
        threshold: u32,
        /// Configured miner quorum.
        quorum: usize,
    },

    /// Batch bounds must satisfy 1 <= min <= max.
    #[error("batch size bounds invalid: min {min}, max {max}")]
    BatchBoundsInvalid {
        /// Configured lower bound.
        min: usize,
        /// Configured upper bound.
        max: usize,
    },

    /// The grouping window must be a non-empty time range.
    #[error("grouping window inverted: {start} >= {end}")]
    GroupingWindowInverted {
        /// Window start, simulated seconds.
        start: f64,
        /// Window end, simulated seconds.
        end: f64,
    },

    /// Fee rate is a share of batch value.
    #[error("fee rate must lie in [0, 1], got {0}")]
    FeeRateOutOfRange(f64),
}

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid configuration (see [`ConfigError`]).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A node name matched no known role prefix; the scenario setup is
    /// broken and the run aborts.
    #[error("no role prefix matches node name {0:?}")]
    UnknownRolePrefix(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
