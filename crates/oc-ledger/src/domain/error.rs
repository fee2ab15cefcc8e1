//! Error types for the ledger.

use thiserror::Error;

/// Ledger construction errors.
///
/// Runtime chain-linkage violations are not represented here: a block
/// built against a stale head is a caller bug and asserts, it is never
/// silently repaired.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Difficulty outside the representable range of leading zero hex
    /// digits for a 256-bit digest.
    #[error("difficulty out of range: {0} (expected 1..=64)")]
    DifficultyOutOfRange(usize),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
