//! # oc-ledger
//!
//! Ledger primitives for Opportunistic-Chain.
//!
//! ## Architecture
//!
//! Three layers, all in-memory for the duration of a run:
//!
//! - [`Transaction`] / [`Batch`]: immutable signed transfer records and the
//!   bounded groupings that cross tier boundaries as opaque units.
//! - [`Block`]: a batch bundled behind a proof-of-work nonce. Hash =
//!   digest(previous hash, timestamp, nonce, transaction hashes); a block
//!   is valid for difficulty `d` when its hash starts with `d` zero hex
//!   digits.
//! - [`Blockchain`] / [`ChainHandle`]: the append-only chain with a single
//!   genesis block and fixed difficulty, shared between participants
//!   through a mutex-guarded handle with single-writer discipline.
//!
//! Blocks are created transiently during a mining round and either
//! discarded or promoted into the chain; the chain only ever grows.

pub mod domain;

pub use domain::{
    Batch, Block, Blockchain, ChainHandle, LedgerError, LedgerResult, RewardEntry, Transaction,
    Wallet,
};
