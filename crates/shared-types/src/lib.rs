//! # Shared Types Crate
//!
//! Primitive types shared across the Opportunistic-Chain workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: digest, signature, and identifier types
//!   are defined here and nowhere else.
//! - **No behavior**: this crate carries data definitions only; ledger and
//!   protocol logic live in `oc-ledger` and `oc-contact-engine`.

pub mod primitives;

pub use primitives::*;
