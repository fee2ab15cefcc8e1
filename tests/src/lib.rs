//! # Opportunistic-Chain Test Suite
//!
//! Unified test crate for cross-crate behavior:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── consensus.rs   # mining rounds, threshold commits, rewards
//!     └── pipeline.rs    # end-to-end tier cascade scenario
//! ```
//!
//! Run with `cargo test -p oc-tests`. Unit tests live next to the code
//! they cover inside each crate.

#![allow(dead_code)]

pub mod integration;
