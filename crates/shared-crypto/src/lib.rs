//! # Shared Crypto - Hashing & Signing Service
//!
//! The opaque cryptographic service the ledger depends on: a fixed-length
//! digest over arbitrary byte content, and sign/verify against a key pair.
//! Pure functions, no state.
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Transaction and block digests |
//! | `signatures` | Ed25519 | Transaction signing |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many, Sha256Hasher};
pub use signatures::{KeyPair, VerifierKey};
