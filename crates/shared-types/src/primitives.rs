//! # Core Primitive Types
//!
//! Digest, signature, and identifier types used by the ledger and the
//! contact decision engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte SHA-256 digest.
///
/// Rendered as 64 hex characters; "the first D hex characters" of a hash
/// are the first D nibbles of this array.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Simulated time in seconds, as reported by the external contact source.
pub type SimTime = f64;

/// The fixed parent-hash sentinel carried by the genesis block.
pub const GENESIS_PARENT: Hash = [0u8; 32];

/// Unique address of a simulated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Deployment area a node belongs to.
///
/// The transport forwarding policy restricts some exchanges to nodes of
/// the same area; the tag is assigned once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct AreaId(pub u32);

/// Count of leading zero hex digits (nibbles) in a digest.
///
/// A block hash meets difficulty `d` when this is at least `d`.
pub fn leading_zero_nibbles(hash: &Hash) -> usize {
    let mut count = 0;
    for byte in hash {
        if byte >> 4 != 0 {
            return count;
        }
        count += 1;
        if byte & 0x0F != 0 {
            return count;
        }
        count += 1;
    }
    count
}

/// Hex rendering of a digest, for logs and display output.
pub fn hash_hex(hash: &Hash) -> String {
    hex::encode(hash)
}
