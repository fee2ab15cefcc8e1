//! Transactions and batches.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::signatures::{KeyPair, VerifierKey};
use shared_crypto::sha256_many;
use shared_types::{Hash, NodeId, PublicKey, Signature};

/// A signed transfer record created once by a Generator node and immutable
/// thereafter.
///
/// The content hash covers the signed payload plus the signature and is
/// computed at construction; it never changes afterwards.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Originating node.
    pub sender: NodeId,
    /// Destination node.
    pub receiver: NodeId,
    /// Transfer amount; non-negative.
    pub amount: f64,
    /// The sender's declared verification key.
    pub sender_key: PublicKey,
    /// Signature over the payload bytes.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
    /// Stable content hash.
    pub tx_hash: Hash,
}

impl Transaction {
    /// Create and sign a transaction with the sender's keypair.
    pub fn signed(sender: NodeId, receiver: NodeId, amount: f64, keypair: &KeyPair) -> Self {
        debug_assert!(amount >= 0.0, "transaction amount must be non-negative");

        let sender_key = *keypair.public_key().as_bytes();
        let payload = payload_bytes(sender, receiver, amount, &sender_key);
        let signature = keypair.sign(&payload);
        let tx_hash = sha256_many(&[&payload, &signature]);

        Self {
            sender,
            receiver,
            amount,
            sender_key,
            signature,
            tx_hash,
        }
    }

    /// Check the stored signature against the sender's declared key.
    ///
    /// Invalid transactions are dropped silently before mining; a failure
    /// here is never escalated.
    pub fn verify_signature(&self) -> bool {
        let payload = payload_bytes(self.sender, self.receiver, self.amount, &self.sender_key);
        match VerifierKey::from_bytes(self.sender_key) {
            Ok(key) => key.verify(&payload, &self.signature).is_ok(),
            Err(_) => false,
        }
    }
}

fn payload_bytes(sender: NodeId, receiver: NodeId, amount: f64, sender_key: &PublicKey) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(4 + 4 + 8 + 32);
    bytes.extend_from_slice(&sender.0.to_le_bytes());
    bytes.extend_from_slice(&receiver.0.to_le_bytes());
    bytes.extend_from_slice(&amount.to_bits().to_le_bytes());
    bytes.extend_from_slice(sender_key);
    bytes
}

/// An ordered grouping of transactions moved across tiers as one unit.
///
/// Produced by an OperatorProxy draining its inbound buffer; opaque from
/// that point on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Batch {
    /// The grouped transactions, in buffer order.
    pub transactions: Vec<Transaction>,
}

impl Batch {
    /// Wrap a list of transactions into a batch.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// The batch's value: the sum of its transactions' amounts.
    pub fn total_amount(&self) -> f64 {
        self.transactions.iter().map(|tx| tx.amount).sum()
    }

    /// Number of transactions in the batch.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the batch holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
