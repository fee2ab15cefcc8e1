//! In-flight message view for the acceptance policy.

use oc_ledger::Transaction;
use serde::{Deserialize, Serialize};
use shared_types::NodeId;
use uuid::Uuid;

/// The slice of a transport message the acceptance policy inspects:
/// identity, endpoints, and an optional transaction payload.
///
/// Byte accounting, buffering, and retransmission belong to the excluded
/// transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Transport-unique message id.
    pub id: Uuid,
    /// Originating node.
    pub from: NodeId,
    /// Final destination.
    pub to: NodeId,
    /// Transaction carried toward an OperatorProxy, if any.
    pub payload: Option<Transaction>,
}

impl ContactMessage {
    /// A payload-less control message.
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            payload: None,
        }
    }

    /// A message carrying one transaction.
    pub fn with_transaction(from: NodeId, to: NodeId, tx: Transaction) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            payload: Some(tx),
        }
    }
}
