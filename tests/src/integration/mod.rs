//! Cross-crate integration tests.

mod consensus;
mod pipeline;

#[cfg(test)]
pub(crate) mod support {
    use oc_contact_engine::{DecisionEngine, EngineConfig, ManualClock, Node};
    use oc_ledger::{Blockchain, ChainHandle, Transaction};
    use shared_crypto::signatures::KeyPair;
    use shared_types::{AreaId, NodeId};

    /// Quiet tracing output unless RUST_LOG asks for it.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Engine over a fresh chain with a manual clock and seeded RNG.
    pub fn engine_with(config: EngineConfig, difficulty: usize, seed: u64) -> DecisionEngine {
        let chain = ChainHandle::new(Blockchain::new(difficulty).unwrap());
        DecisionEngine::with_clock(config, chain, Box::new(ManualClock::new()))
            .unwrap()
            .with_rng_seed(seed)
    }

    /// Node built from its display name; the role comes from the prefix.
    pub fn node(engine: &DecisionEngine, id: u32, name: &str) -> Node {
        Node::new(NodeId(id), name, AreaId(0), engine.config()).unwrap()
    }

    /// A validly signed transaction of the given amount.
    pub fn signed_tx(seq: u32, amount: f64) -> Transaction {
        let keypair = KeyPair::from_seed([0x11u8; 32]);
        Transaction::signed(NodeId(1_000 + seq), NodeId(2_000), amount, &keypair)
    }

    /// A transaction whose signature no longer matches its content.
    pub fn tampered_tx(seq: u32, amount: f64) -> Transaction {
        let mut tx = signed_tx(seq, amount);
        tx.amount += 1.0;
        tx
    }
}
