//! End-to-end cascade: transactions enter a proxy buffer, get grouped,
//! climb every tier, and come out the other side as a committed,
//! rewarded block.

#[cfg(test)]
mod tests {
    use crate::integration::support::{engine_with, init_tracing, node, signed_tx};
    use oc_contact_engine::{ContactMessage, EngineConfig, RunState};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::{leading_zero_nibbles, NodeId};

    /// First small seed whose opening draw in 1..=3 covers the whole
    /// three-transaction buffer, so grouping yields a single batch.
    fn seed_drawing_full_buffer() -> u64 {
        (0..1_000u64)
            .find(|&seed| StdRng::seed_from_u64(seed).gen_range(1..=3) == 3)
            .expect("some small seed draws a full-size batch")
    }

    fn cascade_config() -> EngineConfig {
        EngineConfig {
            batch_min: 1,
            batch_max: 3,
            proxies_per_home: 1,
            miner_quorum: 1,
            vote_threshold: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_cascade() {
        init_tracing();
        let seed = seed_drawing_full_buffer();
        let mut engine = engine_with(cascade_config(), 1, seed);

        let mut proxy = node(&engine, 1, "ope1");
        let mut home = node(&engine, 2, "home1");
        let mut collector = node(&engine, 3, "col1");
        let mut internet = node(&engine, 4, "inter1");
        let mut admin = node(&engine, 5, "adm1");
        let mut miner = node(&engine, 6, "min1");

        // Transactions of {10, 20, 5} arrive at the proxy through the
        // transport's save-policy query.
        for (seq, amount) in [10.0, 20.0, 5.0].into_iter().enumerate() {
            let message = ContactMessage::with_transaction(
                NodeId(100 + seq as u32),
                proxy.id(),
                signed_tx(seq as u32, amount),
            );
            assert!(engine.should_save_received(&message, &mut proxy));
        }
        assert_eq!(proxy.proxy().unwrap().buffer_len(), 3);

        // Grouping inside the window: one batch of all three.
        engine.on_connection_up(&mut proxy, &miner, 16_000.0);
        {
            let state = proxy.proxy().unwrap();
            assert!(state.has_grouped());
            assert_eq!(state.batches.len(), 1);
            assert_eq!(state.batches[0].len(), 3);
        }

        // The batch cascades unmodified through every tier.
        engine.on_exchange(&mut proxy, &mut home, 20_000.0);
        assert_eq!(home.home().unwrap().batches.len(), 1);

        engine.on_exchange(&mut home, &mut collector, 20_001.0);
        assert_eq!(collector.collector().unwrap().batches.len(), 1);

        engine.on_exchange(&mut collector, &mut internet, 20_002.0);
        assert_eq!(internet.internet().unwrap().batches.len(), 1);

        engine.on_exchange(&mut internet, &mut admin, 20_003.0);
        {
            let state = admin.admin().unwrap();
            assert_eq!(state.batches.len(), 1);
            let amounts: Vec<f64> = state.batches[0]
                .transactions
                .iter()
                .map(|tx| tx.amount)
                .collect();
            assert_eq!(amounts, vec![10.0, 20.0, 5.0]);
        }

        // Quorum 1, threshold 1: a single miner contact mines, selects,
        // verifies, and commits in one exchange.
        let run = engine.on_exchange(&mut admin, &mut miner, 20_004.0);
        assert_eq!(run, RunState::AppendingDone);

        {
            let chain = engine.chain().lock();
            assert_eq!(chain.len(), 2);
            let block = chain.latest();
            assert_eq!(block.transactions().len(), 3);
            assert_eq!(block.mined_by(), Some(miner.id()));
            assert!(leading_zero_nibbles(&block.hash()) >= 1);
            assert_eq!(block.hash(), block.calculate_hash());
            // 1% of 35.
            assert!((block.fee() - 0.35).abs() < 1e-9);
        }

        // The done-flag travels back down to the Internet tier, and the
        // miner collects its fee.
        engine.on_exchange(&mut internet, &mut admin, 20_005.0);
        assert!(internet.internet().unwrap().appending_done);

        let run = engine.on_exchange(&mut miner, &mut admin, 20_006.0);
        assert_eq!(run, RunState::SettlementComplete);
        let balance = miner.wallet().unwrap().balance();
        assert!((balance - 0.35).abs() < 1e-9);
        let total_fees = engine.chain().lock().total_fees();
        assert!((balance - total_fees).abs() < 1e-9);
    }

    #[test]
    fn test_cascade_is_idempotent_per_tier() {
        init_tracing();
        let seed = seed_drawing_full_buffer();
        let mut engine = engine_with(cascade_config(), 1, seed);

        let mut proxy = node(&engine, 1, "ope1");
        let mut home = node(&engine, 2, "home1");
        let mut collector = node(&engine, 3, "col1");

        for seq in 0..3u32 {
            let message = ContactMessage::with_transaction(
                NodeId(100 + seq),
                proxy.id(),
                signed_tx(seq, 1.0),
            );
            engine.should_save_received(&message, &mut proxy);
        }
        engine.on_connection_up(&mut proxy, &home, 16_000.0);

        // Repeating a contact moves the batch set exactly once.
        engine.on_exchange(&mut proxy, &mut home, 20_000.0);
        engine.on_exchange(&mut proxy, &mut home, 20_001.0);
        assert_eq!(home.home().unwrap().batches.len(), 1);
        assert!(proxy.proxy().unwrap().batches.is_empty());

        engine.on_exchange(&mut home, &mut collector, 20_002.0);
        engine.on_exchange(&mut home, &mut collector, 20_003.0);
        assert_eq!(collector.collector().unwrap().batches.len(), 1);
        assert!(home.home().unwrap().batches.is_empty());
    }
}
