//! Mining rounds, threshold verification, and reward settlement driven
//! through repeated Admin ↔ Miner contacts.

#[cfg(test)]
mod tests {
    use crate::integration::support::{engine_with, init_tracing, node, signed_tx, tampered_tx};
    use oc_contact_engine::{EngineConfig, RunState};
    use oc_ledger::Batch;
    use shared_types::{leading_zero_nibbles, NodeId};

    fn small_round_config(quorum: usize, threshold: u32) -> EngineConfig {
        EngineConfig {
            miner_quorum: quorum,
            vote_threshold: threshold,
            ..Default::default()
        }
    }

    #[test]
    fn test_threshold_exactness_commits_once() {
        init_tracing();
        let mut engine = engine_with(small_round_config(3, 3), 1, 1);
        let mut admin = node(&engine, 0, "adm0");
        let mut m1 = node(&engine, 1, "min1");
        let mut m2 = node(&engine, 2, "min2");
        let mut m3 = node(&engine, 3, "min3");

        admin.admin_mut().unwrap().batches.push(Batch::new(vec![
            signed_tx(0, 10.0),
            signed_tx(1, 20.0),
        ]));

        // Mining round: three distinct miners produce candidates; the
        // third contact completes the quorum, selects the winner, and
        // already casts that miner's verification vote.
        engine.on_exchange(&mut admin, &mut m1, 20_000.0);
        engine.on_exchange(&mut admin, &mut m2, 20_001.0);
        engine.on_exchange(&mut admin, &mut m3, 20_002.0);

        let state = admin.admin().unwrap();
        assert!(state.selected_block.is_some());
        assert_eq!(state.votes, 1);
        assert_eq!(engine.chain().lock().len(), 1);

        // A repeated contact must not double-count a vote.
        engine.on_exchange(&mut admin, &mut m3, 20_003.0);
        assert_eq!(admin.admin().unwrap().votes, 1);

        engine.on_exchange(&mut admin, &mut m1, 20_004.0);
        assert_eq!(admin.admin().unwrap().votes, 2);
        assert_eq!(engine.chain().lock().len(), 1);

        // Third distinct vote hits the threshold exactly: commit + reset.
        let run = engine.on_exchange(&mut admin, &mut m2, 20_005.0);
        assert_eq!(engine.chain().lock().len(), 2);
        let state = admin.admin().unwrap();
        assert_eq!(state.votes, 0);
        assert!(state.verify_visited.is_empty());
        assert!(state.selected_block.is_none());
        assert!(state.started_appending);
        assert!(state.appending_done);
        assert_eq!(run, RunState::AppendingDone);
    }

    #[test]
    fn test_invalid_transactions_dropped_before_mining() {
        init_tracing();
        let mut engine = engine_with(small_round_config(1, 1), 1, 1);
        let mut admin = node(&engine, 0, "adm0");
        let mut miner = node(&engine, 1, "min1");

        admin.admin_mut().unwrap().batches.push(Batch::new(vec![
            signed_tx(0, 10.0),
            tampered_tx(1, 20.0),
            signed_tx(2, 5.0),
        ]));

        engine.on_exchange(&mut admin, &mut miner, 20_000.0);

        let chain = engine.chain().lock();
        assert_eq!(chain.len(), 2);
        let block = chain.latest();
        assert_eq!(block.transactions().len(), 2);
        // Fee follows the surviving transactions only: 1% of 15.
        assert!((block.fee() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_mining_meets_higher_difficulty() {
        init_tracing();
        let mut engine = engine_with(small_round_config(1, 1), 2, 1);
        let mut admin = node(&engine, 0, "adm0");
        let mut miner = node(&engine, 1, "min1");

        admin
            .admin_mut()
            .unwrap()
            .batches
            .push(Batch::new(vec![signed_tx(0, 7.0)]));

        engine.on_exchange(&mut admin, &mut miner, 20_000.0);

        let chain = engine.chain().lock();
        assert_eq!(chain.len(), 2);
        let hash = chain.latest().hash();
        assert!(leading_zero_nibbles(&hash) >= 2);
    }

    #[test]
    fn test_reward_conservation_across_miners() {
        init_tracing();
        let mut engine = engine_with(small_round_config(2, 2), 1, 1);
        let mut admin = node(&engine, 0, "adm0");
        let mut m1 = node(&engine, 1, "min1");
        let mut m2 = node(&engine, 2, "min2");

        {
            let state = admin.admin_mut().unwrap();
            state.batches.push(Batch::new(vec![signed_tx(0, 10.0)]));
            state.batches.push(Batch::new(vec![signed_tx(1, 20.0)]));
        }

        // Round one: m1 mines first, so the tie on mining duration keeps
        // m1's candidate. m2's contact completes the quorum and votes.
        engine.on_exchange(&mut admin, &mut m1, 20_000.0);
        engine.on_exchange(&mut admin, &mut m2, 20_001.0);
        engine.on_exchange(&mut admin, &mut m1, 20_002.0);
        assert_eq!(engine.chain().lock().len(), 2);

        // Round two: m2 mines first and wins the tie.
        engine.on_exchange(&mut admin, &mut m2, 20_003.0);
        engine.on_exchange(&mut admin, &mut m1, 20_004.0);
        let run = engine.on_exchange(&mut admin, &mut m2, 20_005.0);
        assert_eq!(engine.chain().lock().len(), 3);
        assert_eq!(run, RunState::AppendingDone);

        // Settlement: each miner paid exactly once, in miner→admin
        // contact direction.
        engine.on_exchange(&mut m1, &mut admin, 20_006.0);
        let run = engine.on_exchange(&mut m2, &mut admin, 20_007.0);
        assert_eq!(run, RunState::SettlementComplete);

        let paid_m1 = m1.wallet().unwrap().balance();
        let paid_m2 = m2.wallet().unwrap().balance();
        assert!((paid_m1 - 0.2).abs() < 1e-9);
        assert!((paid_m2 - 0.1).abs() < 1e-9);

        let total_fees = engine.chain().lock().total_fees();
        assert!((paid_m1 + paid_m2 - total_fees).abs() < 1e-9);

        // Paying again changes nothing.
        engine.on_exchange(&mut m1, &mut admin, 20_008.0);
        assert!((m1.wallet().unwrap().balance() - paid_m1).abs() < 1e-12);
        assert!(admin.admin().unwrap().rewarded_miners.contains(&NodeId(1)));
        assert!(admin.admin().unwrap().reward_ledger.is_empty());
    }

    #[test]
    fn test_internet_learns_appending_done() {
        init_tracing();
        let mut engine = engine_with(small_round_config(1, 1), 1, 1);
        let mut admin = node(&engine, 0, "adm0");
        let mut miner = node(&engine, 1, "min1");
        let mut internet = node(&engine, 2, "inter0");

        admin
            .admin_mut()
            .unwrap()
            .batches
            .push(Batch::new(vec![signed_tx(0, 3.0)]));

        // Nothing to learn before the run finishes appending.
        engine.on_exchange(&mut internet, &mut admin, 20_000.0);
        assert!(!internet.internet().unwrap().appending_done);

        engine.on_exchange(&mut admin, &mut miner, 20_001.0);
        assert!(admin.admin().unwrap().appending_done);

        engine.on_exchange(&mut internet, &mut admin, 20_002.0);
        assert!(internet.internet().unwrap().appending_done);
    }

    #[test]
    fn test_no_new_round_while_block_selected() {
        init_tracing();
        // Quorum 1 but threshold 2: the selected block stays in
        // verification after one vote, so a second batch must wait.
        let mut engine = engine_with(small_round_config(2, 2), 1, 1);
        let mut admin = node(&engine, 0, "adm0");
        let mut m1 = node(&engine, 1, "min1");
        let mut m2 = node(&engine, 2, "min2");

        {
            let state = admin.admin_mut().unwrap();
            state.batches.push(Batch::new(vec![signed_tx(0, 10.0)]));
            state.batches.push(Batch::new(vec![signed_tx(1, 20.0)]));
        }

        engine.on_exchange(&mut admin, &mut m1, 20_000.0);
        engine.on_exchange(&mut admin, &mut m2, 20_001.0);

        // One batch consumed, its block selected; the mining round for
        // the second batch has not started.
        let state = admin.admin().unwrap();
        assert!(state.selected_block.is_some());
        assert_eq!(state.batches.len(), 1);
        assert!(!state.mining_round.has_visited(NodeId(1)));
        assert!(!state.mining_round.has_visited(NodeId(2)));
    }
}
