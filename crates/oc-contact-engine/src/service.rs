//! The contact decision engine.
//!
//! One engine instance serves a whole run. Every method is invoked
//! synchronously from a contact callback; nothing blocks, and mining is a
//! tight local computation inside the callback that triggers it.

use crate::clock::{MiningClock, SystemClock};
use crate::config::EngineConfig;
use crate::domain::{best_batch_index, ContactMessage, Node, Role};
use crate::error::EngineResult;
use oc_ledger::{Block, ChainHandle, RewardEntry, Transaction};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared_types::{hash_hex, SimTime};
use tracing::{debug, info, warn};

/// Where the run currently stands, as reported back to the driving loop.
///
/// The loop owns shutdown: the engine only ever signals, it never exits
/// the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Batches are still flowing, being mined, or being verified.
    Running,
    /// Every pending batch has been committed; settlement is under way.
    AppendingDone,
    /// The reward ledger has been drained; the run can stop.
    SettlementComplete,
}

/// The protocol state machine invoked once per directed contact event.
pub struct DecisionEngine {
    config: EngineConfig,
    chain: ChainHandle,
    clock: Box<dyn MiningClock>,
    rng: StdRng,
    accepted_transactions: usize,
    run_state: RunState,
}

impl DecisionEngine {
    /// Build an engine with the real wall clock and an entropy-seeded RNG.
    pub fn new(config: EngineConfig, chain: ChainHandle) -> EngineResult<Self> {
        Self::with_clock(config, chain, Box::new(SystemClock))
    }

    /// Build an engine with an injected mining clock (tests use a manual
    /// clock so duration measurements are deterministic).
    pub fn with_clock(
        config: EngineConfig,
        chain: ChainHandle,
        clock: Box<dyn MiningClock>,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            chain,
            clock,
            rng: StdRng::from_entropy(),
            accepted_transactions: 0,
            run_state: RunState::Running,
        })
    }

    /// Replace the batch-sizing RNG with a seeded one.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The configuration this engine runs under.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared chain handle.
    pub fn chain(&self) -> &ChainHandle {
        &self.chain
    }

    /// Transactions accepted into proxy buffers so far.
    pub fn accepted_transactions(&self) -> usize {
        self.accepted_transactions
    }

    /// Current terminal-state signal.
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    // ------------------------------------------------------------------
    // Contact entry points
    // ------------------------------------------------------------------

    /// A connection to `peer` came up. Inside the grouping window this
    /// triggers the host proxy's one-shot batch grouping.
    pub fn on_connection_up(&mut self, host: &mut Node, _peer: &Node, now: SimTime) {
        if host.role() == Role::OperatorProxy {
            let (start, end) = self.config.grouping_window;
            if now > start && now < end {
                let host_id = host.id();
                if let Some(proxy) = host.proxy_mut() {
                    let already = proxy.has_grouped();
                    proxy.group_transactions(
                        self.config.batch_min,
                        self.config.batch_max,
                        &mut self.rng,
                    );
                    if !already && proxy.has_grouped() {
                        info!(
                            "{}: grouped {} transactions into {} batches",
                            host_id,
                            proxy.storage_used(),
                            proxy.batches.len()
                        );
                    }
                }
            }
        }
    }

    /// A connection went down. Reserved extension point.
    pub fn on_connection_down(&mut self, _host: &mut Node, _peer: &Node, _now: SimTime) {}

    /// The main protocol dispatch, run for every live pair once the
    /// bootstrap phase is over. Sub-protocols are keyed off the roles of
    /// the two contacting nodes and are each idempotent under repeated
    /// invocation.
    pub fn on_exchange(&mut self, host: &mut Node, peer: &mut Node, now: SimTime) -> RunState {
        if now >= self.config.exchange_start {
            self.forward_batches(host, peer);
            self.mining_round(host, peer);
            self.verification_round(host, peer);
            self.reward_settlement(host, peer);
        }
        self.run_state
    }

    // ------------------------------------------------------------------
    // (a) Hierarchical forwarding
    // ------------------------------------------------------------------

    /// Move batch sets one tier upward, exactly once per (lower, upper)
    /// pair.
    fn forward_batches(&mut self, host: &mut Node, peer: &mut Node) {
        let (host_id, peer_id) = (host.id(), peer.id());

        if host.role() == Role::OperatorProxy && peer.role() == Role::Home {
            if let (Some(proxy), Some(home)) = (host.proxy_mut(), peer.home_mut()) {
                if !proxy.batches.is_empty() && !home.visited_proxies.contains(&host_id) {
                    home.visited_proxies.insert(host_id);
                    let moved = proxy.batches.len();
                    home.batches.append(&mut proxy.batches);
                    info!(
                        "{} -> {}: home absorbed {} batches ({} proxies seen)",
                        host_id,
                        peer_id,
                        moved,
                        home.visited_proxies.len()
                    );
                }
            }
        }

        if host.role() == Role::Home && peer.role() == Role::Collector {
            if let (Some(home), Some(collector)) = (host.home_mut(), peer.collector_mut()) {
                if home.visited_proxies.len() == self.config.proxies_per_home
                    && !home.batches.is_empty()
                    && collector.batches.is_empty()
                {
                    collector.batches.append(&mut home.batches);
                    info!(
                        "{} -> {}: collector received {} batches",
                        host_id,
                        peer_id,
                        collector.batches.len()
                    );
                }
            }
        }

        if host.role() == Role::Collector && peer.role() == Role::Internet {
            if let (Some(collector), Some(internet)) = (host.collector_mut(), peer.internet_mut()) {
                if !collector.batches.is_empty() && internet.batches.is_empty() {
                    internet.batches.append(&mut collector.batches);
                    info!(
                        "{} -> {}: internet received {} batches",
                        host_id,
                        peer_id,
                        internet.batches.len()
                    );
                }
            }
        }

        if host.role() == Role::Internet && peer.role() == Role::Admin {
            if let (Some(internet), Some(admin)) = (host.internet_mut(), peer.admin_mut()) {
                if !internet.batches.is_empty()
                    && admin.batches.is_empty()
                    && !admin.started_appending
                {
                    admin.batches.append(&mut internet.batches);
                    info!(
                        "{} -> {}: admin received {} batches, mining begins",
                        host_id,
                        peer_id,
                        admin.batches.len()
                    );
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // (b) Mining round
    // ------------------------------------------------------------------

    /// Collect proof-of-work candidates from distinct miners, then keep
    /// the fastest one for verification.
    ///
    /// Active only while the Admin holds batches and no candidate is
    /// already under verification.
    fn mining_round(&mut self, host: &mut Node, peer: &Node) {
        if host.role() != Role::Admin || peer.role() != Role::Miner {
            return;
        }
        let peer_id = peer.id();
        let Some(admin) = host.admin_mut() else {
            return;
        };
        if admin.batches.is_empty() || admin.selected_block.is_some() {
            return;
        }

        if admin.mining_round.visit(peer_id) {
            if let Some(index) = best_batch_index(&admin.batches) {
                let batch = &admin.batches[index];
                let mut transactions = batch.transactions.clone();
                transactions.retain(|tx| {
                    let valid = tx.verify_signature();
                    if !valid {
                        warn!(
                            "transaction {} failed signature verification, dropped",
                            hash_hex(&tx.tx_hash)
                        );
                    }
                    valid
                });
                let total: f64 = transactions.iter().map(|tx| tx.amount).sum();
                let fee = self.config.fee_rate * total;

                let (previous_hash, difficulty) = {
                    let chain = self.chain.lock();
                    (chain.latest().hash(), chain.difficulty())
                };
                let mut block = Block::new(previous_hash, transactions, self.clock.now_millis());
                block.set_fee(fee);
                block.set_mined_by(peer_id);

                let began = self.clock.now_millis();
                block.mine(difficulty);
                let elapsed = self.clock.now_millis().saturating_sub(began);
                block.set_mining_interval_ms(elapsed);

                debug!(
                    "miner {} produced candidate {} in {} ms",
                    peer_id,
                    hash_hex(&block.hash()),
                    elapsed
                );
                admin.mining_round.push_candidate(block);
            }
        }

        if admin.mining_round.is_complete() {
            if let Some(index) = best_batch_index(&admin.batches) {
                admin.batches.remove(index);
            }
            if let Some(winner) = admin.mining_round.take_best() {
                info!(
                    "mining round complete: selected candidate from {} ({} ms), {} batches left",
                    winner.mined_by().map_or_else(String::new, |m| m.to_string()),
                    winner.mining_interval_ms(),
                    admin.batches.len()
                );
                admin.selected_block = Some(winner);
            }
        }
    }

    // ------------------------------------------------------------------
    // (c) Verification round
    // ------------------------------------------------------------------

    /// One vote per distinct miner; the block commits when the vote count
    /// hits the threshold exactly.
    ///
    /// The commit condition is `==`, not `>=`: a counter that ever
    /// stepped past the threshold without landing on it would stall
    /// consensus. Votes advance by at most one per contact, which keeps
    /// the equality reachable.
    fn verification_round(&mut self, host: &mut Node, peer: &Node) {
        if host.role() != Role::Admin || peer.role() != Role::Miner {
            return;
        }
        let peer_id = peer.id();
        let Some(admin) = host.admin_mut() else {
            return;
        };
        if admin.selected_block.is_none() {
            return;
        }

        if admin.verify_visited.insert(peer_id) {
            if let Some(selected) = admin.selected_block.as_ref() {
                // The voter recomputes the hash from block content and
                // compares against the stored proof-of-work result.
                if selected.calculate_hash() == selected.hash() {
                    admin.votes += 1;
                    debug!("miner {} verified the block ({} votes)", peer_id, admin.votes);
                }
            }
        }

        if admin.votes == self.config.vote_threshold {
            if let Some(block) = admin.selected_block.take() {
                let committed = block.clone();
                self.chain.lock().append(committed);

                if let Some(miner) = block.mined_by() {
                    admin.reward_ledger.push(RewardEntry {
                        miner,
                        fee: block.fee(),
                    });
                }

                admin.votes = 0;
                admin.verify_visited.clear();
                admin.started_appending = true;
                info!(
                    "block verified and committed, {} batches pending",
                    admin.batches.len()
                );

                if admin.batches.is_empty() {
                    admin.appending_done = true;
                    self.run_state = RunState::AppendingDone;
                    info!("all batches committed, settlement begins");
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // (d) Reward settlement
    // ------------------------------------------------------------------

    /// After appending finishes: spread the done-flag to the Internet
    /// tier and pay each miner its recorded fees exactly once.
    fn reward_settlement(&mut self, host: &mut Node, peer: &mut Node) {
        if host.role() == Role::Internet && peer.role() == Role::Admin {
            if peer.admin().is_some_and(|a| a.appending_done) {
                if let Some(internet) = host.internet_mut() {
                    internet.appending_done = true;
                }
            }
        }

        if host.role() == Role::Miner && peer.role() == Role::Admin {
            let host_id = host.id();
            let host_name = host.name().to_owned();
            let Some(wallet) = host.wallet_mut() else {
                return;
            };
            let Some(admin) = peer.admin_mut() else {
                return;
            };
            if !admin.appending_done || admin.rewarded_miners.contains(&host_id) {
                return;
            }

            let mut paid = 0.0;
            admin.reward_ledger.retain(|entry| {
                if entry.miner == host_id {
                    wallet.credit(entry.fee);
                    paid += entry.fee;
                    false
                } else {
                    true
                }
            });
            admin.rewarded_miners.insert(host_id);
            if paid > 0.0 {
                info!(
                    "rewarded {}: {:.4} credited (balance {:.4})",
                    host_name,
                    paid,
                    wallet.balance()
                );
            }

            if admin.reward_ledger.is_empty() {
                self.run_state = RunState::SettlementComplete;
                info!("reward ledger drained, settlement complete");
            }
        }
    }

    // ------------------------------------------------------------------
    // Message acceptance policy (answers for the transport layer)
    // ------------------------------------------------------------------

    /// Accept every newly created message.
    pub fn accept_new_message(&self, _message: &ContactMessage) -> bool {
        true
    }

    /// Whether `node` is the message's final destination.
    pub fn is_final_destination(&self, message: &ContactMessage, node: &Node) -> bool {
        message.to == node.id()
    }

    /// Whether the receiving node should keep the message.
    ///
    /// Side effect: a transaction payload arriving at an OperatorProxy is
    /// pushed into its buffer while the global cap allows, and the
    /// acceptance counter advances. Duplicate suppression is transport
    /// bookkeeping and stays out of the core.
    pub fn should_save_received(&mut self, message: &ContactMessage, host: &mut Node) -> bool {
        if host.role() == Role::OperatorProxy {
            if let Some(tx) = &message.payload {
                if self.accepted_transactions < self.config.max_transactions {
                    host.add_transaction_to_buffer(tx.clone());
                    self.accepted_transactions += 1;
                }
            }
        }
        true
    }

    /// Whether to hand the message to a neighbor: bootstrap window only,
    /// same-area restrictions between miners and between a proxy and a
    /// miner, and generally edge-to-relay.
    pub fn should_forward(
        &self,
        _message: &ContactMessage,
        from: &Node,
        to: &Node,
        now: SimTime,
    ) -> bool {
        if now > self.config.bootstrap_deadline {
            return false;
        }
        if from.role() == Role::Miner && to.role() == Role::Miner && from.area() != to.area() {
            return false;
        }
        if from.role() == Role::OperatorProxy && to.role() == Role::Miner && from.area() != to.area()
        {
            return false;
        }
        from.role() == Role::Generator
            && matches!(to.role(), Role::OperatorProxy | Role::Generator)
    }

    /// Drop the sent copy once the message reached its destination.
    pub fn should_delete_sent(&self, message: &ContactMessage, other: &Node) -> bool {
        message.to == other.id()
    }

    /// No retention policy under buffer pressure.
    pub fn should_delete_old(&self, _message: &ContactMessage) -> bool {
        true
    }

    /// Record a transaction accepted outside the message path.
    ///
    /// The contact source uses this when it feeds proxies directly, so
    /// the cap still applies. Returns whether the transaction was taken.
    pub fn offer_transaction(&mut self, host: &mut Node, tx: Transaction) -> bool {
        if host.role() != Role::OperatorProxy {
            return false;
        }
        if self.accepted_transactions >= self.config.max_transactions {
            return false;
        }
        host.add_transaction_to_buffer(tx);
        self.accepted_transactions += 1;
        true
    }
}
