//! Simulated participants and their role-scoped state.

use crate::config::EngineConfig;
use crate::domain::MiningRound;
use crate::error::{EngineError, EngineResult};
use oc_ledger::{Batch, Block, RewardEntry, Transaction, Wallet};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared_types::{AreaId, NodeId};
use std::collections::HashSet;
use std::fmt;

/// The single role a node carries for its whole lifetime.
///
/// Assigned once at construction from the node's display identity; every
/// role-membership test afterwards is a tag comparison, never a string
/// match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Edge node producing signed transactions.
    Generator,
    /// Proof-of-work participant with a wallet.
    Miner,
    /// First aggregation tier: buffers and groups transactions.
    OperatorProxy,
    /// Second tier: collects batches from a fixed set of proxies.
    Home,
    /// Third tier relay.
    Collector,
    /// Fourth tier relay; learns the appending-done flag.
    Internet,
    /// Runs mining rounds, verification, commits, and reward payout.
    Admin,
}

impl Role {
    /// Syntactic classification from the fixed display-name prefixes.
    ///
    /// This is the naming convention the scenario files use; it runs once
    /// per node, when the node is built.
    pub fn from_name(name: &str) -> Option<Role> {
        const PREFIXES: &[(&str, Role)] = &[
            ("node", Role::Generator),
            ("min", Role::Miner),
            ("ope", Role::OperatorProxy),
            ("home", Role::Home),
            ("col", Role::Collector),
            ("inter", Role::Internet),
            ("adm", Role::Admin),
        ];
        PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, role)| *role)
    }
}

/// Inbound buffer and batch production state of an OperatorProxy.
#[derive(Debug, Default)]
pub struct ProxyState {
    buffer: Vec<Transaction>,
    grouped: bool,
    storage_used: usize,
    /// Batches produced by the one-shot grouping, awaiting pickup.
    pub batches: Vec<Batch>,
}

impl ProxyState {
    /// Append a transaction to the inbound buffer.
    ///
    /// No-op once grouping has happened; the buffer is closed for good.
    pub fn add_transaction(&mut self, tx: Transaction) {
        if self.grouped {
            return;
        }
        self.storage_used += 1;
        self.buffer.push(tx);
    }

    /// One-shot: drain the buffer front-to-back into batches of a
    /// uniformly random size in `min..=max`, clipped to what remains.
    ///
    /// Sets the grouping-done flag; calling again changes nothing.
    pub fn group_transactions<R: Rng + ?Sized>(&mut self, min: usize, max: usize, rng: &mut R) {
        if self.grouped {
            return;
        }
        while !self.buffer.is_empty() {
            let size = rng.gen_range(min..=max).min(self.buffer.len());
            let packet: Vec<Transaction> = self.buffer.drain(..size).collect();
            self.batches.push(Batch::new(packet));
        }
        self.grouped = true;
    }

    /// Whether the one-shot grouping has happened.
    pub fn has_grouped(&self) -> bool {
        self.grouped
    }

    /// Transactions currently buffered.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Total transactions ever accepted into the buffer.
    pub fn storage_used(&self) -> usize {
        self.storage_used
    }
}

/// Batch collection state of a Home relay.
#[derive(Debug, Default)]
pub struct HomeState {
    /// Batches absorbed from proxies.
    pub batches: Vec<Batch>,
    /// Proxies already pulled from; each is pulled exactly once.
    pub visited_proxies: HashSet<NodeId>,
}

/// Batch relay state of a Collector.
#[derive(Debug, Default)]
pub struct RelayState {
    /// Batches pulled from the tier below, at most once.
    pub batches: Vec<Batch>,
}

/// Batch relay state of an Internet node.
#[derive(Debug, Default)]
pub struct InternetState {
    /// Batches pulled from the collector tier.
    pub batches: Vec<Batch>,
    /// Set when the Admin reports that appending has finished.
    pub appending_done: bool,
}

/// Protocol state owned by the Admin.
#[derive(Debug)]
pub struct AdminState {
    /// Batches pending a mining round.
    pub batches: Vec<Batch>,
    /// The current mining round: quorum, candidates, visited miners.
    pub mining_round: MiningRound,
    /// Miners that already voted on the selected block.
    pub verify_visited: HashSet<NodeId>,
    /// Votes collected for the selected block.
    pub votes: u32,
    /// Candidate block under verification; a new mining round cannot
    /// start while this is set.
    pub selected_block: Option<Block>,
    /// True once the first block was committed.
    pub started_appending: bool,
    /// True once the last pending batch was committed.
    pub appending_done: bool,
    /// Miners already paid out; each is settled exactly once.
    pub rewarded_miners: HashSet<NodeId>,
    /// Fees owed to miners, recorded at commit and drained by settlement.
    pub reward_ledger: Vec<RewardEntry>,
}

impl AdminState {
    fn new(miner_quorum: usize) -> Self {
        Self {
            batches: Vec::new(),
            mining_round: MiningRound::new(miner_quorum),
            verify_visited: HashSet::new(),
            votes: 0,
            selected_block: None,
            started_appending: false,
            appending_done: false,
            rewarded_miners: HashSet::new(),
            reward_ledger: Vec::new(),
        }
    }
}

/// Role-scoped mutable state, matching the node's role tag.
#[derive(Debug)]
pub enum RoleState {
    /// Generator wallet (credited by settlement, like miners).
    Generator(Wallet),
    /// Miner wallet.
    Miner(Wallet),
    /// OperatorProxy buffer and batches.
    OperatorProxy(ProxyState),
    /// Home collection state.
    Home(HomeState),
    /// Collector relay state.
    Collector(RelayState),
    /// Internet relay state.
    Internet(InternetState),
    /// Admin protocol state.
    Admin(Box<AdminState>),
}

/// A simulated participant: identity, immutable role tag, area, and the
/// state its role owns.
///
/// State is mutated only from within decision-engine calls in which this
/// node is a contact participant.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    role: Role,
    area: AreaId,
    state: RoleState,
}

impl Node {
    /// Build a node, deriving its role from the display-name prefix.
    ///
    /// An unrecognized prefix is a scenario setup error and aborts the
    /// run.
    pub fn new(
        id: NodeId,
        name: impl Into<String>,
        area: AreaId,
        config: &EngineConfig,
    ) -> EngineResult<Self> {
        let name = name.into();
        let role =
            Role::from_name(&name).ok_or_else(|| EngineError::UnknownRolePrefix(name.clone()))?;
        let state = match role {
            Role::Generator => RoleState::Generator(Wallet::default()),
            Role::Miner => RoleState::Miner(Wallet::default()),
            Role::OperatorProxy => RoleState::OperatorProxy(ProxyState::default()),
            Role::Home => RoleState::Home(HomeState::default()),
            Role::Collector => RoleState::Collector(RelayState::default()),
            Role::Internet => RoleState::Internet(InternetState::default()),
            Role::Admin => RoleState::Admin(Box::new(AdminState::new(config.miner_quorum))),
        };
        Ok(Self {
            id,
            name,
            role,
            area,
            state,
        })
    }

    /// Unique address.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display identity the role was derived from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Immutable role tag.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Deployment area.
    pub fn area(&self) -> AreaId {
        self.area
    }

    /// Push a transaction into this node's proxy buffer, if it is an
    /// OperatorProxy that has not yet grouped. Any other node ignores it.
    pub fn add_transaction_to_buffer(&mut self, tx: Transaction) {
        if let RoleState::OperatorProxy(proxy) = &mut self.state {
            proxy.add_transaction(tx);
        }
    }

    /// Wallet, for Miner and Generator nodes.
    pub fn wallet(&self) -> Option<&Wallet> {
        match &self.state {
            RoleState::Generator(w) | RoleState::Miner(w) => Some(w),
            _ => None,
        }
    }

    /// Mutable wallet access.
    pub fn wallet_mut(&mut self) -> Option<&mut Wallet> {
        match &mut self.state {
            RoleState::Generator(w) | RoleState::Miner(w) => Some(w),
            _ => None,
        }
    }

    /// OperatorProxy state.
    pub fn proxy(&self) -> Option<&ProxyState> {
        match &self.state {
            RoleState::OperatorProxy(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable OperatorProxy state.
    pub fn proxy_mut(&mut self) -> Option<&mut ProxyState> {
        match &mut self.state {
            RoleState::OperatorProxy(s) => Some(s),
            _ => None,
        }
    }

    /// Home state.
    pub fn home(&self) -> Option<&HomeState> {
        match &self.state {
            RoleState::Home(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable Home state.
    pub fn home_mut(&mut self) -> Option<&mut HomeState> {
        match &mut self.state {
            RoleState::Home(s) => Some(s),
            _ => None,
        }
    }

    /// Collector state.
    pub fn collector(&self) -> Option<&RelayState> {
        match &self.state {
            RoleState::Collector(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable Collector state.
    pub fn collector_mut(&mut self) -> Option<&mut RelayState> {
        match &mut self.state {
            RoleState::Collector(s) => Some(s),
            _ => None,
        }
    }

    /// Internet state.
    pub fn internet(&self) -> Option<&InternetState> {
        match &self.state {
            RoleState::Internet(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable Internet state.
    pub fn internet_mut(&mut self) -> Option<&mut InternetState> {
        match &mut self.state {
            RoleState::Internet(s) => Some(s),
            _ => None,
        }
    }

    /// Admin state.
    pub fn admin(&self) -> Option<&AdminState> {
        match &self.state {
            RoleState::Admin(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable Admin state.
    pub fn admin_mut(&mut self) -> Option<&mut AdminState> {
        match &mut self.state {
            RoleState::Admin(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
