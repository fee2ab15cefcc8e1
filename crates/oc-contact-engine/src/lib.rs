//! # oc-contact-engine
//!
//! The protocol core of Opportunistic-Chain: a distributed-consensus state
//! machine whose only synchronization primitive is "two nodes are
//! currently in radio contact".
//!
//! ## Architecture
//!
//! The external contact source invokes three entry points on the
//! [`DecisionEngine`] for every directed contact event:
//!
//! - `on_connection_up`: one-shot transaction grouping inside the
//!   configured grouping window.
//! - `on_connection_down`: reserved, currently a no-op.
//! - `on_exchange`: the main dispatch, sequencing four sub-protocols keyed
//!   off the two contacting roles — hierarchical batch forwarding
//!   (OperatorProxy → Home → Collector → Internet → Admin), the mining
//!   round, the threshold verification round, and reward settlement.
//!
//! Contact order is non-deterministic and contacts repeat arbitrarily, so
//! every multi-step protocol is idempotent under duplicate invocation via
//! one-shot visited-sets and done-flags. That idempotency is the core
//! correctness property of this crate.
//!
//! The engine also answers the message acceptance-policy queries the
//! excluded transport layer asks for every in-flight message.
//!
//! Termination is a [`RunState`] value returned from `on_exchange`; the
//! driving loop decides shutdown.

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;

// Re-export main types
pub use clock::{ManualClock, MiningClock, SystemClock};
pub use config::EngineConfig;
pub use domain::{
    best_batch_index, select_best, AdminState, ContactMessage, HomeState, InternetState,
    MiningRound, Node, ProxyState, RelayState, Role, RoleState,
};
pub use error::{ConfigError, EngineError, EngineResult};
pub use service::{DecisionEngine, RunState};
