//! Domain layer for the contact engine.
//!
//! Node role model and bookkeeping on one side, round objects and pure
//! selection functions on the other. Protocol logic lives in the service.

mod message;
mod node;
mod rounds;

pub use message::*;
pub use node::*;
pub use rounds::*;
