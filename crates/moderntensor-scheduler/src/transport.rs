//! The miner wire protocol collaborator: how a `Task` is actually sent to
//! a miner's endpoint and how its reply is parsed. The wire format itself
//! is subnet-defined and out of bounds of this crate; only the contract —
//! send a task, get a payload or a typed failure back — lives here.

use async_trait::async_trait;
use moderntensor_core::{MinerRef, Payload, Task};

/// Distinguishes a failure to reach the miner at all from a reply that
/// arrived but couldn't be scored. Both are scored identically but logged
/// distinctly.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// Connect refused, DNS failure, malformed endpoint — synchronous or
    /// near-synchronous send failure.
    Dispatch(String),
    /// A response arrived but was missing a task id or had an unparseable
    /// payload.
    Malformed(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Dispatch(msg) => write!(f, "dispatch error: {msg}"),
            TransportError::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

/// Sends one task to one miner and awaits its reply. Implementors own
/// whatever protocol the subnet actually speaks (HTTP, gossipsub, a raw
/// socket); the scheduler only ever calls `send`.
#[async_trait]
pub trait MinerTransport: Send + Sync {
    async fn send(&self, miner: &MinerRef, task: &Task) -> Result<Payload, TransportError>;
}
