//! Registry and publisher collaborators: fetching the active miner set for
//! a subnet, and publishing the final per-miner score map once a phase
//! completes. Neither collaborator's own availability or correctness is
//! this crate's concern — only the wire shape and error surface are.

mod client;
mod error;
mod mock;

pub use client::{HttpRegistryClient, HttpScorePublisher, MinerStatus, RegistryClient, ScorePublisher};
pub use error::{RegistryError, Result};
pub use mock::{MockRegistryClient, MockScorePublisher};
