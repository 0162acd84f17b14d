//! Shared domain types for the ModernTensor validator consensus core:
//! miners, tasks, results, round outcomes, and the phase/controller state
//! that owns them.

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod miner;
pub mod outcome;
pub mod payload;
pub mod phase;
pub mod seed;
pub mod task;

pub use clock::{system_clock, Clock, MockClock, SystemClock};
pub use config::{AggregationKind, SchedulerConfig};
pub use controller::{ControllerState, CONTROLLER_WINDOW};
pub use error::{CoreError, Result};
pub use miner::{MinerDirectory, MinerRef, MinerUid};
pub use outcome::{RoundOutcome, RoundSummary, TaskOutcome};
pub use payload::{Payload, PayloadCapabilities};
pub use phase::{MinerScoreHistory, PhaseState, PhaseSummary, SCORE_MAX, SCORE_MIN};
pub use seed::seed_for;
pub use task::{MinerResult, Task, TaskId};
