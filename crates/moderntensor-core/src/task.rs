//! Task and miner-result types.

use crate::miner::MinerUid;
use crate::payload::Payload;
use std::time::{Duration, Instant};

/// Identifies a task within one phase. Phase-scoped, not globally unique.
pub type TaskId = u64;

/// A unit of work, created by the Dispatcher just before sending.
#[derive(Debug, Clone)]
pub struct Task {
    pub task_id: TaskId,
    pub payload: Payload,
    pub created_at: Instant,
    pub target: MinerUid,
}

/// A miner's reply to one task, created by the Collector on a successful
/// response. Immutable thereafter.
#[derive(Debug, Clone)]
pub struct MinerResult {
    pub task_id: TaskId,
    pub completed_at: Instant,
    pub payload: Payload,
    pub latency: Duration,
}
