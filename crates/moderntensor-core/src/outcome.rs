//! Per-round results: what happened to every task the Dispatcher sent out.

use crate::task::{MinerResult, Task, TaskId};
use std::collections::HashMap;
use std::time::Duration;

/// What became of one dispatched task. Dispatch errors and timeouts are
/// scored identically but kept distinct here so telemetry can tell them
/// apart.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Completed(MinerResult),
    Timeout,
    /// Synchronous send failure: connect refused, DNS failure, bad URL.
    DispatchError(String),
    /// A response arrived but was unusable (missing task id, bad payload).
    Malformed(String),
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }
}

/// Everything the Collector produced for one round: every Task that was
/// sent, paired with what happened to it. Consumed by the Scorer and the
/// Adaptive Controller; only a `RoundSummary` survives into `PhaseState`.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round_index: u64,
    pub tasks: Vec<Task>,
    pub outcomes: HashMap<TaskId, TaskOutcome>,
}

impl RoundOutcome {
    pub fn new(round_index: u64, tasks: Vec<Task>, outcomes: HashMap<TaskId, TaskOutcome>) -> Self {
        Self { round_index, tasks, outcomes }
    }

    /// |Tasks| = |Results| + |Timeouts| + |Errors| — no task ever disappears.
    pub fn is_accounted_for(&self) -> bool {
        self.tasks.len() == self.outcomes.len()
            && self.tasks.iter().all(|t| self.outcomes.contains_key(&t.task_id))
    }

    pub fn completed_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_completed()).count()
    }

    pub fn success_rate(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.tasks.len() as f64
    }

    /// Mean transport latency across completed results only. Zero when no
    /// task completed (an all-failure round still has a well-defined,
    /// zero, latency signal for the Controller).
    pub fn mean_latency(&self) -> Duration {
        let latencies: Vec<Duration> = self
            .outcomes
            .values()
            .filter_map(|o| match o {
                TaskOutcome::Completed(r) => Some(r.latency),
                _ => None,
            })
            .collect();
        if latencies.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = latencies.iter().sum();
        total / latencies.len() as u32
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary { success_rate: self.success_rate(), mean_latency: self.mean_latency() }
    }
}

/// The compact signal the Adaptive Controller actually needs, the only
/// part of a round that survives into `ControllerState`'s ring buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundSummary {
    pub success_rate: f64,
    pub mean_latency: Duration,
}
