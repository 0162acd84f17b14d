//! `PhaseState` — the single owner of everything that lives for one phase.

use crate::config::SchedulerConfig;
use crate::controller::ControllerState;
use crate::miner::{MinerDirectory, MinerUid};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Bound on every emitted score.
pub const SCORE_MIN: f64 = 0.05;
pub const SCORE_MAX: f64 = 0.95;

/// Per-miner sequence of scores collected during the current phase.
///
/// The soft cap keeps memory bounded for a long-running phase against a
/// miner selected every round; oldest entries are dropped, which only
/// affects the `average`/`median` aggregators' tail sensitivity, not the
/// invariant that every entry lies in `[SCORE_MIN, SCORE_MAX]`.
#[derive(Debug, Clone, Default)]
pub struct MinerScoreHistory {
    scores: Vec<f64>,
    soft_cap: usize,
}

impl MinerScoreHistory {
    pub fn new(soft_cap: usize) -> Self {
        Self { scores: Vec::new(), soft_cap: soft_cap.max(1) }
    }

    pub fn push(&mut self, score: f64) {
        debug_assert!((SCORE_MIN..=SCORE_MAX).contains(&score), "score {score} out of bounds");
        if self.scores.len() >= self.soft_cap {
            self.scores.remove(0);
        }
        self.scores.push(score);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.scores
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Current slot id, phase window, cumulative counters, and controller
/// snapshot — exclusively owns the `MinerDirectory`, every
/// `MinerScoreHistory`, and the `ControllerState`.
pub struct PhaseState {
    pub slot_id: u64,
    pub start: Instant,
    pub deadline: Instant,
    pub directory: MinerDirectory,
    pub histories: HashMap<MinerUid, MinerScoreHistory>,
    pub controller: ControllerState,
    pub rounds_started: u64,
    pub results_collected: u64,
    history_soft_cap: usize,
}

impl PhaseState {
    pub fn new(
        slot_id: u64,
        start: Instant,
        deadline: Instant,
        directory: MinerDirectory,
        config: &SchedulerConfig,
        history_soft_cap: usize,
    ) -> Self {
        Self {
            slot_id,
            start,
            deadline,
            directory,
            histories: HashMap::new(),
            controller: ControllerState::new(config.batch_size_initial, config.batch_timeout()),
            rounds_started: 0,
            results_collected: 0,
            history_soft_cap,
        }
    }

    /// Append one score to a miner's history, creating it on first use.
    pub fn record_score(&mut self, uid: &MinerUid, score: f64) {
        self.histories
            .entry(uid.clone())
            .or_insert_with(|| MinerScoreHistory::new(self.history_soft_cap))
            .push(score);
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }
}

/// Compact telemetry rollup returned alongside the final score map.
#[derive(Debug, Clone, Default)]
pub struct PhaseSummary {
    pub slot_id: u64,
    pub rounds_executed: u64,
    pub tasks_sent: u64,
    pub results_collected: u64,
    pub timeouts: u64,
    pub errors: u64,
    pub final_batch_size: usize,
    pub final_timeout: Duration,
    pub duration: Duration,
}
