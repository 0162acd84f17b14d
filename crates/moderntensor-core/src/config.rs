//! Scheduler configuration surface: batch sizing, timeouts, and the
//! per-phase scoring/aggregation knobs a validator operator tunes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How per-miner `MinerScoreHistory` is reduced into one `FinalScore`
/// at phase end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    Average,
    Median,
    Max,
}

impl Default for AggregationKind {
    fn default() -> Self {
        AggregationKind::Average
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub batch_size_initial: usize,
    pub batch_size_min: usize,
    pub batch_size_max: usize,
    pub batch_timeout_initial_secs: u64,
    pub min_break_secs: u64,
    pub max_concurrent: usize,
    pub score_aggregation: AggregationKind,
    pub retry_failed: bool,
    pub adaptive_batch: bool,
    pub deterministic_scoring: bool,
    /// Defaults to `batch_timeout_initial_secs` when left unset by the
    /// caller (see `Default` impl below); `None` here only arises from a
    /// partially-specified config the caller built by hand.
    pub phase_guard_secs: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size_initial: 5,
            batch_size_min: 2,
            batch_size_max: 10,
            batch_timeout_initial_secs: 30,
            min_break_secs: 2,
            max_concurrent: 10,
            score_aggregation: AggregationKind::Average,
            retry_failed: true,
            adaptive_batch: true,
            deterministic_scoring: false,
            phase_guard_secs: None,
        }
    }
}

impl SchedulerConfig {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_initial_secs)
    }

    pub fn min_break(&self) -> Duration {
        Duration::from_secs(self.min_break_secs)
    }

    pub fn phase_guard(&self) -> Duration {
        Duration::from_secs(self.phase_guard_secs.unwrap_or(self.batch_timeout_initial_secs))
    }

    /// Validates cross-field constraints explicitly rather than clamping
    /// silently, so a misconfigured batch range fails fast at load time.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size_min == 0 {
            return Err("batch_size_min must be greater than 0".into());
        }
        if self.batch_size_min > self.batch_size_max {
            return Err(format!(
                "batch_size_min ({}) must not exceed batch_size_max ({})",
                self.batch_size_min, self.batch_size_max
            ));
        }
        if !(self.batch_size_min..=self.batch_size_max).contains(&self.batch_size_initial) {
            return Err(format!(
                "batch_size_initial ({}) must lie within [{}, {}]",
                self.batch_size_initial, self.batch_size_min, self.batch_size_max
            ));
        }
        if self.batch_timeout_initial_secs == 0 {
            return Err("batch_timeout_initial_secs must be greater than 0".into());
        }
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be greater than 0".into());
        }
        Ok(())
    }
}
