//! Adaptive Controller update logic — reads the rolling window `core`'s
//! `ControllerState` maintains and writes the next round's batch size and
//! timeout. `ControllerState` itself is owned by `PhaseState`; this crate
//! only supplies the update rule.

use moderntensor_core::{ControllerState, SchedulerConfig};
use std::time::Duration;

pub struct AdaptiveController {
    batch_min: usize,
    batch_max: usize,
    adaptive: bool,
}

impl AdaptiveController {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self { batch_min: config.batch_size_min, batch_max: config.batch_size_max, adaptive: config.adaptive_batch }
    }

    /// Recompute `state.current_batch_size` and `state.current_timeout` from
    /// its rolling window. A no-op when `adaptive_batch` is disabled, which
    /// keeps batch size and timeout constant for the whole phase.
    pub fn update(&self, state: &mut ControllerState) {
        if !self.adaptive {
            return;
        }

        let success = state.rolling_success_rate();

        let mut next_batch = state.current_batch_size;
        if success > 0.80 {
            next_batch = (next_batch + 2).min(self.batch_max);
        } else if success < 0.50 {
            next_batch = next_batch.saturating_sub(2).max(self.batch_min);
        }
        state.current_batch_size = next_batch;

        let current_secs = state.current_timeout.as_secs_f64();
        let initial_secs = state.initial_timeout().as_secs_f64();
        let mean_latency_secs = state.rolling_mean_latency().as_secs_f64();

        let mut next_secs = current_secs;
        if mean_latency_secs > 0.6 * current_secs {
            next_secs = (current_secs * 1.2).min(initial_secs * 1.5);
        } else if mean_latency_secs < 0.2 * current_secs {
            next_secs = (current_secs * 0.9).max(initial_secs * 0.8);
        }
        if success < 0.5 {
            next_secs = (next_secs * 1.2).min(initial_secs * 1.5);
        }
        state.current_timeout = Duration::from_secs_f64(next_secs.max(0.0));
    }
}
