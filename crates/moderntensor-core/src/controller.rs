//! `ControllerState` — the rolling window the Adaptive Controller reads
//! and writes between rounds (`moderntensor-scheduler` owns the update
//! logic; this crate only owns the data).

use crate::outcome::RoundSummary;
use std::collections::VecDeque;
use std::time::Duration;

/// Fixed-size rolling buffer of recent round summaries.
pub const CONTROLLER_WINDOW: usize = 5;

#[derive(Debug, Clone)]
pub struct ControllerState {
    window: VecDeque<RoundSummary>,
    pub current_batch_size: usize,
    pub current_timeout: Duration,
    initial_timeout: Duration,
}

impl ControllerState {
    pub fn new(initial_batch_size: usize, initial_timeout: Duration) -> Self {
        Self {
            window: VecDeque::with_capacity(CONTROLLER_WINDOW),
            current_batch_size: initial_batch_size,
            current_timeout: initial_timeout,
            initial_timeout,
        }
    }

    pub fn initial_timeout(&self) -> Duration {
        self.initial_timeout
    }

    /// Push a new round summary, dropping the oldest once the window is full.
    pub fn observe(&mut self, summary: RoundSummary) {
        if self.window.len() == CONTROLLER_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(summary);
    }

    pub fn rolling_success_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().map(|s| s.success_rate).sum::<f64>() / self.window.len() as f64
    }

    pub fn rolling_mean_latency(&self) -> Duration {
        if self.window.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.window.iter().map(|s| s.mean_latency).sum();
        total / self.window.len() as u32
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}
