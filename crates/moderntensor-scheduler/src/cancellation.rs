//! `PhaseCancellation` — an externally triggerable signal a caller can use
//! to interrupt a running phase at the next round boundary, or mid-flight
//! during Collecting.
//!
//! `PhaseDriver` owns one and hands out clones via `PhaseDriver::cancellation`;
//! calling `.cancel()` on any clone wakes every `collect()` currently racing
//! it and causes the outer loop to stop before starting another round,
//! matching spec.md §5's cancellation contract: the interrupted round is
//! recorded with whatever Results had already arrived, and the phase still
//! returns whatever FinalScores the Aggregator can build from completed
//! rounds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Clone, Default)]
pub struct PhaseCancellation {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl PhaseCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent; wakes every current and future waiter.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves immediately if already cancelled, otherwise waits for `cancel`.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_a_pending_waiter() {
        let token = PhaseCancellation::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        tokio::time::timeout(Duration::from_millis(200), handle).await.unwrap().unwrap();
    }

    #[test]
    fn starts_not_cancelled() {
        assert!(!PhaseCancellation::new().is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_once_already_cancelled() {
        let token = PhaseCancellation::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await.unwrap();
    }
}
