//! `Clock` — abstracts `Instant::now()` so the timestamps `Task`,
//! `MinerResult`, and `PhaseState` stamp themselves with can be controlled
//! in tests without real sleeps, the same way `RegistryClient`/
//! `ScorePublisher` abstract the registry/publisher collaborators.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of `Instant`s for everything that stamps a timestamp: the
/// Dispatcher (`Task::created_at`), the Collector (`MinerResult::completed_at`
/// and latency), and the Phase Driver (phase/round start times).
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default clock, backed by the OS monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Convenience constructor for the default collaborator, matching the
/// `Arc<dyn Trait>` shape every other core collaborator (`RegistryClient`,
/// `ScorePublisher`, `MinerTransport`) is handed around as.
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Test clock whose `now()` is advanced explicitly, so a test can assert on
/// latency and deadline arithmetic without ever calling `tokio::time::sleep`.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<Instant>>,
}

impl MockClock {
    pub fn new(start: Instant) -> Self {
        Self { current: Arc::new(Mutex::new(start)) }
    }

    /// Move the clock forward. Never moves it backward.
    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock();
        *guard += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances_with_real_time() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn mock_clock_only_advances_when_told() {
        let start = Instant::now();
        let clock = MockClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now(), start + Duration::from_secs(5));
    }

    #[test]
    fn mock_clock_clones_share_the_same_underlying_time() {
        let clock = MockClock::new(Instant::now());
        let handle = clock.clone();
        handle.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), handle.now());
    }
}
