//! In-memory stand-ins for `RegistryClient`/`ScorePublisher`, used by the
//! scheduler and validator crates' own tests so they don't need a live
//! registry endpoint to exercise a phase end to end.

use crate::client::{RegistryClient, ScorePublisher};
use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use moderntensor_core::{MinerRef, MinerUid};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Returns a fixed miner set, or a configured error, on every call.
pub struct MockRegistryClient {
    miners: Vec<MinerRef>,
    fail_with: Option<String>,
}

impl MockRegistryClient {
    pub fn new(miners: Vec<MinerRef>) -> Self {
        Self { miners, fail_with: None }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { miners: Vec::new(), fail_with: Some(message.into()) }
    }
}

#[async_trait]
impl RegistryClient for MockRegistryClient {
    async fn fetch_active_miners(&self, _subnet_id: u64) -> Result<Vec<MinerRef>> {
        match &self.fail_with {
            Some(msg) => Err(RegistryError::Unreachable(msg.clone())),
            None => Ok(self.miners.clone()),
        }
    }
}

/// Records every published score map so tests can assert on what would have
/// been sent, without standing up an HTTP server.
#[derive(Default)]
pub struct MockScorePublisher {
    published: Mutex<Vec<(u64, HashMap<MinerUid, f64>)>>,
    fail: bool,
}

impl MockScorePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { published: Mutex::new(Vec::new()), fail: true }
    }

    pub fn published(&self) -> Vec<(u64, HashMap<MinerUid, f64>)> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl ScorePublisher for MockScorePublisher {
    async fn publish_scores(&self, slot_id: u64, scores: &HashMap<MinerUid, f64>) -> Result<()> {
        if self.fail {
            return Err(RegistryError::PublishFailed("mock publisher configured to fail".into()));
        }
        self.published.lock().push((slot_id, scores.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_registry_returns_configured_miners() {
        let miner = MinerRef::new(MinerUid::new(vec![1]), "http://m".to_string(), 1.0);
        let client = MockRegistryClient::new(vec![miner.clone()]);
        let fetched = client.fetch_active_miners(0).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].uid, miner.uid);
    }

    #[tokio::test]
    async fn mock_registry_failing_returns_error() {
        let client = MockRegistryClient::failing("down");
        assert!(client.fetch_active_miners(0).await.is_err());
    }

    #[tokio::test]
    async fn mock_publisher_records_published_scores() {
        let publisher = MockScorePublisher::new();
        let mut scores = HashMap::new();
        scores.insert(MinerUid::new(vec![1]), 0.5);
        publisher.publish_scores(7, &scores).await.unwrap();
        let recorded = publisher.published();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, 7);
    }
}
