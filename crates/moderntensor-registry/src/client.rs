//! Registry/publisher collaborator traits plus an HTTP-backed
//! implementation. Both the on-chain registry read surface and the
//! Publisher are out of scope for this crate's own logic — they are
//! external collaborators the core only calls through these traits.

use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use moderntensor_core::{MinerRef, MinerUid};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinerStatus {
    Active,
    Inactive,
    Jailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawMinerEntry {
    uid: String, // hex-encoded, 0x-prefixed
    endpoint: String,
    weight: f64,
    status: MinerStatus,
}

/// Read side: snapshot the active miner set for a subnet.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn fetch_active_miners(&self, subnet_id: u64) -> Result<Vec<MinerRef>>;
}

/// Write side: publish the final per-miner score map once per phase.
#[async_trait]
pub trait ScorePublisher: Send + Sync {
    async fn publish_scores(&self, slot_id: u64, scores: &HashMap<MinerUid, f64>) -> Result<()>;
}

/// Default HTTP-backed registry client: JSON over HTTP, explicit timeout,
/// structured error on transport failure.
pub struct HttpRegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRegistryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build registry HTTP client");
        Self { client, base_url: base_url.into() }
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn fetch_active_miners(&self, subnet_id: u64) -> Result<Vec<MinerRef>> {
        let url = format!("{}/subnets/{subnet_id}/miners", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RegistryError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::Unreachable(format!("HTTP {}", response.status())));
        }

        let entries: Vec<RawMinerEntry> = response
            .json()
            .await
            .map_err(|e| RegistryError::MalformedResponse(e.to_string()))?;

        entries
            .into_iter()
            .filter(|e| e.status == MinerStatus::Active)
            .map(|e| {
                let bytes = hex::decode(e.uid.trim_start_matches("0x"))
                    .map_err(|err| RegistryError::MalformedResponse(err.to_string()))?;
                Ok(MinerRef::new(MinerUid::new(bytes), e.endpoint, e.weight))
            })
            .collect()
    }
}

pub struct HttpScorePublisher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScorePublisher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[async_trait]
impl ScorePublisher for HttpScorePublisher {
    async fn publish_scores(&self, slot_id: u64, scores: &HashMap<MinerUid, f64>) -> Result<()> {
        let body: HashMap<String, f64> =
            scores.iter().map(|(uid, score)| (uid.to_string(), *score)).collect();

        let url = format!("{}/slots/{slot_id}/scores", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "slot_id": slot_id, "scores": body }))
            .send()
            .await
            .map_err(|e| RegistryError::PublishFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::PublishFailed(format!("HTTP {}", response.status())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_registry_client_builds_with_default_timeout() {
        let _client = HttpRegistryClient::new("https://registry.example");
    }
}
