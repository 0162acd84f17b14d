//! HTTP-backed `MinerTransport` — sends one task id to a miner's endpoint
//! and parses its JSON reply. The wire shape mirrors the registry crate's
//! reqwest conventions; the actual subnet task body is out of bounds here,
//! so only the task id round-trips.

use async_trait::async_trait;
use moderntensor_core::{MinerRef, Payload, Task};
use moderntensor_scheduler::{MinerTransport, TransportError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct TaskRequest {
    task_id: u64,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    task_id: u64,
    result_url: Option<String>,
    model_version: Option<String>,
}

pub struct HttpMinerTransport {
    client: reqwest::Client,
}

impl HttpMinerTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().expect("failed to build miner HTTP client");
        Self { client }
    }
}

#[async_trait]
impl MinerTransport for HttpMinerTransport {
    async fn send(&self, miner: &MinerRef, task: &Task) -> Result<Payload, TransportError> {
        let response = self
            .client
            .post(&miner.endpoint)
            .json(&TaskRequest { task_id: task.task_id })
            .send()
            .await
            .map_err(|e| TransportError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Dispatch(format!("HTTP {}", response.status())));
        }

        let body: TaskResponse = response.json().await.map_err(|e| TransportError::Malformed(e.to_string()))?;

        if body.task_id != task.task_id {
            return Err(TransportError::Malformed(format!(
                "response task id {} does not match request {}",
                body.task_id, task.task_id
            )));
        }

        let mut payload = Payload::structured();
        if let Some(url) = body.result_url {
            payload = payload.with_result_url(url);
        }
        if let Some(version) = body.model_version {
            payload = payload.with_model_version(version);
        }
        Ok(payload)
    }
}
