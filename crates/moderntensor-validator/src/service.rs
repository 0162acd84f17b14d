//! Wires the registry, transport, and scheduler collaborators into a
//! runnable validator service.

use crate::config::ValidatorConfig;
use crate::transport::HttpMinerTransport;
use moderntensor_core::{MinerUid, PhaseSummary};
use moderntensor_registry::{HttpRegistryClient, HttpScorePublisher};
use moderntensor_scheduler::PhaseDriver;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::info;

/// Slot ids are the wall-clock epoch second divided into `phase_len`-sized
/// buckets, so independent validators watching the same subnet land on the
/// same slot id for the same phase window without coordinating directly.
fn wall_clock_slot_id(phase_len: Duration) -> u64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    now.as_secs() / phase_len.as_secs().max(1)
}

pub struct ValidatorService {
    config: ValidatorConfig,
    driver: PhaseDriver,
}

impl ValidatorService {
    pub fn new(config: ValidatorConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let request_timeout = Duration::from_secs(config.network.request_timeout_secs);
        let registry =
            Arc::new(HttpRegistryClient::with_timeout(config.network.registry_endpoint.as_str(), request_timeout));
        let publisher = Arc::new(HttpScorePublisher::new(config.network.publish_endpoint.as_str()));
        let transport = Arc::new(HttpMinerTransport::new(request_timeout));

        let driver =
            PhaseDriver::new(config.scheduler.clone(), config.validator.subnet_id, registry, publisher, transport);

        Ok(Self { config, driver })
    }

    /// Run one phase and return its final scores. Used by both the
    /// continuous service loop and the `once` diagnostic subcommand.
    pub async fn run_phase(&self, slot_id: u64, phase_len: Duration) -> (HashMap<MinerUid, f64>, PhaseSummary) {
        let deadline = Instant::now() + phase_len;
        self.driver.run_phase_with_summary(slot_id, deadline).await
    }

    /// Run phases back to back indefinitely, one slot id per phase,
    /// until the process is terminated.
    pub async fn run_forever(&self, phase_len: Duration) -> anyhow::Result<()> {
        info!(subnet_id = self.config.validator.subnet_id, "validator service starting");
        let mut last_slot_id = None;
        loop {
            let slot_id = wall_clock_slot_id(phase_len);
            if last_slot_id == Some(slot_id) {
                // Phase finished early relative to its wall-clock window
                // (e.g. every miner dropped out); wait out the rest of the
                // window rather than immediately re-running the same slot.
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }
            last_slot_id = Some(slot_id);

            let (scores, summary) = self.run_phase(slot_id, phase_len).await;
            info!(
                slot_id,
                rounds = summary.rounds_executed,
                miners_scored = scores.len(),
                duration_ms = summary.duration.as_millis() as u64,
                "phase finished"
            );
        }
    }
}
