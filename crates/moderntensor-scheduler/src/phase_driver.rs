//! Phase Driver — the outer loop wrapping Selector, Dispatcher, Collector,
//! Scorer, and Adaptive Controller under a phase deadline.

use crate::cancellation::PhaseCancellation;
use crate::collector::Collector;
use crate::controller::AdaptiveController;
use crate::dispatcher::Dispatcher;
use crate::selector::Selector;
use crate::transport::MinerTransport;
use moderntensor_core::{
    seed_for, system_clock, Clock, MinerDirectory, MinerUid, PhaseState, PhaseSummary, SchedulerConfig, TaskId,
    TaskOutcome,
};
use moderntensor_registry::{RegistryClient, ScorePublisher};
use moderntensor_scoring::{aggregate, Scorer};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-miner score history is soft-capped well above any realistic
/// rounds-per-phase count.
const HISTORY_SOFT_CAP: usize = 256;

pub struct PhaseDriver {
    config: SchedulerConfig,
    subnet_id: u64,
    registry: Arc<dyn RegistryClient>,
    publisher: Arc<dyn ScorePublisher>,
    transport: Arc<dyn MinerTransport>,
    clock: Arc<dyn Clock>,
    cancellation: PhaseCancellation,
}

impl PhaseDriver {
    pub fn new(
        config: SchedulerConfig,
        subnet_id: u64,
        registry: Arc<dyn RegistryClient>,
        publisher: Arc<dyn ScorePublisher>,
        transport: Arc<dyn MinerTransport>,
    ) -> Self {
        Self {
            config,
            subnet_id,
            registry,
            publisher,
            transport,
            clock: system_clock(),
            cancellation: PhaseCancellation::new(),
        }
    }

    /// Inject a non-default `Clock` (e.g. `MockClock` in tests). Builder
    /// style so the common construction path above is unaffected.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// A clonable handle a caller can use to interrupt the phase currently
    /// (or next) running on this driver: `.cancel()` wakes any in-flight
    /// `Collector::collect` immediately and stops the outer loop from
    /// starting another round.
    pub fn cancellation(&self) -> PhaseCancellation {
        self.cancellation.clone()
    }

    /// Run one phase to completion and return its final per-miner scores.
    /// Never panics and never lets an error escape past this call.
    pub async fn run_phase(&self, slot_id: u64, deadline: Instant) -> HashMap<MinerUid, f64> {
        let (scores, summary) = self.run_phase_with_summary(slot_id, deadline).await;
        info!(
            slot_id,
            rounds = summary.rounds_executed,
            tasks = summary.tasks_sent,
            results = summary.results_collected,
            miners_scored = scores.len(),
            "phase complete"
        );
        scores
    }

    /// Same as `run_phase`, but also returns the compact telemetry rollup —
    /// useful to callers that want to report it (e.g. the `once` CLI
    /// subcommand) without re-deriving it from logs.
    pub async fn run_phase_with_summary(
        &self,
        slot_id: u64,
        deadline: Instant,
    ) -> (HashMap<MinerUid, f64>, PhaseSummary) {
        let start = self.clock.now();
        let miners = match self.registry.fetch_active_miners(self.subnet_id).await {
            Ok(miners) => miners,
            Err(err) => {
                warn!(slot_id, error = %err, "registry unreachable, phase returns no scores");
                let duration = self.clock.now().saturating_duration_since(start);
                return (HashMap::new(), PhaseSummary { slot_id, duration, ..Default::default() });
            }
        };

        if miners.is_empty() {
            debug!(slot_id, "registry returned no active miners");
            let duration = self.clock.now().saturating_duration_since(start);
            return (HashMap::new(), PhaseSummary { slot_id, duration, ..Default::default() });
        }

        let directory = MinerDirectory::from_miners(miners);
        let mut phase = PhaseState::new(slot_id, self.clock.now(), deadline, directory, &self.config, HISTORY_SOFT_CAP);
        let controller = AdaptiveController::new(&self.config);
        let dispatcher = Dispatcher::new(self.transport.clone(), self.config.max_concurrent, self.clock.clone());
        let guard = self.config.phase_guard();
        let min_break = self.config.min_break();

        let mut round_index: u64 = 0;
        let mut next_task_id: TaskId = 0;
        let mut timeouts_total: u64 = 0;
        let mut errors_total: u64 = 0;
        // Miners whose dispatch errored while `retry_failed = false`; excluded
        // from selection for the remainder of the phase.
        let mut excluded: HashSet<MinerUid> = HashSet::new();

        loop {
            if self.cancellation.is_cancelled() {
                debug!(slot_id, round_index, "cancellation observed at round boundary");
                break;
            }

            let now = self.clock.now();
            let remaining = phase.remaining(now);
            let min_round_budget = phase.controller.current_timeout + min_break;
            if remaining < guard.max(min_round_budget) {
                break;
            }

            let target_k = phase.controller.current_batch_size;
            let batch = Selector::select(&mut phase.directory, target_k, slot_id, round_index, &excluded);

            let handle = dispatcher.dispatch(&batch, &mut next_task_id);
            let outcome =
                Collector::collect(handle, phase.controller.current_timeout, round_index, &self.clock, &self.cancellation)
                    .await;

            phase.rounds_started += 1;
            phase.results_collected += outcome.completed_count() as u64;

            let mut scorer = Scorer::new(self.config.deterministic_scoring, seed_for(slot_id, round_index));
            for task in &outcome.tasks {
                let task_outcome = outcome
                    .outcomes
                    .get(&task.task_id)
                    .expect("every dispatched task is accounted for by the collector");
                let score = scorer.score(task_outcome);
                phase.record_score(&task.target, score);
                match task_outcome {
                    TaskOutcome::Timeout => timeouts_total += 1,
                    TaskOutcome::DispatchError(_) => {
                        errors_total += 1;
                        if !self.config.retry_failed {
                            excluded.insert(task.target.clone());
                        }
                    }
                    TaskOutcome::Malformed(_) => errors_total += 1,
                    TaskOutcome::Completed(_) => {}
                }
            }

            // A round interrupted mid-Collecting never counts as a genuine
            // success-rate measurement for the controller, even though the
            // Results that had already landed are scored normally above.
            let cancelled_mid_round = self.cancellation.is_cancelled();
            let mut round_summary = outcome.summary();
            if cancelled_mid_round {
                round_summary.success_rate = 0.0;
            }
            phase.controller.observe(round_summary);
            controller.update(&mut phase.controller);

            debug!(
                slot_id,
                round_index,
                batch_size = batch.len(),
                success_rate = round_summary.success_rate,
                "round complete"
            );

            if cancelled_mid_round {
                break;
            }

            round_index += 1;
            tokio::time::sleep(min_break).await;
        }

        let mut final_scores = HashMap::with_capacity(phase.histories.len());
        for (uid, history) in &phase.histories {
            if let Some(score) = aggregate(history.as_slice(), self.config.score_aggregation) {
                final_scores.insert(uid.clone(), score);
            }
        }

        if let Err(err) = self.publisher.publish_scores(slot_id, &final_scores).await {
            warn!(slot_id, error = %err, "score publish failed, scores remain available to the caller");
        }

        let summary = PhaseSummary {
            slot_id,
            rounds_executed: phase.rounds_started,
            tasks_sent: next_task_id,
            results_collected: phase.results_collected,
            timeouts: timeouts_total,
            errors: errors_total,
            final_batch_size: phase.controller.current_batch_size,
            final_timeout: phase.controller.current_timeout,
            duration: self.clock.now().saturating_duration_since(phase.start),
        };

        (final_scores, summary)
    }
}
