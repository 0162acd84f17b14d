//! End-to-end scenarios for a full `PhaseDriver::run_phase` run, driven
//! against a scripted miner transport so timing and failure modes are
//! reproducible without a live network. Adaptive batch-size expansion is
//! covered by the narrower unit tests in `controller.rs`; mid-round
//! external cancellation (Scenario E) gets a full phase run below, since
//! that behavior depends on `PhaseDriver`'s own loop control, not just the
//! Collector's drain.

use async_trait::async_trait;
use moderntensor_core::{MinerRef, MinerUid, Payload, SchedulerConfig, Task};
use moderntensor_registry::{MockRegistryClient, MockScorePublisher};
use moderntensor_scheduler::{MinerTransport, PhaseDriver, TransportError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
enum Behavior {
    Ok { delay: Duration, url: bool, version: bool },
    Timeout,
    Malformed,
}

struct ScriptedTransport {
    behaviors: HashMap<MinerUid, Behavior>,
}

#[async_trait]
impl MinerTransport for ScriptedTransport {
    async fn send(&self, miner: &MinerRef, _task: &Task) -> Result<Payload, TransportError> {
        match self.behaviors.get(&miner.uid) {
            Some(Behavior::Ok { delay, url, version }) => {
                tokio::time::sleep(*delay).await;
                let mut payload = Payload::structured();
                if *url {
                    payload = payload.with_result_url("https://result.example/out");
                }
                if *version {
                    payload = payload.with_model_version("v1");
                }
                Ok(payload)
            }
            Some(Behavior::Timeout) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Payload::Raw(Vec::new()))
            }
            Some(Behavior::Malformed) => Err(TransportError::Malformed("missing task id".into())),
            None => Err(TransportError::Dispatch("miner not scripted".into())),
        }
    }
}

fn miner(id: &str) -> MinerRef {
    MinerRef::new(MinerUid::from(id), format!("https://{id}.example/infer"), 1.0)
}

fn fast_config(batch_initial: usize, batch_min: usize, batch_max: usize) -> SchedulerConfig {
    SchedulerConfig {
        batch_size_initial: batch_initial,
        batch_size_min: batch_min,
        batch_size_max: batch_max,
        batch_timeout_initial_secs: 1,
        min_break_secs: 1,
        max_concurrent: 20,
        deterministic_scoring: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn happy_path_small_pool_scores_high() {
    let miners = vec![miner("m1"), miner("m2"), miner("m3")];
    let behaviors = miners
        .iter()
        .map(|m| (m.uid.clone(), Behavior::Ok { delay: Duration::from_millis(50), url: true, version: true }))
        .collect();
    let transport = Arc::new(ScriptedTransport { behaviors });
    let registry = Arc::new(MockRegistryClient::new(miners.clone()));
    let publisher = Arc::new(MockScorePublisher::new());

    let driver = PhaseDriver::new(fast_config(3, 2, 10), 0, registry, publisher.clone(), transport);
    let deadline = Instant::now() + Duration::from_secs(6);
    let scores = driver.run_phase(7, deadline).await;

    assert_eq!(scores.len(), 3);
    for score in scores.values() {
        assert!((0.80..=0.95).contains(score), "score {score} outside expected high band");
    }
    assert_eq!(publisher.published().len(), 1);
}

#[tokio::test]
async fn partial_failure_shrinks_batch_and_penalizes_bad_miners() {
    let ok = |id: &str| (MinerUid::from(id), Behavior::Ok { delay: Duration::from_millis(50), url: true, version: true });
    let behaviors = HashMap::from([
        ok("m1"),
        ok("m2"),
        (MinerUid::from("m3"), Behavior::Timeout),
        (MinerUid::from("m4"), Behavior::Timeout),
        (MinerUid::from("m5"), Behavior::Malformed),
    ]);
    let miners = vec![miner("m1"), miner("m2"), miner("m3"), miner("m4"), miner("m5")];
    let transport = Arc::new(ScriptedTransport { behaviors });
    let registry = Arc::new(MockRegistryClient::new(miners));
    let publisher = Arc::new(MockScorePublisher::new());

    let driver = PhaseDriver::new(fast_config(5, 2, 5), 0, registry, publisher, transport);
    let deadline = Instant::now() + Duration::from_secs(16);
    let (scores, summary) = driver.run_phase_with_summary(1, deadline).await;

    assert_eq!(scores[&MinerUid::from("m3")], 0.05);
    assert_eq!(scores[&MinerUid::from("m4")], 0.05);
    assert_eq!(scores[&MinerUid::from("m5")], 0.05);
    assert!(scores[&MinerUid::from("m1")] >= 0.50);
    assert!(scores[&MinerUid::from("m2")] >= 0.50);
    // Sustained sub-50% round success should have walked batch size down
    // from its initial 5 toward the configured minimum of 2.
    assert!(summary.final_batch_size < 5);
    assert!(!scores.is_empty());
}

#[tokio::test]
async fn starvation_prevention_covers_every_miner() {
    let miners: Vec<MinerRef> = (0..20).map(|i| miner(&format!("m{i}"))).collect();
    let behaviors = miners
        .iter()
        .map(|m| (m.uid.clone(), Behavior::Ok { delay: Duration::from_millis(20), url: true, version: false }))
        .collect();
    let transport = Arc::new(ScriptedTransport { behaviors });
    let registry = Arc::new(MockRegistryClient::new(miners.clone()));
    let publisher = Arc::new(MockScorePublisher::new());

    // adaptive_batch disabled: batch size stays pinned at 5 the whole phase.
    let config = SchedulerConfig { adaptive_batch: false, ..fast_config(5, 5, 5) };
    let driver = PhaseDriver::new(config, 0, registry, publisher, transport);
    let deadline = Instant::now() + Duration::from_secs(12);
    let scores = driver.run_phase(2, deadline).await;

    assert_eq!(scores.len(), 20, "every miner must appear exactly once in the final map");
}

#[tokio::test]
async fn retry_failed_false_excludes_dispatch_errors_from_later_rounds() {
    // m1 always fails to dispatch; m2 always succeeds. With retry_failed
    // disabled, m1 should only ever be selected once (its first and only
    // appearance), never accumulating more than one score entry.
    let behaviors = HashMap::from([
        (MinerUid::from("m1"), Behavior::Timeout), // never actually reached: send() errors first
        (MinerUid::from("m2"), Behavior::Ok { delay: Duration::from_millis(10), url: true, version: true }),
    ]);
    struct AlwaysFailM1 {
        inner: ScriptedTransport,
    }
    #[async_trait]
    impl MinerTransport for AlwaysFailM1 {
        async fn send(&self, miner: &MinerRef, task: &Task) -> Result<Payload, TransportError> {
            if miner.uid == MinerUid::from("m1") {
                return Err(TransportError::Dispatch("connect refused".into()));
            }
            self.inner.send(miner, task).await
        }
    }

    let miners = vec![miner("m1"), miner("m2")];
    let transport = Arc::new(AlwaysFailM1 { inner: ScriptedTransport { behaviors } });
    let registry = Arc::new(MockRegistryClient::new(miners));
    let publisher = Arc::new(MockScorePublisher::new());

    let config = SchedulerConfig { retry_failed: false, adaptive_batch: false, ..fast_config(2, 2, 2) };
    let driver = PhaseDriver::new(config, 0, registry, publisher, transport);
    let deadline = Instant::now() + Duration::from_secs(6);
    let scores = driver.run_phase(5, deadline).await;

    assert_eq!(scores[&MinerUid::from("m1")], 0.05);
    assert!(scores[&MinerUid::from("m2")] >= 0.50);
}

#[tokio::test]
async fn registry_failure_returns_empty_map() {
    let registry = Arc::new(MockRegistryClient::failing("registry down"));
    let publisher = Arc::new(MockScorePublisher::new());
    let transport = Arc::new(ScriptedTransport { behaviors: HashMap::new() });

    let driver = PhaseDriver::new(fast_config(5, 2, 10), 0, registry, publisher.clone(), transport);
    let deadline = Instant::now() + Duration::from_secs(5);
    let scores = driver.run_phase(3, deadline).await;

    assert!(scores.is_empty());
    assert!(publisher.published().is_empty(), "publisher must never be called after a registry failure");
}

#[tokio::test]
async fn external_cancellation_mid_round_keeps_completed_scores_and_stops_the_phase() {
    // 3 miners answer almost instantly, 2 never answer within the phase.
    // Cancellation fires mid-Collecting, well before the batch timeout and
    // before a second round could start. The phase must still return scores
    // for every miner dispatched this round (low scores for the 2 that
    // never completed) and must not run a second round afterward.
    let behaviors = HashMap::from([
        (MinerUid::from("m1"), Behavior::Ok { delay: Duration::from_millis(5), url: true, version: true }),
        (MinerUid::from("m2"), Behavior::Ok { delay: Duration::from_millis(5), url: true, version: true }),
        (MinerUid::from("m3"), Behavior::Ok { delay: Duration::from_millis(5), url: true, version: true }),
        (MinerUid::from("m4"), Behavior::Timeout),
        (MinerUid::from("m5"), Behavior::Timeout),
    ]);
    let miners = vec![miner("m1"), miner("m2"), miner("m3"), miner("m4"), miner("m5")];
    let transport = Arc::new(ScriptedTransport { behaviors });
    let registry = Arc::new(MockRegistryClient::new(miners));
    let publisher = Arc::new(MockScorePublisher::new());

    let config = SchedulerConfig { adaptive_batch: false, ..fast_config(5, 5, 5) };
    let driver = PhaseDriver::new(config, 0, registry, publisher.clone(), transport);
    let cancellation = driver.cancellation();

    let canceller = cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let deadline = Instant::now() + Duration::from_secs(30);
    let (scores, summary) = driver.run_phase_with_summary(9, deadline).await;

    assert_eq!(scores.len(), 5, "every dispatched miner gets a score even when the round was cut short");
    assert!(scores[&MinerUid::from("m1")] >= 0.50);
    assert!(scores[&MinerUid::from("m2")] >= 0.50);
    assert!(scores[&MinerUid::from("m3")] >= 0.50);
    assert_eq!(scores[&MinerUid::from("m4")], 0.05);
    assert_eq!(scores[&MinerUid::from("m5")], 0.05);
    assert_eq!(summary.rounds_executed, 1, "cancellation must stop the phase after the interrupted round");
    assert_eq!(publisher.published().len(), 1);
}
