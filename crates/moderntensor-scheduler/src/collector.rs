//! Collector — awaits a dispatched batch up to its timeout (or an external
//! cancellation) and produces the round's `RoundOutcome`.

use crate::cancellation::PhaseCancellation;
use crate::dispatcher::BatchHandle;
use crate::transport::TransportError;
use futures::StreamExt;
use moderntensor_core::{Clock, MinerResult, RoundOutcome, TaskOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct Collector;

impl Collector {
    /// Drain every in-flight send until either all have resolved, `timeout`
    /// elapses, or `cancellation` fires — whichever comes first. Dropping
    /// the drain future on either branch cancels every outstanding future
    /// in the batch, so nothing from this batch can report back into a
    /// later round. Tasks still unresolved at that point are recorded as
    /// `Timeout`.
    pub async fn collect(
        handle: BatchHandle,
        timeout: Duration,
        round_index: u64,
        clock: &Arc<dyn Clock>,
        cancellation: &PhaseCancellation,
    ) -> RoundOutcome {
        let BatchHandle { tasks, mut pending } = handle;
        let created_at: HashMap<_, _> = tasks.iter().map(|t| (t.task_id, t.created_at)).collect();
        let mut outcomes = HashMap::with_capacity(tasks.len());

        let drain = async {
            while let Some((task_id, result)) = pending.next().await {
                let start = created_at.get(&task_id).copied().unwrap_or_else(|| clock.now());
                let outcome = match result {
                    Ok(payload) => TaskOutcome::Completed(MinerResult {
                        task_id,
                        completed_at: clock.now(),
                        payload,
                        latency: clock.now().saturating_duration_since(start),
                    }),
                    Err(TransportError::Dispatch(msg)) => TaskOutcome::DispatchError(msg),
                    Err(TransportError::Malformed(msg)) => TaskOutcome::Malformed(msg),
                };
                outcomes.insert(task_id, outcome);
            }
        };

        // Whichever branch doesn't win drops `drain` (and with it, `pending`),
        // which cancels any futures still outstanding in the batch.
        tokio::select! {
            _ = tokio::time::timeout(timeout, drain) => {}
            _ = cancellation.cancelled() => {}
        }

        for task in &tasks {
            outcomes.entry(task.task_id).or_insert(TaskOutcome::Timeout);
        }

        RoundOutcome::new(round_index, tasks, outcomes)
    }
}
