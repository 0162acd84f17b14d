//! Dispatcher — issues one task per selected miner concurrently, bounded by
//! `max_concurrent`.

use crate::transport::{MinerTransport, TransportError};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use moderntensor_core::{Clock, MinerRef, MinerUid, Payload, Task, TaskId};
use std::sync::Arc;
use tokio::sync::Semaphore;

type SendOutcome = (TaskId, Result<Payload, TransportError>);

/// Every Task this round produced, plus the still-unawaited futures that
/// will resolve to that task's outcome. Handed to the Collector untouched.
pub struct BatchHandle {
    pub(crate) tasks: Vec<Task>,
    pub(crate) pending: FuturesUnordered<BoxFuture<'static, SendOutcome>>,
}

pub struct Dispatcher {
    transport: Arc<dyn MinerTransport>,
    semaphore: Arc<Semaphore>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn MinerTransport>, max_concurrent: usize, clock: Arc<dyn Clock>) -> Self {
        Self { transport, semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))), clock }
    }

    /// Build one `Task` per miner in `batch` and begin sending it. A send
    /// never blocks another send in the batch: every future here is
    /// independent, admission-gated only by the shared semaphore.
    pub fn dispatch(&self, batch: &[MinerRef], next_task_id: &mut TaskId) -> BatchHandle {
        let mut tasks = Vec::with_capacity(batch.len());
        let pending = FuturesUnordered::new();

        for miner in batch {
            let task_id = *next_task_id;
            *next_task_id += 1;

            let task =
                Task { task_id, payload: Payload::Raw(Vec::new()), created_at: self.clock.now(), target: miner.uid.clone() };
            tasks.push(task.clone());

            let transport = self.transport.clone();
            let semaphore = self.semaphore.clone();
            let miner = miner.clone();

            let fut: BoxFuture<'static, SendOutcome> = Box::pin(async move {
                let permit = semaphore.acquire_owned().await.expect("dispatch semaphore is never closed");
                let result = transport.send(&miner, &task).await;
                drop(permit);
                (task_id, result)
            });
            pending.push(fut);
        }

        BatchHandle { tasks, pending }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use moderntensor_core::{system_clock, MinerUid, MockClock};
    use std::time::Instant;

    struct EchoTransport;

    #[async_trait]
    impl MinerTransport for EchoTransport {
        async fn send(&self, _miner: &MinerRef, _task: &Task) -> Result<Payload, TransportError> {
            Ok(Payload::Raw(Vec::new()))
        }
    }

    #[tokio::test]
    async fn dispatch_produces_one_task_per_miner() {
        let dispatcher = Dispatcher::new(Arc::new(EchoTransport), 4, system_clock());
        let batch = vec![
            MinerRef::new(MinerUid::from("m1"), "https://m1.example", 1.0),
            MinerRef::new(MinerUid::from("m2"), "https://m2.example", 1.0),
        ];
        let mut next_id = 0;
        let handle = dispatcher.dispatch(&batch, &mut next_id);
        assert_eq!(handle.tasks.len(), 2);
        assert_eq!(next_id, 2);
    }

    #[tokio::test]
    async fn dispatch_stamps_tasks_from_the_injected_clock() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let dispatcher = Dispatcher::new(Arc::new(EchoTransport), 4, clock.clone());
        let batch = vec![MinerRef::new(MinerUid::from("m1"), "https://m1.example", 1.0)];
        let mut next_id = 0;
        let handle = dispatcher.dispatch(&batch, &mut next_id);
        assert_eq!(handle.tasks[0].created_at, clock.now());
    }
}
