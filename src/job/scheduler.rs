use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::{
    sync::{Mutex as AsyncMutex, watch},
    task::JoinHandle,
};
use uuid::Uuid;

use super::{Job, RunResult, WorkRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkState {
    /// Waiting for constraints or for the next backoff attempt
    Enqueued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl WorkState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            WorkState::Succeeded | WorkState::Failed | WorkState::Cancelled
        )
    }
}

struct UniqueWork {
    request_id: Uuid,
    state: Arc<watch::Sender<WorkState>>,
    handle: JoinHandle<()>,
    /// Held by a running job; shared by every request registered under the tag
    run_lock: Arc<AsyncMutex<()>>,
}

/// Runs jobs under their request's constraints, at most one request per tag.
pub struct WorkScheduler {
    network: watch::Receiver<bool>,
    work: Mutex<HashMap<String, UniqueWork>>,
}

impl WorkScheduler {
    pub fn new(network: watch::Receiver<bool>) -> Self {
        Self {
            network,
            work: Mutex::new(HashMap::new()),
        }
    }

    fn work(&self) -> MutexGuard<'_, HashMap<String, UniqueWork>> {
        self.work.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue `request`, replacing (and cancelling) any unfinished request
    /// with the same tag. Must be called from within a tokio runtime.
    ///
    /// Cancellation of a running job completes asynchronously; the
    /// replacement does not start its job until the cancelled one is gone.
    pub fn enqueue_unique(&self, request: WorkRequest, job: Arc<dyn Job>) -> Uuid {
        let mut work = self.work();
        let run_lock = match work.remove(&request.tag) {
            Some(previous) => {
                if !previous.state.borrow().is_finished() {
                    tracing::info!(
                        tag = %request.tag,
                        previous = %previous.request_id,
                        replacement = %request.id,
                        "replacing unfinished work"
                    );
                    previous.handle.abort();
                    previous.state.send_replace(WorkState::Cancelled);
                }
                previous.run_lock
            }
            None => Arc::default(),
        };

        let (state, _) = watch::channel(WorkState::Enqueued);
        let state = Arc::new(state);
        let request_id = request.id;
        let tag = request.tag.clone();
        let handle = tokio::spawn(drive(
            request,
            job,
            self.network.clone(),
            state.clone(),
            run_lock.clone(),
        ));
        tracing::debug!(%tag, %request_id, "work enqueued");
        work.insert(
            tag,
            UniqueWork {
                request_id,
                state,
                handle,
                run_lock,
            },
        );
        request_id
    }

    pub fn state(&self, tag: &str) -> Option<WorkState> {
        self.work().get(tag).map(|w| *w.state.borrow())
    }

    pub fn request_id(&self, tag: &str) -> Option<Uuid> {
        self.work().get(tag).map(|w| w.request_id)
    }

    /// Watch the state of the request currently registered under `tag`.
    #[cfg(test)]
    pub fn subscribe(&self, tag: &str) -> Option<watch::Receiver<WorkState>> {
        self.work().get(tag).map(|w| w.state.subscribe())
    }

    /// Number of requests that are enqueued or running.
    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.work()
            .values()
            .filter(|w| !w.state.borrow().is_finished())
            .count()
    }
}

impl Drop for WorkScheduler {
    fn drop(&mut self) {
        for work in self.work().values() {
            work.handle.abort();
        }
    }
}

/// Aborts the job's task when the request driving it is cancelled.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(tag = %request.tag, request_id = %request.id))]
async fn drive(
    request: WorkRequest,
    job: Arc<dyn Job>,
    mut network: watch::Receiver<bool>,
    state: Arc<watch::Sender<WorkState>>,
    run_lock: Arc<AsyncMutex<()>>,
) {
    let mut attempt: u32 = 0;
    loop {
        if request.constraints.requires_network && network.wait_for(|online| *online).await.is_err()
        {
            tracing::warn!("network monitor closed; cancelling work");
            state.send_replace(WorkState::Cancelled);
            return;
        }

        // Released when the job's task is dropped, including after an abort
        let running = run_lock.clone().lock_owned().await;

        attempt += 1;
        state.send_replace(WorkState::Running);
        tracing::debug!(attempt, "running job");

        let job = job.clone();
        let mut task = AbortOnDrop(tokio::spawn(async move {
            let _running = running;
            job.run().await
        }));
        let result = match (&mut task.0).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                tracing::error!(attempt, "job panicked");
                RunResult::Retry
            }
            Err(_) => {
                state.send_replace(WorkState::Cancelled);
                return;
            }
        };

        match result {
            RunResult::Success => {
                tracing::debug!(attempt, "job succeeded");
                state.send_replace(WorkState::Succeeded);
                return;
            }
            RunResult::Failure => {
                tracing::warn!(attempt, "job failed");
                state.send_replace(WorkState::Failed);
                return;
            }
            RunResult::Retry => {
                let delay = request.backoff.delay_for(attempt);
                tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "job will be retried");
                state.send_replace(WorkState::Enqueued);
                tokio::time::sleep(delay).await;
            }
        }
    }
}
