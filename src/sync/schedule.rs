use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use crate::job::{
    BackoffCriteria, Constraints, Job, WorkRequest, WorkScheduler, WorkState,
};

pub const TAG: &str = "DelayedTrackingUpdate";
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(20);

/// Trigger for the delayed tracking drain job.
pub struct DelayedSyncScheduler {
    scheduler: Arc<WorkScheduler>,
    job: Arc<dyn Job>,
    backoff_base: Duration,
}

impl DelayedSyncScheduler {
    pub fn new(scheduler: Arc<WorkScheduler>, job: Arc<dyn Job>) -> Self {
        Self {
            scheduler,
            job,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Request one drain pass once the network is available. Replaces any
    /// pass that is still waiting or running.
    pub fn schedule(&self) -> Uuid {
        let request = WorkRequest::one_time(TAG)
            .with_constraints(Constraints {
                requires_network: true,
            })
            .with_backoff(BackoffCriteria::exponential(self.backoff_base));
        let id = self.scheduler.enqueue_unique(request, self.job.clone());
        tracing::debug!(request_id = %id, "delayed tracking update scheduled");
        id
    }

    pub fn state(&self) -> Option<WorkState> {
        self.scheduler.state(TAG)
    }

    pub fn request_id(&self) -> Option<Uuid> {
        self.scheduler.request_id(TAG)
    }
}
