//! Background work: the `Job` contract, work requests and their scheduler.
//!
//! A job only reports how a run went; constraints, uniqueness and backoff
//! are owned by [`WorkScheduler`].

pub mod network;
pub mod scheduler;

pub use network::NetworkMonitor;
pub use scheduler::{WorkScheduler, WorkState};

use std::time::Duration;

use uuid::Uuid;

/// Longest delay between two attempts of the same request.
pub const MAX_BACKOFF: Duration = Duration::from_secs(5 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    Success,
    /// Run again after the request's backoff delay
    Retry,
    Failure,
}

#[async_trait::async_trait]
pub trait Job: Send + Sync {
    async fn run(&self) -> RunResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Constraints {
    pub requires_network: bool,
}

/// Exponential backoff doubling from `base`, capped at [`MAX_BACKOFF`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffCriteria {
    pub base: Duration,
}

impl BackoffCriteria {
    pub fn exponential(base: Duration) -> Self {
        Self { base }
    }

    /// Delay before the next attempt once `attempt` attempts (1-based) have failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt.max(1) - 1)
            .and_then(|f| self.base.checked_mul(f))
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }
}

impl Default for BackoffCriteria {
    fn default() -> Self {
        Self::exponential(Duration::from_secs(30))
    }
}

/// One request to run a job, identified by `id` and deduplicated by `tag`.
#[derive(Debug, Clone)]
pub struct WorkRequest {
    pub id: Uuid,
    pub tag: String,
    pub constraints: Constraints,
    pub backoff: BackoffCriteria,
}

impl WorkRequest {
    pub fn one_time(tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag: tag.into(),
            constraints: Constraints::default(),
            backoff: BackoffCriteria::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffCriteria) -> Self {
        self.backoff = backoff;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_doubles_from_base() {
        let backoff = BackoffCriteria::exponential(Duration::from_secs(20));
        assert_eq!(backoff.delay_for(1), Duration::from_secs(20));
        assert_eq!(backoff.delay_for(2), Duration::from_secs(40));
        assert_eq!(backoff.delay_for(3), Duration::from_secs(80));
        assert_eq!(backoff.delay_for(0), Duration::from_secs(20));
    }

    #[test]
    fn backoff_is_capped() {
        let backoff = BackoffCriteria::exponential(Duration::from_secs(20));
        assert_eq!(backoff.delay_for(12), MAX_BACKOFF);
        assert_eq!(backoff.delay_for(64), MAX_BACKOFF);
        assert_eq!(backoff.delay_for(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn request_builder() {
        let request = WorkRequest::one_time("tag")
            .with_constraints(Constraints {
                requires_network: true,
            })
            .with_backoff(BackoffCriteria::exponential(Duration::from_secs(20)));
        assert_eq!(request.tag, "tag");
        assert!(request.constraints.requires_network);
        assert_eq!(request.backoff.base, Duration::from_secs(20));
        assert_ne!(request.id, WorkRequest::one_time("tag").id);
    }
}
