use std::str::FromStr;

use crate::domain::models::TrackId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// The queued item's track no longer exists
    Orphaned,
    Synced,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncFailure {
    #[error("failed to load track: {0:#}")]
    Resolve(anyhow::Error),
    #[error("tracker update failed: {0:#}")]
    Push(anyhow::Error),
    #[error("saving track failed: {0:#}")]
    Persist(anyhow::Error),
    #[error("tracker update failed: {push:#}; saving track failed: {persist:#}")]
    PushAndPersist {
        push: anyhow::Error,
        persist: anyhow::Error,
    },
}

#[derive(Debug)]
pub enum RetainReason {
    /// No logged in tracker for the track's service
    ServiceUnavailable,
    Failed(SyncFailure),
}

/// What a drain pass decided for one queued item.
#[derive(Debug)]
pub enum ItemOutcome {
    Removable(RemovalReason),
    Retained(RetainReason),
}

impl ItemOutcome {
    pub fn is_removable(&self) -> bool {
        matches!(self, ItemOutcome::Removable(_))
    }

    pub fn failure(&self) -> Option<&SyncFailure> {
        match self {
            ItemOutcome::Retained(RetainReason::Failed(failure)) => Some(failure),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PassReport {
    pub outcomes: Vec<(TrackId, ItemOutcome)>,
    /// Removable items whose removal from the queue failed
    pub removal_errors: usize,
    /// Removable items left queued because newer progress replaced them mid-pass
    pub superseded: usize,
}

impl PassReport {
    pub fn record(&mut self, track_id: TrackId, outcome: ItemOutcome) {
        self.outcomes.push((track_id, outcome));
    }

    pub fn removable_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_removable())
            .map(|(id, _)| *id)
    }

    #[cfg(test)]
    pub fn outcome(&self, track_id: TrackId) -> Option<&ItemOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == track_id)
            .map(|(_, o)| o)
    }

    pub fn count_removed(&self, reason: RemovalReason) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ItemOutcome::Removable(r) if *r == reason))
            .count()
    }

    pub fn count_unavailable(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ItemOutcome::Retained(RetainReason::ServiceUnavailable)))
            .count()
    }

    pub fn count_failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.failure().is_some())
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.count_failed() > 0 || self.removal_errors > 0
    }
}

/// How sync failures inside a pass are reported to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Always report success; failed items wait for the next scheduled pass
    #[default]
    Absorb,
    /// Report a retry so the scheduler backs off and runs the pass again
    Retry,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absorb" => Ok(FailurePolicy::Absorb),
            "retry" => Ok(FailurePolicy::Retry),
            other => Err(format!("unknown sync failure policy: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_policy() {
        assert_eq!("absorb".parse::<FailurePolicy>(), Ok(FailurePolicy::Absorb));
        assert_eq!(" Retry ".parse::<FailurePolicy>(), Ok(FailurePolicy::Retry));
        assert!("never".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn report_counts() {
        let mut report = PassReport::default();
        report.record(1, ItemOutcome::Removable(RemovalReason::Orphaned));
        report.record(2, ItemOutcome::Removable(RemovalReason::Synced));
        report.record(3, ItemOutcome::Retained(RetainReason::ServiceUnavailable));
        report.record(
            4,
            ItemOutcome::Retained(RetainReason::Failed(SyncFailure::Push(anyhow::anyhow!(
                "timeout"
            )))),
        );

        assert_eq!(report.removable_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(report.count_removed(RemovalReason::Synced), 1);
        assert_eq!(report.count_unavailable(), 1);
        assert_eq!(report.count_failed(), 1);
        assert!(report.has_failures());
        assert_eq!(
            report.outcome(4).and_then(|o| o.failure()).map(|f| f.to_string()),
            Some("tracker update failed: timeout".to_string())
        );
    }
}
