use std::{collections::HashSet, sync::Arc};

use super::outcome::{
    FailurePolicy, ItemOutcome, PassReport, RemovalReason, RetainReason, SyncFailure,
};
use crate::{
    domain::models::{PendingUpdateItem, Track, TrackId},
    job::{Job, RunResult},
    storage::{PendingUpdateStore, TrackRepository, TrackWriter},
    tracker::TrackerRegistry,
};

/// Drains the pending update queue into the trackers.
///
/// A pass evaluates every queued item before removing anything, so a pass
/// that is interrupted leaves the queue untouched. Items are removed when
/// their track no longer exists or when both the tracker update and the
/// local save succeeded; everything else stays queued for the next pass.
pub struct SyncDrainer {
    pending: Arc<dyn PendingUpdateStore>,
    tracks: Arc<dyn TrackRepository>,
    writer: Arc<dyn TrackWriter>,
    trackers: Arc<dyn TrackerRegistry>,
    policy: FailurePolicy,
}

impl SyncDrainer {
    pub fn new(
        pending: Arc<dyn PendingUpdateStore>,
        tracks: Arc<dyn TrackRepository>,
        writer: Arc<dyn TrackWriter>,
        trackers: Arc<dyn TrackerRegistry>,
    ) -> Self {
        Self {
            pending,
            tracks,
            writer,
            trackers,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one pass over a snapshot of the queue.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn drain(&self) -> anyhow::Result<PassReport> {
        let items = self.pending.get_all().await?;
        let mut report = PassReport::default();
        if items.is_empty() {
            return Ok(report);
        }

        let mut resolved = Vec::with_capacity(items.len());
        for item in &items {
            match self.resolve(item).await {
                Ok(track) => resolved.push((item.track_id, track)),
                Err(outcome) => report.record(item.track_id, outcome),
            }
        }

        for (track_id, track) in resolved {
            let outcome = self.dispatch(&track).await;
            report.record(track_id, outcome);
        }

        // Only the value this pass saw is removed; newer progress queued
        // meanwhile stays for the next pass.
        let removable: HashSet<TrackId> = report.removable_ids().collect();
        for item in items.iter().filter(|i| removable.contains(&i.track_id)) {
            match self.pending.remove_if_unchanged(item).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(track_id = item.track_id, "update replaced during pass, keeping it queued");
                    report.superseded += 1;
                }
                Err(e) => {
                    tracing::error!(track_id = item.track_id, error = %format!("{:#}", e), "failed to remove pending update");
                    report.removal_errors += 1;
                }
            }
        }
        Ok(report)
    }

    /// Load the item's track and apply the queued progress to it.
    async fn resolve(&self, item: &PendingUpdateItem) -> Result<Track, ItemOutcome> {
        match self.tracks.get_by_id(item.track_id).await {
            Ok(Some(track)) => Ok(track.with_last_chapter_read(item.last_chapter_read)),
            Ok(None) => {
                tracing::debug!(track_id = item.track_id, "dropping update for deleted track");
                Err(ItemOutcome::Removable(RemovalReason::Orphaned))
            }
            Err(e) => {
                let failure = SyncFailure::Resolve(e);
                tracing::error!(track_id = item.track_id, error = %failure, "delayed track update failed");
                Err(ItemOutcome::Retained(RetainReason::Failed(failure)))
            }
        }
    }

    async fn dispatch(&self, track: &Track) -> ItemOutcome {
        let Some(tracker) = self
            .trackers
            .get(track.sync_id)
            .filter(|t| t.is_logged_in())
        else {
            tracing::debug!(track_id = track.id, sync_id = track.sync_id, "tracker unavailable, keeping update queued");
            return ItemOutcome::Retained(RetainReason::ServiceUnavailable);
        };

        tracing::debug!(
            track_id = track.id,
            tracker = tracker.name(),
            last_chapter_read = track.last_chapter_read,
            "updating delayed track item"
        );
        let (pushed, saved) = tokio::join!(tracker.update(track, true), self.writer.upsert(track));
        let failure = match (pushed, saved) {
            (Ok(()), Ok(())) => return ItemOutcome::Removable(RemovalReason::Synced),
            (Err(push), Ok(())) => SyncFailure::Push(push),
            (Ok(()), Err(persist)) => SyncFailure::Persist(persist),
            (Err(push), Err(persist)) => SyncFailure::PushAndPersist { push, persist },
        };
        tracing::error!(track_id = track.id, error = %failure, "delayed track update failed");
        ItemOutcome::Retained(RetainReason::Failed(failure))
    }
}

#[async_trait::async_trait]
impl Job for SyncDrainer {
    async fn run(&self) -> RunResult {
        let failed = match self.drain().await {
            Ok(report) => {
                if !report.outcomes.is_empty() {
                    tracing::info!(
                        synced = report.count_removed(RemovalReason::Synced),
                        orphaned = report.count_removed(RemovalReason::Orphaned),
                        unavailable = report.count_unavailable(),
                        failed = report.count_failed(),
                        superseded = report.superseded,
                        "delayed tracking pass finished"
                    );
                }
                report.has_failures()
            }
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "failed to read pending updates");
                true
            }
        };
        match (failed, self.policy) {
            (true, FailurePolicy::Retry) => RunResult::Retry,
            _ => RunResult::Success,
        }
    }
}
