// Domain models shared by the stores, the trackers and the drain job

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TrackId = i64;
pub type ServiceId = i64;

/// A manga's entry on one external tracker, as stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub manga_id: i64,
    /// Id of the tracker service this entry belongs to
    pub sync_id: ServiceId,
    pub remote_id: i64,
    pub title: String,
    pub last_chapter_read: f64,
    pub total_chapters: i64,
    pub status: i64,
    pub score: f64,
    pub remote_url: String,
}

impl Track {
    /// Copy of this track carrying a queued progress value.
    pub fn with_last_chapter_read(&self, last_chapter_read: f64) -> Track {
        Track {
            last_chapter_read,
            ..self.clone()
        }
    }
}

/// Progress update that could not be pushed when it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdateItem {
    pub track_id: TrackId,
    pub last_chapter_read: f64,
    pub queued_at: DateTime<Utc>,
}

impl PendingUpdateItem {
    pub fn new(track_id: TrackId, last_chapter_read: f64) -> Self {
        Self {
            track_id,
            last_chapter_read,
            queued_at: Utc::now(),
        }
    }
}
