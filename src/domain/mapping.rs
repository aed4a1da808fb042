// Mapping between sea-orm rows and domain models

use entities::{pending_update, track};
use sea_orm::ActiveValue::Set;

use super::models::{PendingUpdateItem, Track};

pub fn map_track(row: track::Model) -> Track {
    Track {
        id: row.id,
        manga_id: row.manga_id,
        sync_id: row.sync_id,
        remote_id: row.remote_id,
        title: row.title,
        last_chapter_read: row.last_chapter_read,
        total_chapters: row.total_chapters,
        status: row.status,
        score: row.score,
        remote_url: row.remote_url,
    }
}

pub fn track_to_active(track: &Track) -> track::ActiveModel {
    track::ActiveModel {
        id: Set(track.id),
        manga_id: Set(track.manga_id),
        sync_id: Set(track.sync_id),
        remote_id: Set(track.remote_id),
        title: Set(track.title.clone()),
        last_chapter_read: Set(track.last_chapter_read),
        total_chapters: Set(track.total_chapters),
        status: Set(track.status),
        score: Set(track.score),
        remote_url: Set(track.remote_url.clone()),
    }
}

pub fn map_pending(row: pending_update::Model) -> PendingUpdateItem {
    PendingUpdateItem {
        track_id: row.track_id,
        last_chapter_read: row.last_chapter_read,
        queued_at: row.queued_at,
    }
}

pub fn pending_to_active(item: &PendingUpdateItem) -> pending_update::ActiveModel {
    pending_update::ActiveModel {
        track_id: Set(item.track_id),
        last_chapter_read: Set(item.last_chapter_read),
        queued_at: Set(item.queued_at),
    }
}
