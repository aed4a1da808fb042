use chrono::{DateTime, Utc};
use poem_openapi::{ApiResponse, Enum, Object, payload::Json};
use uuid::Uuid;

use crate::{domain::models::PendingUpdateItem, job::WorkState};

#[derive(Debug, Clone, Object)]
pub struct ErrorDto {
    /// Human-readable error message
    pub message: String,
}

impl From<String> for ErrorDto {
    fn from(message: String) -> Self {
        ErrorDto { message }
    }
}

#[derive(Debug, Clone, Object)]
pub struct PendingUpdateDto {
    pub track_id: i64,
    pub last_chapter_read: f64,
    pub queued_at: DateTime<Utc>,
}

impl From<PendingUpdateItem> for PendingUpdateDto {
    fn from(item: PendingUpdateItem) -> Self {
        PendingUpdateDto {
            track_id: item.track_id,
            last_chapter_read: item.last_chapter_read,
            queued_at: item.queued_at,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct QueueUpdateRequestDto {
    pub last_chapter_read: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[oai(rename_all = "snake_case")]
pub enum JobStateDto {
    Enqueued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl From<WorkState> for JobStateDto {
    fn from(state: WorkState) -> Self {
        match state {
            WorkState::Enqueued => JobStateDto::Enqueued,
            WorkState::Running => JobStateDto::Running,
            WorkState::Succeeded => JobStateDto::Succeeded,
            WorkState::Failed => JobStateDto::Failed,
            WorkState::Cancelled => JobStateDto::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct StatusDto {
    pub pending: u64,
    pub online: bool,
    /// State of the last scheduled drain pass, if any
    pub job_state: Option<JobStateDto>,
    pub request_id: Option<Uuid>,
}

#[derive(Debug, Clone, Object)]
pub struct SyncScheduledDto {
    pub request_id: Uuid,
}

#[derive(ApiResponse)]
pub enum StatusResponseDto {
    #[oai(status = 200)]
    Ok(Json<StatusDto>),

    /// Queue could not be read
    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum PendingListResponseDto {
    /// Queued updates in drain order
    #[oai(status = 200)]
    Ok(Json<Vec<PendingUpdateDto>>),

    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum QueueUpdateResponseDto {
    /// Update queued and a drain pass scheduled
    #[oai(status = 202)]
    Accepted(Json<SyncScheduledDto>),

    #[oai(status = 400)]
    BadRequest(Json<ErrorDto>),

    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum DiscardUpdateResponseDto {
    /// Queued update dropped, or none was queued
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum SyncResponseDto {
    /// Drain pass scheduled
    #[oai(status = 202)]
    Accepted(Json<SyncScheduledDto>),
}
