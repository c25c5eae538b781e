//! Database models for videos.

use crate::types::{UserId, VideoId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a video record
#[derive(Debug, Clone)]
pub struct VideoCreateDBRequest {
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
}

/// Database request for updating a video.
///
/// `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct VideoUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Database response for a video
#[derive(Debug, Clone, FromRow)]
pub struct VideoDBResponse {
    pub id: VideoId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A video joined with its owner's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct VideoWithOwnerDBResponse {
    pub id: VideoId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_username: String,
    pub owner_full_name: String,
    pub owner_avatar_url: String,
}

/// Per-channel video aggregates for the dashboard.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct VideoOwnerStatsDBResponse {
    pub total_videos: i64,
    pub total_views: i64,
}
