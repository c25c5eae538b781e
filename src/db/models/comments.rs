//! Database models for comments.

use crate::types::{CommentId, UserId, VideoId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a comment
#[derive(Debug, Clone)]
pub struct CommentCreateDBRequest {
    pub video_id: VideoId,
    pub owner_id: UserId,
    pub content: String,
}

/// Database request for updating a comment
#[derive(Debug, Clone)]
pub struct CommentUpdateDBRequest {
    pub content: String,
}

/// Database response for a comment
#[derive(Debug, Clone, FromRow)]
pub struct CommentDBResponse {
    pub id: CommentId,
    pub video_id: VideoId,
    pub owner_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment joined with its author's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthorDBResponse {
    pub id: CommentId,
    pub video_id: VideoId,
    pub owner_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_username: String,
    pub owner_full_name: String,
    pub owner_avatar_url: String,
}
