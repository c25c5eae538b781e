//! Database models for playlists.

use crate::types::{PlaylistId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a playlist
#[derive(Debug, Clone)]
pub struct PlaylistCreateDBRequest {
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
}

/// Database request for updating a playlist.
///
/// `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct PlaylistUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Database response for a playlist
#[derive(Debug, Clone, FromRow)]
pub struct PlaylistDBResponse {
    pub id: PlaylistId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
