use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::videos::VideoWithOwnerResponse;
use crate::db::models::playlists::PlaylistDBResponse;
use crate::types::{PlaylistId, UserId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePlaylistRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePlaylistRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaylistResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: PlaylistId,
    #[schema(value_type = uuid::Uuid)]
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlaylistDBResponse> for PlaylistResponse {
    fn from(playlist: PlaylistDBResponse) -> Self {
        Self {
            id: playlist.id,
            owner_id: playlist.owner_id,
            title: playlist.title,
            description: playlist.description,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        }
    }
}

/// A playlist with its member videos in insertion order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlaylistWithVideosResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: PlaylistId,
    #[schema(value_type = uuid::Uuid)]
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub videos: Vec<VideoWithOwnerResponse>,
}

impl PlaylistWithVideosResponse {
    pub fn new(playlist: PlaylistDBResponse, videos: Vec<VideoWithOwnerResponse>) -> Self {
        Self {
            id: playlist.id,
            owner_id: playlist.owner_id,
            title: playlist.title,
            description: playlist.description,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
            videos,
        }
    }
}
