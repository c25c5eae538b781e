use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::handlers::videos::VideoSortKey;
use crate::db::models::videos::{VideoDBResponse, VideoWithOwnerDBResponse};
use crate::types::{UserId, VideoId};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: VideoId,
    #[schema(value_type = uuid::Uuid)]
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

impl From<VideoDBResponse> for VideoResponse {
    fn from(video: VideoDBResponse) -> Self {
        Self {
            id: video.id,
            owner_id: video.owner_id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OwnerSummary {
    #[schema(value_type = uuid::Uuid)]
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoWithOwnerResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: OwnerSummary,
}

impl From<VideoWithOwnerDBResponse> for VideoWithOwnerResponse {
    fn from(video: VideoWithOwnerDBResponse) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            updated_at: video.updated_at,
            owner: OwnerSummary {
                id: video.owner_id,
                username: video.owner_username,
                full_name: video.owner_full_name,
                avatar_url: video.owner_avatar_url,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoSort {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl From<VideoSort> for VideoSortKey {
    fn from(sort: VideoSort) -> Self {
        match sort {
            VideoSort::CreatedAt => VideoSortKey::CreatedAt,
            VideoSort::Views => VideoSortKey::Views,
            VideoSort::Duration => VideoSortKey::Duration,
            VideoSort::Title => VideoSortKey::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query parameters for the owner's video listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct VideoListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive title substring filter.
    pub query: Option<String>,
    #[param(inline)]
    pub sort_by: Option<VideoSort>,
    #[param(inline)]
    pub order: Option<SortOrder>,
}

impl VideoListQuery {
    pub fn pagination(&self) -> crate::api::models::pagination::Pagination {
        crate::api::models::pagination::Pagination {
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn sort_key(&self) -> VideoSortKey {
        self.sort_by.unwrap_or_default().into()
    }

    pub fn descending(&self) -> bool {
        matches!(self.order.unwrap_or_default(), SortOrder::Desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_deserializes_from_query_string() {
        let query: VideoListQuery =
            serde_urlencoded::from_str("page=2&limit=5&query=rust&sort_by=views&order=asc")
                .unwrap();

        assert_eq!(query.pagination().offset(), 5);
        assert_eq!(query.query.as_deref(), Some("rust"));
        assert!(matches!(query.sort_key(), VideoSortKey::Views));
        assert!(!query.descending());
    }

    #[test]
    fn list_query_defaults_to_newest_first() {
        let query: VideoListQuery = serde_urlencoded::from_str("").unwrap();
        assert!(matches!(query.sort_key(), VideoSortKey::CreatedAt));
        assert!(query.descending());
    }
}
