use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::comments::{CommentDBResponse, CommentWithAuthorDBResponse};
use crate::types::{CommentId, UserId, VideoId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: CommentId,
    #[schema(value_type = uuid::Uuid)]
    pub video_id: VideoId,
    #[schema(value_type = uuid::Uuid)]
    pub owner_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentDBResponse> for CommentResponse {
    fn from(comment: CommentDBResponse) -> Self {
        Self {
            id: comment.id,
            video_id: comment.video_id,
            owner_id: comment.owner_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorSummary {
    #[schema(value_type = uuid::Uuid)]
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentWithAuthorResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: CommentId,
    #[schema(value_type = uuid::Uuid)]
    pub video_id: VideoId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: AuthorSummary,
}

impl From<CommentWithAuthorDBResponse> for CommentWithAuthorResponse {
    fn from(comment: CommentWithAuthorDBResponse) -> Self {
        Self {
            id: comment.id,
            video_id: comment.video_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            owner: AuthorSummary {
                id: comment.owner_id,
                username: comment.owner_username,
                full_name: comment.owner_full_name,
                avatar_url: comment.owner_avatar_url,
            },
        }
    }
}
