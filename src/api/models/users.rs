use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::users::{ChannelProfileDBResponse, UserDBResponse};
use crate::types::UserId;

/// The authenticated user attached to a request by the extractor in
/// [`crate::auth::current_user`]. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for CurrentUser {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<CurrentUser> for UserResponse {
    fn from(user: CurrentUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Public channel page for a username, as seen by the requesting viewer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelProfileResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub subscriber_count: i64,
    /// Channels this user is subscribed to.
    pub subscribed_to_count: i64,
    /// Whether the viewer subscribes to this channel.
    pub is_subscribed: bool,
}

impl From<ChannelProfileDBResponse> for ChannelProfileResponse {
    fn from(profile: ChannelProfileDBResponse) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
            cover_image_url: profile.cover_image_url,
            subscriber_count: profile.subscriber_count,
            subscribed_to_count: profile.subscribed_to_count,
            is_subscribed: profile.is_subscribed,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
