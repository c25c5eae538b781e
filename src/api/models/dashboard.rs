use serde::Serialize;
use utoipa::ToSchema;

/// Channel-wide aggregates for the owner's dashboard.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ChannelStatsResponse {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_playlists: i64,
    pub total_subscribers: i64,
    /// Likes this user has placed on any target.
    pub total_likes_given: i64,
    /// Likes other users have placed on this channel's videos.
    pub total_likes_received: i64,
}
