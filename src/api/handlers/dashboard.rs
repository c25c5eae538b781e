//! Channel dashboard endpoints.

use axum::extract::State;
use tracing::instrument;

use crate::{
    AppState,
    api::models::{ApiEnvelope, dashboard::ChannelStatsResponse, users::CurrentUser, videos::VideoResponse},
    db::{
        errors::DbError,
        handlers::{Likes, Playlists, Subscriptions, Videos},
    },
    errors::Result,
};

/// Aggregates for the caller's channel.
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Channel statistics", body = ChannelStatsResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn channel_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<ApiEnvelope<ChannelStatsResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let video_stats = Videos::new(&mut conn).owner_stats(current_user.id).await?;
    let total_playlists = Playlists::new(&mut conn).count_for_owner(current_user.id).await?;
    let total_subscribers = Subscriptions::new(&mut conn).subscriber_count(current_user.id).await?;
    let mut likes = Likes::new(&mut conn);
    let total_likes_given = likes.likes_given(current_user.id).await?;
    let total_likes_received = likes.likes_received_on_videos(current_user.id).await?;

    Ok(ApiEnvelope::ok(
        ChannelStatsResponse {
            total_videos: video_stats.total_videos,
            total_views: video_stats.total_views,
            total_playlists,
            total_subscribers,
            total_likes_given,
            total_likes_received,
        },
        "Channel stats fetched successfully",
    ))
}

/// Every video the caller has uploaded, newest first, unpaginated.
#[utoipa::path(
    get,
    path = "/dashboard/videos",
    tag = "dashboard",
    responses(
        (status = 200, description = "All of the caller's videos", body = [VideoResponse]),
        (status = 401, description = "Not authenticated"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn channel_videos(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<ApiEnvelope<Vec<VideoResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let videos = Videos::new(&mut conn).list_all_for_owner(current_user.id).await?;

    Ok(ApiEnvelope::ok(
        videos.into_iter().map(Into::into).collect(),
        "Channel videos fetched successfully",
    ))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, publish_test_video, signup_and_login};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn stats_aggregate_across_modules(pool: PgPool) {
        let server = create_test_app(pool).await;

        signup_and_login(&server, "channel").await;
        let video: serde_json::Value = publish_test_video(&server, "Stats video").await.json();
        let video_id = video["data"]["id"].as_str().unwrap().to_string();
        server
            .post("/api/v1/playlists")
            .json(&json!({"title": "My list"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        let me: serde_json::Value = server.get("/api/v1/users/current-user").await.json();
        let channel_id = me["data"]["id"].as_str().unwrap().to_string();

        signup_and_login(&server, "fan").await;
        server
            .post(&format!("/api/v1/subscriptions/c/{channel_id}"))
            .await
            .assert_status_ok();
        server
            .get(&format!("/api/v1/videos/{video_id}"))
            .await
            .assert_status_ok();
        server
            .post(&format!("/api/v1/likes/toggle/v/{video_id}"))
            .await
            .assert_status_ok();

        server
            .post("/api/v1/users/login")
            .json(&json!({"username": "channel", "password": "correct horse"}))
            .await
            .assert_status_ok();

        let body: serde_json::Value = server.get("/api/v1/dashboard/stats").await.json();
        assert_eq!(body["data"]["total_videos"], 1);
        assert_eq!(body["data"]["total_views"], 1);
        assert_eq!(body["data"]["total_playlists"], 1);
        assert_eq!(body["data"]["total_subscribers"], 1);
        assert_eq!(body["data"]["total_likes_given"], 0);
        assert_eq!(body["data"]["total_likes_received"], 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn dashboard_videos_are_unpaginated(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_and_login(&server, "alice").await;

        for i in 0..12 {
            publish_test_video(&server, &format!("Video {i}"))
                .await
                .assert_status(axum::http::StatusCode::CREATED);
        }

        let body: serde_json::Value = server.get("/api/v1/dashboard/videos").await.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 12);
    }
}
