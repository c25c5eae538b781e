//! Like toggles for videos, comments and tweets.

use axum::extract::{Path, State};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{ApiEnvelope, likes::LikeToggleResponse, users::CurrentUser, videos::VideoResponse},
    db::{errors::DbError, handlers::Likes, models::likes::LikeTarget},
    errors::{Error, Result},
    types::{CommentId, TweetId, VideoId},
};

async fn toggle_like(state: &AppState, current_user: &CurrentUser, target: LikeTarget) -> Result<ApiEnvelope<LikeToggleResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut likes = Likes::new(&mut conn);

    if !likes.target_exists(&target).await? {
        return Err(Error::not_found(target.resource(), target.id()));
    }

    let liked = likes.toggle(current_user.id, &target).await?;
    let message = if liked { "Liked successfully" } else { "Like removed" };
    Ok(ApiEnvelope::ok(LikeToggleResponse { liked }, message))
}

/// Toggle the caller's like on a video.
#[utoipa::path(
    post,
    path = "/likes/toggle/v/{video_id}",
    tag = "likes",
    params(("video_id" = uuid::Uuid, Path, description = "Video to like or unlike")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeToggleResponse),
        (status = 404, description = "No such video"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn toggle_video_like(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(video_id): Path<VideoId>,
) -> Result<ApiEnvelope<LikeToggleResponse>> {
    toggle_like(&state, &current_user, LikeTarget::Video(video_id)).await
}

/// Toggle the caller's like on a comment.
#[utoipa::path(
    post,
    path = "/likes/toggle/c/{comment_id}",
    tag = "likes",
    params(("comment_id" = uuid::Uuid, Path, description = "Comment to like or unlike")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeToggleResponse),
        (status = 404, description = "No such comment"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(comment_id): Path<CommentId>,
) -> Result<ApiEnvelope<LikeToggleResponse>> {
    toggle_like(&state, &current_user, LikeTarget::Comment(comment_id)).await
}

/// Toggle the caller's like on a tweet.
#[utoipa::path(
    post,
    path = "/likes/toggle/t/{tweet_id}",
    tag = "likes",
    params(("tweet_id" = uuid::Uuid, Path, description = "Tweet to like or unlike")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeToggleResponse),
        (status = 404, description = "No such tweet"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tweet_id): Path<TweetId>,
) -> Result<ApiEnvelope<LikeToggleResponse>> {
    toggle_like(&state, &current_user, LikeTarget::Tweet(tweet_id)).await
}

/// Videos the caller has liked, most recent like first.
#[utoipa::path(
    get,
    path = "/likes/videos",
    tag = "likes",
    responses(
        (status = 200, description = "Liked videos", body = [VideoResponse]),
        (status = 401, description = "Not authenticated"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn liked_videos(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<ApiEnvelope<Vec<VideoResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let videos = Likes::new(&mut conn).liked_videos(current_user.id).await?;

    Ok(ApiEnvelope::ok(
        videos.into_iter().map(Into::into).collect(),
        "Liked videos fetched successfully",
    ))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, publish_test_video, signup_and_login};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn video_like_toggles_on_and_off(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_and_login(&server, "alice").await;
        let video: serde_json::Value = publish_test_video(&server, "Likeable").await.json();
        let video_id = video["data"]["id"].as_str().unwrap().to_string();

        let body: serde_json::Value = server.post(&format!("/api/v1/likes/toggle/v/{video_id}")).await.json();
        assert_eq!(body["data"]["liked"], true);

        let liked: serde_json::Value = server.get("/api/v1/likes/videos").await.json();
        assert_eq!(liked["data"].as_array().unwrap().len(), 1);

        let body: serde_json::Value = server.post(&format!("/api/v1/likes/toggle/v/{video_id}")).await.json();
        assert_eq!(body["data"]["liked"], false);

        let liked: serde_json::Value = server.get("/api/v1/likes/videos").await.json();
        assert!(liked["data"].as_array().unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn liking_a_missing_target_is_404(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_and_login(&server, "alice").await;

        for prefix in ["v", "c", "t"] {
            server
                .post(&format!("/api/v1/likes/toggle/{prefix}/{}", uuid::Uuid::new_v4()))
                .await
                .assert_status(StatusCode::NOT_FOUND);
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn comment_and_tweet_likes_toggle(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        signup_and_login(&server, "alice").await;
        let video: serde_json::Value = publish_test_video(&server, "Video").await.json();
        let video_id = video["data"]["id"].as_str().unwrap().to_string();

        let comment: serde_json::Value = server
            .post(&format!("/api/v1/comments/{video_id}"))
            .json(&json!({"content": "Nice"}))
            .await
            .json();
        let comment_id = comment["data"]["id"].as_str().unwrap().to_string();

        let body: serde_json::Value = server.post(&format!("/api/v1/likes/toggle/c/{comment_id}")).await.json();
        assert_eq!(body["data"]["liked"], true);

        // Tweets have no endpoints of their own; seed one directly.
        let owner_id: (uuid::Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = 'alice'")
            .fetch_one(&pool)
            .await
            .unwrap();
        let tweet_id: (uuid::Uuid,) =
            sqlx::query_as("INSERT INTO tweets (owner_id, content) VALUES ($1, 'hello') RETURNING id")
                .bind(owner_id.0)
                .fetch_one(&pool)
                .await
                .unwrap();

        let body: serde_json::Value = server.post(&format!("/api/v1/likes/toggle/t/{}", tweet_id.0)).await.json();
        assert_eq!(body["data"]["liked"], true);
        let body: serde_json::Value = server.post(&format!("/api/v1/likes/toggle/t/{}", tweet_id.0)).await.json();
        assert_eq!(body["data"]["liked"], false);
    }
}
