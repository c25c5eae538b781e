//! Playlist endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        ApiEnvelope,
        playlists::{CreatePlaylistRequest, PlaylistResponse, PlaylistWithVideosResponse, UpdatePlaylistRequest},
        users::CurrentUser,
    },
    db::{
        errors::DbError,
        handlers::{PlaylistFilter, Playlists, Videos, repository::Repository},
        models::playlists::{PlaylistCreateDBRequest, PlaylistDBResponse, PlaylistUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{PlaylistId, UserId, VideoId},
};

async fn owned_playlist(
    playlists: &mut Playlists<'_>,
    id: PlaylistId,
    current_user: &CurrentUser,
) -> Result<PlaylistDBResponse> {
    let playlist = playlists
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Playlist", id))?;
    if playlist.owner_id != current_user.id {
        return Err(Error::Forbidden {
            resource: "playlist".to_string(),
        });
    }
    Ok(playlist)
}

/// Create a playlist.
#[utoipa::path(
    post,
    path = "/playlists",
    tag = "playlists",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 201, description = "Playlist created", body = PlaylistResponse),
        (status = 400, description = "Blank title"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn create_playlist(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CreatePlaylistRequest>,
) -> Result<ApiEnvelope<PlaylistResponse>> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(Error::bad_request("Playlist title is required"));
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let playlist = Playlists::new(&mut conn)
        .create(&PlaylistCreateDBRequest {
            owner_id: current_user.id,
            title: title.to_string(),
            description: request.description.unwrap_or_default().trim().to_string(),
        })
        .await?;

    Ok(ApiEnvelope::created(playlist.into(), "Playlist created successfully"))
}

/// All playlists owned by a user, newest first.
#[utoipa::path(
    get,
    path = "/playlists/user/{user_id}",
    tag = "playlists",
    params(("user_id" = uuid::Uuid, Path, description = "Playlist owner")),
    responses(
        (status = 200, description = "The user's playlists", body = [PlaylistResponse]),
        (status = 404, description = "No such user"),
    )
)]
#[instrument(skip_all, fields(owner = %user_id))]
pub async fn user_playlists(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<ApiEnvelope<Vec<PlaylistResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    crate::db::handlers::Users::new(&mut conn)
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;

    let playlists = Playlists::new(&mut conn)
        .list(&PlaylistFilter { owner_id: user_id })
        .await?;

    Ok(ApiEnvelope::ok(
        playlists.into_iter().map(Into::into).collect(),
        "Playlists fetched successfully",
    ))
}

/// A playlist with its videos in insertion order.
#[utoipa::path(
    get,
    path = "/playlists/{playlist_id}",
    tag = "playlists",
    params(("playlist_id" = uuid::Uuid, Path, description = "Playlist to fetch")),
    responses(
        (status = 200, description = "Playlist with videos", body = PlaylistWithVideosResponse),
        (status = 404, description = "No such playlist"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn get_playlist(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(playlist_id): Path<PlaylistId>,
) -> Result<ApiEnvelope<PlaylistWithVideosResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut playlists = Playlists::new(&mut conn);

    let playlist = playlists
        .get_by_id(playlist_id)
        .await?
        .ok_or_else(|| Error::not_found("Playlist", playlist_id))?;
    let videos = playlists.videos_in(playlist_id).await?;

    Ok(ApiEnvelope::ok(
        PlaylistWithVideosResponse::new(playlist, videos.into_iter().map(Into::into).collect()),
        "Playlist fetched successfully",
    ))
}

/// Update a playlist's title or description (owner only).
#[utoipa::path(
    patch,
    path = "/playlists/{playlist_id}",
    tag = "playlists",
    params(("playlist_id" = uuid::Uuid, Path, description = "Playlist to update")),
    request_body = UpdatePlaylistRequest,
    responses(
        (status = 200, description = "Updated playlist", body = PlaylistResponse),
        (status = 403, description = "Caller does not own the playlist"),
        (status = 404, description = "No such playlist"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn update_playlist(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(playlist_id): Path<PlaylistId>,
    Json(request): Json<UpdatePlaylistRequest>,
) -> Result<ApiEnvelope<PlaylistResponse>> {
    let title = request.title.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let description = request.description.as_deref().map(str::trim);
    if title.is_none() && description.is_none() {
        return Err(Error::bad_request("Nothing to update"));
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut playlists = Playlists::new(&mut conn);
    owned_playlist(&mut playlists, playlist_id, &current_user).await?;

    let playlist = playlists
        .update(
            playlist_id,
            &PlaylistUpdateDBRequest {
                title: title.map(str::to_string),
                description: description.map(str::to_string),
            },
        )
        .await?;

    Ok(ApiEnvelope::ok(playlist.into(), "Playlist updated successfully"))
}

/// Delete a playlist (owner only).
#[utoipa::path(
    delete,
    path = "/playlists/{playlist_id}",
    tag = "playlists",
    params(("playlist_id" = uuid::Uuid, Path, description = "Playlist to delete")),
    responses(
        (status = 200, description = "Playlist deleted"),
        (status = 403, description = "Caller does not own the playlist"),
        (status = 404, description = "No such playlist"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn delete_playlist(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(playlist_id): Path<PlaylistId>,
) -> Result<ApiEnvelope<()>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut playlists = Playlists::new(&mut conn);
    owned_playlist(&mut playlists, playlist_id, &current_user).await?;

    playlists.delete(playlist_id).await?;
    Ok(ApiEnvelope::message_only("Playlist deleted successfully"))
}

/// Add a video to a playlist (owner only). Adding a video twice is an error.
#[utoipa::path(
    post,
    path = "/playlists/{playlist_id}/videos/{video_id}",
    tag = "playlists",
    params(
        ("playlist_id" = uuid::Uuid, Path, description = "Target playlist"),
        ("video_id" = uuid::Uuid, Path, description = "Video to add"),
    ),
    responses(
        (status = 200, description = "Video added", body = PlaylistResponse),
        (status = 400, description = "Video already in the playlist"),
        (status = 403, description = "Caller does not own the playlist"),
        (status = 404, description = "No such playlist or video"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn add_video_to_playlist(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((playlist_id, video_id)): Path<(PlaylistId, VideoId)>,
) -> Result<ApiEnvelope<PlaylistResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    Videos::new(&mut conn)
        .get_by_id(video_id)
        .await?
        .ok_or_else(|| Error::not_found("Video", video_id))?;

    let mut playlists = Playlists::new(&mut conn);
    let playlist = owned_playlist(&mut playlists, playlist_id, &current_user).await?;

    if !playlists.add_video(playlist_id, video_id).await? {
        return Err(Error::bad_request("Video is already in this playlist"));
    }

    Ok(ApiEnvelope::ok(playlist.into(), "Video added to playlist successfully"))
}

/// Remove a video from a playlist (owner only). Removing an absent video is
/// an error.
#[utoipa::path(
    delete,
    path = "/playlists/{playlist_id}/videos/{video_id}",
    tag = "playlists",
    params(
        ("playlist_id" = uuid::Uuid, Path, description = "Target playlist"),
        ("video_id" = uuid::Uuid, Path, description = "Video to remove"),
    ),
    responses(
        (status = 200, description = "Video removed", body = PlaylistResponse),
        (status = 400, description = "Video is not in the playlist"),
        (status = 403, description = "Caller does not own the playlist"),
        (status = 404, description = "No such playlist or video"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn remove_video_from_playlist(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((playlist_id, video_id)): Path<(PlaylistId, VideoId)>,
) -> Result<ApiEnvelope<PlaylistResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    Videos::new(&mut conn)
        .get_by_id(video_id)
        .await?
        .ok_or_else(|| Error::not_found("Video", video_id))?;

    let mut playlists = Playlists::new(&mut conn);
    let playlist = owned_playlist(&mut playlists, playlist_id, &current_user).await?;

    if !playlists.remove_video(playlist_id, video_id).await? {
        return Err(Error::bad_request("Video is not in this playlist"));
    }

    Ok(ApiEnvelope::ok(playlist.into(), "Video removed from playlist successfully"))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, publish_test_video, signup_and_login};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    async fn create_playlist(server: &axum_test::TestServer, title: &str) -> String {
        let response = server
            .post("/api/v1/playlists")
            .json(&json!({"title": title, "description": "test playlist"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn playlist_lifecycle(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_and_login(&server, "alice").await;
        let playlist_id = create_playlist(&server, "Favorites").await;

        let response = server
            .patch(&format!("/api/v1/playlists/{playlist_id}"))
            .json(&json!({"title": "Renamed"}))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["title"], "Renamed");
        assert_eq!(body["data"]["description"], "test playlist");

        server
            .delete(&format!("/api/v1/playlists/{playlist_id}"))
            .await
            .assert_status_ok();
        server
            .get(&format!("/api/v1/playlists/{playlist_id}"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn videos_are_added_once_and_listed_in_order(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_and_login(&server, "alice").await;
        let playlist_id = create_playlist(&server, "Watch later").await;

        let first: serde_json::Value = publish_test_video(&server, "First").await.json();
        let second: serde_json::Value = publish_test_video(&server, "Second").await.json();
        let first_id = first["data"]["id"].as_str().unwrap();
        let second_id = second["data"]["id"].as_str().unwrap();

        for video_id in [first_id, second_id] {
            server
                .post(&format!("/api/v1/playlists/{playlist_id}/videos/{video_id}"))
                .await
                .assert_status_ok();
        }

        // Duplicate add is a 400.
        server
            .post(&format!("/api/v1/playlists/{playlist_id}/videos/{first_id}"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let body: serde_json::Value = server.get(&format!("/api/v1/playlists/{playlist_id}")).await.json();
        let videos = body["data"]["videos"].as_array().unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0]["title"], "First");
        assert_eq!(videos[1]["title"], "Second");

        server
            .delete(&format!("/api/v1/playlists/{playlist_id}/videos/{first_id}"))
            .await
            .assert_status_ok();
        // Removing again is a 400.
        server
            .delete(&format!("/api/v1/playlists/{playlist_id}/videos/{first_id}"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn missing_playlist_or_video_is_404(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_and_login(&server, "alice").await;
        let playlist_id = create_playlist(&server, "Mix").await;
        let ghost = uuid::Uuid::new_v4();

        server
            .post(&format!("/api/v1/playlists/{playlist_id}/videos/{ghost}"))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let video: serde_json::Value = publish_test_video(&server, "Real").await.json();
        let video_id = video["data"]["id"].as_str().unwrap();
        server
            .post(&format!("/api/v1/playlists/{ghost}/videos/{video_id}"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn only_the_owner_manages_a_playlist(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_and_login(&server, "alice").await;
        let playlist_id = create_playlist(&server, "Private-ish").await;

        signup_and_login(&server, "mallory").await;
        server
            .patch(&format!("/api/v1/playlists/{playlist_id}"))
            .json(&json!({"title": "Hijacked"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .delete(&format!("/api/v1/playlists/{playlist_id}"))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // Anyone logged in can still view it.
        server
            .get(&format!("/api/v1/playlists/{playlist_id}"))
            .await
            .assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn user_playlists_lists_newest_first(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_and_login(&server, "alice").await;
        create_playlist(&server, "Older").await;
        create_playlist(&server, "Newer").await;

        let me: serde_json::Value = server.get("/api/v1/users/current-user").await.json();
        let user_id = me["data"]["id"].as_str().unwrap();

        let body: serde_json::Value = server.get(&format!("/api/v1/playlists/user/{user_id}")).await.json();
        let playlists = body["data"].as_array().unwrap();
        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0]["title"], "Newer");

        server
            .get(&format!("/api/v1/playlists/user/{}", uuid::Uuid::new_v4()))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
