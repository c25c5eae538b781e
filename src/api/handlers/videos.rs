//! Video publishing, playback and management.

use axum::extract::{Multipart, Path, Query, State};
use tracing::{info, instrument};

use crate::{
    AppState,
    api::handlers::forms::collect_form,
    api::models::{
        ApiEnvelope, PaginatedResponse,
        users::CurrentUser,
        videos::{VideoListQuery, VideoResponse, VideoWithOwnerResponse},
    },
    db::{
        errors::DbError,
        handlers::{VideoFilter, Videos, repository::Repository},
        models::videos::{VideoCreateDBRequest, VideoDBResponse, VideoUpdateDBRequest},
    },
    errors::{Error, Result},
    media::MediaKind,
    types::VideoId,
};

/// Load a video and check the caller owns it.
async fn owned_video(videos: &mut Videos<'_>, id: VideoId, current_user: &CurrentUser) -> Result<VideoDBResponse> {
    let video = videos.get_by_id(id).await?.ok_or_else(|| Error::not_found("Video", id))?;
    if video.owner_id != current_user.id {
        return Err(Error::Forbidden {
            resource: "video".to_string(),
        });
    }
    Ok(video)
}

/// List the caller's own videos with title search, sorting and pagination.
#[utoipa::path(
    get,
    path = "/videos",
    tag = "videos",
    params(VideoListQuery),
    responses(
        (status = 200, description = "Page of the caller's videos"),
        (status = 401, description = "Not authenticated"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn list_videos(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<VideoListQuery>,
) -> Result<ApiEnvelope<PaginatedResponse<VideoResponse>>> {
    let pagination = query.pagination();
    let filter = VideoFilter {
        owner_id: current_user.id,
        query: query.query.clone(),
        sort_by: query.sort_key(),
        descending: query.descending(),
        offset: pagination.offset(),
        limit: pagination.limit(),
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut videos = Videos::new(&mut conn);
    let page = videos.list(&filter).await?;
    let total_count = videos.count(&filter).await?;

    Ok(ApiEnvelope::ok(
        PaginatedResponse::new(page.into_iter().map(Into::into).collect(), total_count, &pagination),
        "Videos fetched successfully",
    ))
}

/// Publish a new video.
///
/// Multipart form: `title` (required) and `description` text fields, plus a
/// `video_file` and a `thumbnail`. Both files upload to the media provider
/// concurrently; the video's duration comes from the provider's response.
#[utoipa::path(
    post,
    path = "/videos",
    tag = "videos",
    responses(
        (status = 201, description = "Video published", body = VideoResponse),
        (status = 400, description = "Missing title or files, or a file over the size cap"),
        (status = 500, description = "Media provider rejected an upload"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn publish_video(
    State(state): State<AppState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> Result<ApiEnvelope<VideoResponse>> {
    let file_limits = [
        ("video_file", state.config.uploads.max_video_size as u64),
        ("thumbnail", state.config.uploads.max_image_size as u64),
    ];
    let mut form = collect_form(multipart, &file_limits, state.config.uploads.temp_dir.as_ref()).await?;

    let title = form.require_text("title")?.trim().to_string();
    let description = form.text("description").unwrap_or_default().trim().to_string();
    let video_file = form.require_file("video_file")?;
    let thumbnail = form.require_file("thumbnail")?;

    let (video_asset, thumbnail_asset) = tokio::try_join!(
        state
            .media
            .upload(video_file.path(), video_file.file_name(), MediaKind::Video, "videos"),
        state
            .media
            .upload(thumbnail.path(), thumbnail.file_name(), MediaKind::Image, "thumbnails"),
    )?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let video = Videos::new(&mut conn)
        .create(&VideoCreateDBRequest {
            owner_id: current_user.id,
            title,
            description,
            video_url: video_asset.url,
            thumbnail_url: thumbnail_asset.url,
            duration: video_asset.duration.unwrap_or(0.0),
        })
        .await?;

    info!(video_id = %video.id, "published video");
    Ok(ApiEnvelope::created(video.into(), "Video published successfully"))
}

/// Fetch a video for playback.
///
/// Counts the view and records the watch in the caller's history.
#[utoipa::path(
    get,
    path = "/videos/{video_id}",
    tag = "videos",
    params(("video_id" = uuid::Uuid, Path, description = "Video to fetch")),
    responses(
        (status = 200, description = "Video with owner details", body = VideoWithOwnerResponse),
        (status = 404, description = "No such video"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn get_video(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(video_id): Path<VideoId>,
) -> Result<ApiEnvelope<VideoWithOwnerResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let video = Videos::new(&mut conn)
        .fetch_for_viewing(video_id, current_user.id)
        .await?
        .ok_or_else(|| Error::not_found("Video", video_id))?;

    Ok(ApiEnvelope::ok(video.into(), "Video fetched successfully"))
}

/// Update a video's title, description or thumbnail (owner only).
///
/// When a new thumbnail is uploaded the previous one is deleted from the
/// provider after the row is updated; a failed deletion fails the request.
#[utoipa::path(
    patch,
    path = "/videos/{video_id}",
    tag = "videos",
    params(("video_id" = uuid::Uuid, Path, description = "Video to update")),
    responses(
        (status = 200, description = "Updated video", body = VideoResponse),
        (status = 403, description = "Caller does not own the video"),
        (status = 404, description = "No such video"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn update_video(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(video_id): Path<VideoId>,
    multipart: Multipart,
) -> Result<ApiEnvelope<VideoResponse>> {
    let file_limits = [("thumbnail", state.config.uploads.max_image_size as u64)];
    let mut form = collect_form(multipart, &file_limits, state.config.uploads.temp_dir.as_ref()).await?;

    let title = form.text("title").map(|s| s.trim().to_string());
    let description = form.text("description").map(|s| s.trim().to_string());
    let thumbnail = form.take_file("thumbnail");

    if title.is_none() && description.is_none() && thumbnail.is_none() {
        return Err(Error::bad_request("Nothing to update"));
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut videos = Videos::new(&mut conn);
    let existing = owned_video(&mut videos, video_id, &current_user).await?;

    let thumbnail_url = match &thumbnail {
        Some(file) => Some(
            state
                .media
                .upload(file.path(), file.file_name(), MediaKind::Image, "thumbnails")
                .await?
                .url,
        ),
        None => None,
    };

    let updated = videos
        .update(
            video_id,
            &VideoUpdateDBRequest {
                title,
                description,
                thumbnail_url,
            },
        )
        .await?;

    if thumbnail.is_some() {
        state.media.delete(&existing.thumbnail_url, MediaKind::Image).await?;
    }

    Ok(ApiEnvelope::ok(updated.into(), "Video updated successfully"))
}

/// Delete a video (owner only).
///
/// Both remote assets are deleted first; if the provider fails, the record
/// is kept and the request fails so nothing dangles unreferenced.
#[utoipa::path(
    delete,
    path = "/videos/{video_id}",
    tag = "videos",
    params(("video_id" = uuid::Uuid, Path, description = "Video to delete")),
    responses(
        (status = 200, description = "Video deleted"),
        (status = 403, description = "Caller does not own the video"),
        (status = 404, description = "No such video"),
        (status = 500, description = "Media provider failed to delete an asset"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn delete_video(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(video_id): Path<VideoId>,
) -> Result<ApiEnvelope<()>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut videos = Videos::new(&mut conn);
    let video = owned_video(&mut videos, video_id, &current_user).await?;

    tokio::try_join!(
        state.media.delete(&video.video_url, MediaKind::Video),
        state.media.delete(&video.thumbnail_url, MediaKind::Image),
    )?;

    videos.delete(video_id).await?;

    info!(video_id = %video_id, "deleted video");
    Ok(ApiEnvelope::message_only("Video deleted successfully"))
}

/// Flip a video's published flag (owner only).
#[utoipa::path(
    patch,
    path = "/videos/toggle/publish/{video_id}",
    tag = "videos",
    params(("video_id" = uuid::Uuid, Path, description = "Video to toggle")),
    responses(
        (status = 200, description = "Video with flipped flag", body = VideoResponse),
        (status = 403, description = "Caller does not own the video"),
        (status = 404, description = "No such video"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn toggle_publish(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(video_id): Path<VideoId>,
) -> Result<ApiEnvelope<VideoResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut videos = Videos::new(&mut conn);
    owned_video(&mut videos, video_id, &current_user).await?;

    let video = videos.toggle_publish(video_id).await?;
    Ok(ApiEnvelope::ok(video.into(), "Publish status toggled successfully"))
}
