//! Account and channel profile endpoints.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use tracing::{info, instrument, warn};

use crate::{
    AppState,
    api::handlers::forms::collect_form,
    api::models::{
        ApiEnvelope,
        users::{ChannelProfileResponse, CurrentUser, UpdateAccountRequest, UserResponse},
        videos::VideoWithOwnerResponse,
    },
    db::{
        errors::DbError,
        handlers::{Users, Videos, repository::Repository},
        models::users::UserUpdateDBRequest,
    },
    errors::{Error, Result},
    media::MediaKind,
};

/// The account behind the presented access token.
#[utoipa::path(
    get,
    path = "/users/current-user",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn current_user(current_user: CurrentUser) -> Result<ApiEnvelope<UserResponse>> {
    Ok(ApiEnvelope::ok(current_user.into(), "Current user fetched successfully"))
}

/// Update full name and email.
#[utoipa::path(
    patch,
    path = "/users/update-account",
    tag = "users",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 400, description = "Blank fields"),
        (status = 409, description = "Email already in use"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn update_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<ApiEnvelope<UserResponse>> {
    if request.full_name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(Error::bad_request("Full name and email are required"));
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn)
        .update(
            current_user.id,
            &UserUpdateDBRequest {
                full_name: Some(request.full_name.trim().to_string()),
                email: Some(request.email.trim().to_string()),
                ..Default::default()
            },
        )
        .await?;

    Ok(ApiEnvelope::ok(user.into(), "Account details updated successfully"))
}

async fn update_image(
    state: &AppState,
    current_user: &CurrentUser,
    multipart: Multipart,
    field: &'static str,
    folder: &'static str,
) -> Result<UserResponse> {
    let file_limits = [(field, state.config.uploads.max_image_size as u64)];
    let mut form = collect_form(multipart, &file_limits, state.config.uploads.temp_dir.as_ref()).await?;
    let file = form.require_file(field)?;

    let asset = state
        .media
        .upload(file.path(), file.file_name(), MediaKind::Image, folder)
        .await?;

    let mut update = UserUpdateDBRequest::default();
    let old_url = match field {
        "avatar" => {
            update.avatar_url = Some(asset.url);
            Some(current_user.avatar_url.clone())
        }
        _ => {
            update.cover_image_url = Some(asset.url);
            current_user.cover_image_url.clone()
        }
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn).update(current_user.id, &update).await?;

    // Best effort: the new image is already live, a stale remote asset is
    // not worth failing the request over.
    if let Some(old_url) = old_url
        && let Err(e) = state.media.delete(&old_url, MediaKind::Image).await
    {
        warn!(user_id = %current_user.id, error = %e, "failed to delete previous {field} asset");
    }

    info!(user_id = %current_user.id, "updated {field}");
    Ok(user.into())
}

/// Replace the avatar image.
#[utoipa::path(
    patch,
    path = "/users/avatar",
    tag = "users",
    responses(
        (status = 200, description = "Avatar updated", body = UserResponse),
        (status = 400, description = "Missing avatar file"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn update_avatar(
    State(state): State<AppState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> Result<ApiEnvelope<UserResponse>> {
    let user = update_image(&state, &current_user, multipart, "avatar", "avatars").await?;
    Ok(ApiEnvelope::ok(user, "Avatar updated successfully"))
}

/// Replace the cover image.
#[utoipa::path(
    patch,
    path = "/users/cover-image",
    tag = "users",
    responses(
        (status = 200, description = "Cover image updated", body = UserResponse),
        (status = 400, description = "Missing cover image file"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn update_cover_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> Result<ApiEnvelope<UserResponse>> {
    let user = update_image(&state, &current_user, multipart, "cover_image", "covers").await?;
    Ok(ApiEnvelope::ok(user, "Cover image updated successfully"))
}

/// Public channel page for a username, including subscriber counts and
/// whether the viewer subscribes to it.
#[utoipa::path(
    get,
    path = "/users/c/{username}",
    tag = "users",
    params(("username" = String, Path, description = "Channel username")),
    responses(
        (status = 200, description = "Channel profile", body = ChannelProfileResponse),
        (status = 404, description = "No such channel"),
    )
)]
#[instrument(skip_all, fields(username = %username))]
pub async fn channel_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(username): Path<String>,
) -> Result<ApiEnvelope<ChannelProfileResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let profile = Users::new(&mut conn)
        .channel_profile(&username, current_user.id)
        .await?
        .ok_or_else(|| Error::not_found("Channel", &username))?;

    Ok(ApiEnvelope::ok(profile.into(), "Channel profile fetched successfully"))
}

/// The viewer's watch history, most recently watched first.
#[utoipa::path(
    get,
    path = "/users/history",
    tag = "users",
    responses(
        (status = 200, description = "Watch history", body = [VideoWithOwnerResponse]),
        (status = 401, description = "Not authenticated"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn watch_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<ApiEnvelope<Vec<VideoWithOwnerResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let videos = Videos::new(&mut conn).watch_history(current_user.id).await?;

    Ok(ApiEnvelope::ok(
        videos.into_iter().map(Into::into).collect(),
        "Watch history fetched successfully",
    ))
}
