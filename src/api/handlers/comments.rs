//! Comment endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        ApiEnvelope, PaginatedResponse, Pagination,
        comments::{CommentResponse, CommentWithAuthorResponse, CreateCommentRequest, UpdateCommentRequest},
        users::CurrentUser,
    },
    db::{
        errors::DbError,
        handlers::{CommentFilter, Comments, Videos, repository::Repository},
        models::comments::{CommentCreateDBRequest, CommentDBResponse, CommentUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{CommentId, VideoId},
};

async fn owned_comment(comments: &mut Comments<'_>, id: CommentId, current_user: &CurrentUser) -> Result<CommentDBResponse> {
    let comment = comments
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Comment", id))?;
    if comment.owner_id != current_user.id {
        return Err(Error::Forbidden {
            resource: "comment".to_string(),
        });
    }
    Ok(comment)
}

/// Paginated comments for a video, newest first.
#[utoipa::path(
    get,
    path = "/comments/{video_id}",
    tag = "comments",
    params(("video_id" = uuid::Uuid, Path, description = "Video whose comments to list"), Pagination),
    responses(
        (status = 200, description = "Page of comments"),
        (status = 404, description = "No such video"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn list_comments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(video_id): Path<VideoId>,
    Query(pagination): Query<Pagination>,
) -> Result<ApiEnvelope<PaginatedResponse<CommentWithAuthorResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    Videos::new(&mut conn)
        .get_by_id(video_id)
        .await?
        .ok_or_else(|| Error::not_found("Video", video_id))?;

    let mut comments = Comments::new(&mut conn);
    let filter = CommentFilter {
        video_id,
        offset: pagination.offset(),
        limit: pagination.limit(),
    };
    let page = comments.list_with_authors(&filter).await?;
    let total_count = comments.count_for_video(video_id).await?;

    Ok(ApiEnvelope::ok(
        PaginatedResponse::new(page.into_iter().map(Into::into).collect(), total_count, &pagination),
        "Comments fetched successfully",
    ))
}

/// Add a comment to a video.
#[utoipa::path(
    post,
    path = "/comments/{video_id}",
    tag = "comments",
    params(("video_id" = uuid::Uuid, Path, description = "Video to comment on")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Blank content"),
        (status = 404, description = "No such video"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn create_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(video_id): Path<VideoId>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<ApiEnvelope<CommentResponse>> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(Error::bad_request("Comment content is required"));
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    Videos::new(&mut conn)
        .get_by_id(video_id)
        .await?
        .ok_or_else(|| Error::not_found("Video", video_id))?;

    let comment = Comments::new(&mut conn)
        .create(&CommentCreateDBRequest {
            video_id,
            owner_id: current_user.id,
            content: content.to_string(),
        })
        .await?;

    Ok(ApiEnvelope::created(comment.into(), "Comment added successfully"))
}

/// Edit a comment's content (author only).
#[utoipa::path(
    patch,
    path = "/comments/c/{comment_id}",
    tag = "comments",
    params(("comment_id" = uuid::Uuid, Path, description = "Comment to edit")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated comment", body = CommentResponse),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "No such comment"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn update_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(comment_id): Path<CommentId>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<ApiEnvelope<CommentResponse>> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(Error::bad_request("Comment content is required"));
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut comments = Comments::new(&mut conn);
    owned_comment(&mut comments, comment_id, &current_user).await?;

    let comment = comments
        .update(
            comment_id,
            &CommentUpdateDBRequest {
                content: content.to_string(),
            },
        )
        .await?;

    Ok(ApiEnvelope::ok(comment.into(), "Comment updated successfully"))
}

/// Delete a comment (author only).
#[utoipa::path(
    delete,
    path = "/comments/c/{comment_id}",
    tag = "comments",
    params(("comment_id" = uuid::Uuid, Path, description = "Comment to delete")),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "No such comment"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(comment_id): Path<CommentId>,
) -> Result<ApiEnvelope<()>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut comments = Comments::new(&mut conn);
    owned_comment(&mut comments, comment_id, &current_user).await?;

    comments.delete(comment_id).await?;
    Ok(ApiEnvelope::message_only("Comment deleted successfully"))
}
