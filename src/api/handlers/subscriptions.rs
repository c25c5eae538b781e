//! Channel subscription endpoints.

use axum::extract::{Path, State};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        ApiEnvelope,
        subscriptions::{SubscriptionUserResponse, ToggleResponse},
        users::CurrentUser,
    },
    db::{
        errors::DbError,
        handlers::{Subscriptions, Users, repository::Repository},
    },
    errors::{Error, Result},
    types::UserId,
};

/// Toggle the caller's subscription to a channel.
#[utoipa::path(
    post,
    path = "/subscriptions/c/{channel_id}",
    tag = "subscriptions",
    params(("channel_id" = uuid::Uuid, Path, description = "Channel to subscribe to or unsubscribe from")),
    responses(
        (status = 200, description = "Subscription state after the toggle", body = ToggleResponse),
        (status = 400, description = "Attempt to subscribe to one's own channel"),
        (status = 404, description = "No such channel"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id, channel = %channel_id))]
pub async fn toggle_subscription(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(channel_id): Path<UserId>,
) -> Result<ApiEnvelope<ToggleResponse>> {
    if channel_id == current_user.id {
        return Err(Error::bad_request("You cannot subscribe to your own channel"));
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    Users::new(&mut conn)
        .get_by_id(channel_id)
        .await?
        .ok_or_else(|| Error::not_found("Channel", channel_id))?;

    let subscribed = Subscriptions::new(&mut conn).toggle(current_user.id, channel_id).await?;
    let message = if subscribed { "Subscribed successfully" } else { "Unsubscribed successfully" };
    Ok(ApiEnvelope::ok(ToggleResponse { subscribed }, message))
}

/// Users subscribed to a channel.
#[utoipa::path(
    get,
    path = "/subscriptions/c/{channel_id}/subscribers",
    tag = "subscriptions",
    params(("channel_id" = uuid::Uuid, Path, description = "Channel whose subscribers to list")),
    responses(
        (status = 200, description = "Subscribers", body = [SubscriptionUserResponse]),
        (status = 404, description = "No such channel"),
    )
)]
#[instrument(skip_all, fields(channel = %channel_id))]
pub async fn channel_subscribers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(channel_id): Path<UserId>,
) -> Result<ApiEnvelope<Vec<SubscriptionUserResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    Users::new(&mut conn)
        .get_by_id(channel_id)
        .await?
        .ok_or_else(|| Error::not_found("Channel", channel_id))?;

    let subscribers = Subscriptions::new(&mut conn).subscribers_of(channel_id).await?;
    Ok(ApiEnvelope::ok(
        subscribers.into_iter().map(Into::into).collect(),
        "Subscribers fetched successfully",
    ))
}

/// Channels a user is subscribed to.
#[utoipa::path(
    get,
    path = "/subscriptions/u/{subscriber_id}",
    tag = "subscriptions",
    params(("subscriber_id" = uuid::Uuid, Path, description = "User whose subscriptions to list")),
    responses(
        (status = 200, description = "Subscribed channels", body = [SubscriptionUserResponse]),
        (status = 404, description = "No such user"),
    )
)]
#[instrument(skip_all, fields(subscriber = %subscriber_id))]
pub async fn subscribed_channels(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(subscriber_id): Path<UserId>,
) -> Result<ApiEnvelope<Vec<SubscriptionUserResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    Users::new(&mut conn)
        .get_by_id(subscriber_id)
        .await?
        .ok_or_else(|| Error::not_found("User", subscriber_id))?;

    let channels = Subscriptions::new(&mut conn).channels_of(subscriber_id).await?;
    Ok(ApiEnvelope::ok(
        channels.into_iter().map(Into::into).collect(),
        "Subscribed channels fetched successfully",
    ))
}
