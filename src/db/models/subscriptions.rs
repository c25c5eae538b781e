//! Database models for channel subscriptions.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A user on either side of a subscription edge, with the edge timestamp.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionUserDBResponse {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
    pub subscribed_at: DateTime<Utc>,
}
