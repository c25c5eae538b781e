use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::subscriptions::SubscriptionUserDBResponse;
use crate::types::UserId;

/// A user on either side of a subscription edge.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionUserResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
    pub subscribed_at: DateTime<Utc>,
}

impl From<SubscriptionUserDBResponse> for SubscriptionUserResponse {
    fn from(user: SubscriptionUserDBResponse) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            subscribed_at: user.subscribed_at,
        }
    }
}

/// Result of a subscribe/unsubscribe toggle.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToggleResponse {
    /// Whether the relation exists after the toggle.
    pub subscribed: bool,
}
