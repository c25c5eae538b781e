//! Database access for channel subscriptions.
//!
//! Subscriptions are an existence toggle like likes, so this module does not
//! implement the [`Repository`](super::repository::Repository) trait.

use crate::db::{errors::Result, models::subscriptions::SubscriptionUserDBResponse};
use crate::types::{UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Subscriptions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Subscriptions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Toggle a subscription edge. Returns true when the caller is now subscribed.
    #[instrument(skip(self), fields(subscriber = %abbrev_uuid(&subscriber_id), channel = %abbrev_uuid(&channel_id)), err)]
    pub async fn toggle(&mut self, subscriber_id: UserId, channel_id: UserId) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
            .bind(subscriber_id)
            .bind(channel_id)
            .execute(&mut *self.db)
            .await?;
        if deleted.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query("INSERT INTO subscriptions (subscriber_id, channel_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(subscriber_id)
            .bind(channel_id)
            .execute(&mut *self.db)
            .await?;
        Ok(true)
    }

    /// Users subscribed to a channel, newest subscription first.
    #[instrument(skip(self), fields(channel = %abbrev_uuid(&channel_id)), err)]
    pub async fn subscribers_of(&mut self, channel_id: UserId) -> Result<Vec<SubscriptionUserDBResponse>> {
        let subscribers = sqlx::query_as::<_, SubscriptionUserDBResponse>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar_url, s.created_at AS subscribed_at
            FROM subscriptions s JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(channel_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(subscribers)
    }

    /// Channels a user subscribes to, newest subscription first.
    #[instrument(skip(self), fields(subscriber = %abbrev_uuid(&subscriber_id)), err)]
    pub async fn channels_of(&mut self, subscriber_id: UserId) -> Result<Vec<SubscriptionUserDBResponse>> {
        let channels = sqlx::query_as::<_, SubscriptionUserDBResponse>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar_url, s.created_at AS subscribed_at
            FROM subscriptions s JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(channels)
    }

    #[instrument(skip(self), fields(channel = %abbrev_uuid(&channel_id)), err)]
    pub async fn subscriber_count(&mut self, channel_id: UserId) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT count(*) FROM subscriptions WHERE channel_id = $1")
            .bind(channel_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_db_user;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn toggle_subscribes_and_unsubscribes(pool: PgPool) {
        let channel = create_db_user(&pool, "channel").await;
        let fan = create_db_user(&pool, "fan").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut subs = Subscriptions::new(&mut conn);

        assert!(subs.toggle(fan.id, channel.id).await.unwrap());
        assert_eq!(subs.subscriber_count(channel.id).await.unwrap(), 1);

        let subscribers = subs.subscribers_of(channel.id).await.unwrap();
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].username, "fan");

        let channels = subs.channels_of(fan.id).await.unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].username, "channel");

        assert!(!subs.toggle(fan.id, channel.id).await.unwrap());
        assert_eq!(subs.subscriber_count(channel.id).await.unwrap(), 0);
    }
}
