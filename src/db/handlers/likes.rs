//! Database access for likes.
//!
//! Likes are an existence toggle rather than a CRUD entity, so this module
//! does not implement the [`Repository`](super::repository::Repository) trait.

use crate::db::{errors::Result, models::likes::LikeTarget, models::videos::VideoDBResponse};
use crate::types::{UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Likes<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Likes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Whether the like target row exists at all.
    #[instrument(skip(self), err)]
    pub async fn target_exists(&mut self, target: &LikeTarget) -> Result<bool> {
        // Table name comes from a closed enum, never from user input.
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", target.table());
        let exists: (bool,) = sqlx::query_as(&sql).bind(target.id()).fetch_one(&mut *self.db).await?;
        Ok(exists.0)
    }

    /// Toggle a like: create it if absent, remove it if present.
    ///
    /// Returns true when the like now exists. Safe under concurrent toggles:
    /// the per-target unique constraint collapses duplicate inserts.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn toggle(&mut self, user_id: UserId, target: &LikeTarget) -> Result<bool> {
        let delete_sql = format!("DELETE FROM likes WHERE user_id = $1 AND {} = $2", target.column());
        let deleted = sqlx::query(&delete_sql)
            .bind(user_id)
            .bind(target.id())
            .execute(&mut *self.db)
            .await?;
        if deleted.rows_affected() > 0 {
            return Ok(false);
        }

        let insert_sql = format!(
            "INSERT INTO likes (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            target.column()
        );
        sqlx::query(&insert_sql)
            .bind(user_id)
            .bind(target.id())
            .execute(&mut *self.db)
            .await?;
        Ok(true)
    }

    /// Videos the user has liked, most recent like first.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn liked_videos(&mut self, user_id: UserId) -> Result<Vec<VideoDBResponse>> {
        let videos = sqlx::query_as::<_, VideoDBResponse>(
            r#"
            SELECT v.* FROM likes l
            JOIN videos v ON v.id = l.video_id
            WHERE l.user_id = $1 AND l.video_id IS NOT NULL
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(videos)
    }

    /// How many likes the user has handed out (any target).
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn likes_given(&mut self, user_id: UserId) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT count(*) FROM likes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count.0)
    }

    /// How many likes the channel's videos have received.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner_id)), err)]
    pub async fn likes_received_on_videos(&mut self, owner_id: UserId) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT count(*) FROM likes l JOIN videos v ON v.id = l.video_id WHERE v.owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_db_user, create_db_video};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn double_toggle_returns_to_absence(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        let fan = create_db_user(&pool, "fan").await;
        let video = create_db_video(&pool, owner.id, "Video").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut likes = Likes::new(&mut conn);

        let target = LikeTarget::Video(video.id);
        assert!(likes.toggle(fan.id, &target).await.unwrap());
        assert_eq!(likes.liked_videos(fan.id).await.unwrap().len(), 1);

        assert!(!likes.toggle(fan.id, &target).await.unwrap());
        assert!(likes.liked_videos(fan.id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn likes_are_per_user(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        let fan_a = create_db_user(&pool, "fan_a").await;
        let fan_b = create_db_user(&pool, "fan_b").await;
        let video = create_db_video(&pool, owner.id, "Video").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut likes = Likes::new(&mut conn);

        let target = LikeTarget::Video(video.id);
        likes.toggle(fan_a.id, &target).await.unwrap();
        likes.toggle(fan_b.id, &target).await.unwrap();

        assert_eq!(likes.likes_received_on_videos(owner.id).await.unwrap(), 2);
        assert_eq!(likes.likes_given(fan_a.id).await.unwrap(), 1);

        // Unliking by one fan leaves the other's like alone.
        likes.toggle(fan_a.id, &target).await.unwrap();
        assert_eq!(likes.likes_received_on_videos(owner.id).await.unwrap(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn target_existence_checks(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        let video = create_db_video(&pool, owner.id, "Video").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut likes = Likes::new(&mut conn);

        assert!(likes.target_exists(&LikeTarget::Video(video.id)).await.unwrap());
        assert!(!likes.target_exists(&LikeTarget::Video(uuid::Uuid::new_v4())).await.unwrap());
        assert!(!likes.target_exists(&LikeTarget::Comment(uuid::Uuid::new_v4())).await.unwrap());
        assert!(!likes.target_exists(&LikeTarget::Tweet(uuid::Uuid::new_v4())).await.unwrap());
    }
}
