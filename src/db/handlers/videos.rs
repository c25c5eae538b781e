//! Database repository for videos.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::videos::{
        VideoCreateDBRequest, VideoDBResponse, VideoOwnerStatsDBResponse, VideoUpdateDBRequest, VideoWithOwnerDBResponse,
    },
};
use crate::types::{UserId, VideoId, abbrev_uuid};
use sqlx::{Connection, PgConnection};
use tracing::instrument;

/// Columns the video listing can be ordered by.
///
/// Closed set so the dynamic ORDER BY clause can never carry user input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VideoSortKey {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl VideoSortKey {
    fn column(&self) -> &'static str {
        match self {
            VideoSortKey::CreatedAt => "created_at",
            VideoSortKey::Views => "views",
            VideoSortKey::Duration => "duration",
            VideoSortKey::Title => "title",
        }
    }
}

/// Filter for listing a channel's videos
#[derive(Debug, Clone)]
pub struct VideoFilter {
    pub owner_id: UserId,
    /// Case-insensitive title substring
    pub query: Option<String>,
    pub sort_by: VideoSortKey,
    pub descending: bool,
    pub offset: i64,
    pub limit: i64,
}

pub struct Videos<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Videos<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Total rows the filter would match, ignoring pagination.
    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&filter.owner_id)), err)]
    pub async fn count(&mut self, filter: &VideoFilter) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT count(*) FROM videos WHERE owner_id = $1 AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')",
        )
        .bind(filter.owner_id)
        .bind(&filter.query)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(count.0)
    }

    /// Fetch a video for watching: bumps the view counter and records the
    /// viewer's watch history in one transaction.
    #[instrument(skip(self), fields(video_id = %abbrev_uuid(&id), viewer = %abbrev_uuid(&viewer_id)), err)]
    pub async fn fetch_for_viewing(&mut self, id: VideoId, viewer_id: UserId) -> Result<Option<VideoWithOwnerDBResponse>> {
        let mut tx = self.db.begin().await?;

        let updated = sqlx::query("UPDATE videos SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, video_id) VALUES ($1, $2)
            ON CONFLICT (user_id, video_id) DO UPDATE SET watched_at = now()
            "#,
        )
        .bind(viewer_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let video = sqlx::query_as::<_, VideoWithOwnerDBResponse>(
            r#"
            SELECT v.*, u.username AS owner_username, u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url
            FROM videos v JOIN users u ON u.id = v.owner_id
            WHERE v.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(video))
    }

    /// Flip the published flag, returning the updated row.
    #[instrument(skip(self), fields(video_id = %abbrev_uuid(&id)), err)]
    pub async fn toggle_publish(&mut self, id: VideoId) -> Result<VideoDBResponse> {
        let video = sqlx::query_as::<_, VideoDBResponse>("UPDATE videos SET is_published = NOT is_published WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;
        Ok(video)
    }

    /// All of a channel's videos, newest first (dashboard view).
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner_id)), err)]
    pub async fn list_all_for_owner(&mut self, owner_id: UserId) -> Result<Vec<VideoDBResponse>> {
        let videos = sqlx::query_as::<_, VideoDBResponse>("SELECT * FROM videos WHERE owner_id = $1 ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(videos)
    }

    /// Video + view aggregates for the dashboard.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner_id)), err)]
    pub async fn owner_stats(&mut self, owner_id: UserId) -> Result<VideoOwnerStatsDBResponse> {
        let stats = sqlx::query_as::<_, VideoOwnerStatsDBResponse>(
            "SELECT count(*) AS total_videos, COALESCE(sum(views), 0)::bigint AS total_views FROM videos WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(stats)
    }

    /// A user's watch history, most recently watched first.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn watch_history(&mut self, user_id: UserId) -> Result<Vec<VideoWithOwnerDBResponse>> {
        let videos = sqlx::query_as::<_, VideoWithOwnerDBResponse>(
            r#"
            SELECT v.*, u.username AS owner_username, u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url
            FROM watch_history w
            JOIN videos v ON v.id = w.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE w.user_id = $1
            ORDER BY w.watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(videos)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Videos<'c> {
    type CreateRequest = VideoCreateDBRequest;
    type UpdateRequest = VideoUpdateDBRequest;
    type Response = VideoDBResponse;
    type Id = VideoId;
    type Filter = VideoFilter;

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&request.owner_id), title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let video = sqlx::query_as::<_, VideoDBResponse>(
            r#"
            INSERT INTO videos (owner_id, title, description, video_url, thumbnail_url, duration)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.owner_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.video_url)
        .bind(&request.thumbnail_url)
        .bind(request.duration)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(video)
    }

    #[instrument(skip(self), fields(video_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let video = sqlx::query_as::<_, VideoDBResponse>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(video)
    }

    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&filter.owner_id)), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // Sort column comes from a closed enum, never from user input.
        let order = if filter.descending { "DESC" } else { "ASC" };
        let sql = format!(
            r#"
            SELECT * FROM videos
            WHERE owner_id = $1 AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')
            ORDER BY {} {}
            OFFSET $3 LIMIT $4
            "#,
            filter.sort_by.column(),
            order
        );

        let videos = sqlx::query_as::<_, VideoDBResponse>(&sql)
            .bind(filter.owner_id)
            .bind(&filter.query)
            .bind(filter.offset)
            .bind(filter.limit)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(videos)
    }

    #[instrument(skip(self), fields(video_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(video_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let video = sqlx::query_as::<_, VideoDBResponse>(
            r#"
            UPDATE videos
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail_url = COALESCE($4, thumbnail_url)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.thumbnail_url)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_db_user, create_db_video};
    use sqlx::PgPool;

    fn filter_for(owner_id: UserId) -> VideoFilter {
        VideoFilter {
            owner_id,
            query: None,
            sort_by: VideoSortKey::CreatedAt,
            descending: true,
            offset: 0,
            limit: 10,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn create_list_and_filter_by_title(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        create_db_video(&pool, owner.id, "Rust for beginners").await;
        create_db_video(&pool, owner.id, "Advanced Rust").await;
        create_db_video(&pool, owner.id, "Cooking pasta").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut videos = Videos::new(&mut conn);

        let all = videos.list(&filter_for(owner.id)).await.unwrap();
        assert_eq!(all.len(), 3);

        let mut filter = filter_for(owner.id);
        filter.query = Some("rust".to_string());
        let rust_videos = videos.list(&filter).await.unwrap();
        assert_eq!(rust_videos.len(), 2);
        assert_eq!(videos.count(&filter).await.unwrap(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn listing_is_scoped_to_owner(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        let other = create_db_user(&pool, "other").await;
        create_db_video(&pool, owner.id, "Mine").await;
        create_db_video(&pool, other.id, "Theirs").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut videos = Videos::new(&mut conn);

        let mine = videos.list(&filter_for(owner.id)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Mine");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn sort_by_title_ascending(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        create_db_video(&pool, owner.id, "Bravo").await;
        create_db_video(&pool, owner.id, "Alpha").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut videos = Videos::new(&mut conn);

        let mut filter = filter_for(owner.id);
        filter.sort_by = VideoSortKey::Title;
        filter.descending = false;
        let sorted = videos.list(&filter).await.unwrap();
        assert_eq!(sorted[0].title, "Alpha");
        assert_eq!(sorted[1].title, "Bravo");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn viewing_bumps_views_and_records_history(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        let viewer = create_db_user(&pool, "viewer").await;
        let video = create_db_video(&pool, owner.id, "Watch me").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut videos = Videos::new(&mut conn);

        let watched = videos.fetch_for_viewing(video.id, viewer.id).await.unwrap().unwrap();
        assert_eq!(watched.views, 1);
        assert_eq!(watched.owner_username, "owner");

        // Watching again bumps views but keeps a single history row.
        videos.fetch_for_viewing(video.id, viewer.id).await.unwrap().unwrap();
        let history = videos.watch_history(viewer.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].views, 2);

        assert!(videos.fetch_for_viewing(uuid::Uuid::new_v4(), viewer.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn toggle_publish_flips_flag(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        let video = create_db_video(&pool, owner.id, "Toggle me").await;
        assert!(video.is_published);

        let mut conn = pool.acquire().await.unwrap();
        let mut videos = Videos::new(&mut conn);

        let toggled = videos.toggle_publish(video.id).await.unwrap();
        assert!(!toggled.is_published);
        let toggled = videos.toggle_publish(video.id).await.unwrap();
        assert!(toggled.is_published);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn owner_stats_aggregate_views(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        let viewer = create_db_user(&pool, "viewer").await;
        let a = create_db_video(&pool, owner.id, "A").await;
        let b = create_db_video(&pool, owner.id, "B").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut videos = Videos::new(&mut conn);
        videos.fetch_for_viewing(a.id, viewer.id).await.unwrap();
        videos.fetch_for_viewing(b.id, viewer.id).await.unwrap();
        videos.fetch_for_viewing(b.id, owner.id).await.unwrap();

        let stats = videos.owner_stats(owner.id).await.unwrap();
        assert_eq!(stats.total_videos, 2);
        assert_eq!(stats.total_views, 3);
    }
}
