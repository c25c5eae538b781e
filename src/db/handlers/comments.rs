//! Database repository for comments.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::comments::{CommentCreateDBRequest, CommentDBResponse, CommentUpdateDBRequest, CommentWithAuthorDBResponse},
};
use crate::types::{CommentId, VideoId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing a video's comments
#[derive(Debug, Clone)]
pub struct CommentFilter {
    pub video_id: VideoId,
    pub offset: i64,
    pub limit: i64,
}

pub struct Comments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Comments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Comments for a video with author fields, newest first.
    #[instrument(skip(self, filter), fields(video_id = %abbrev_uuid(&filter.video_id)), err)]
    pub async fn list_with_authors(&mut self, filter: &CommentFilter) -> Result<Vec<CommentWithAuthorDBResponse>> {
        let comments = sqlx::query_as::<_, CommentWithAuthorDBResponse>(
            r#"
            SELECT c.*, u.username AS owner_username, u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url
            FROM comments c JOIN users u ON u.id = c.owner_id
            WHERE c.video_id = $1
            ORDER BY c.created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(filter.video_id)
        .bind(filter.offset)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(comments)
    }

    #[instrument(skip(self), fields(video_id = %abbrev_uuid(&video_id)), err)]
    pub async fn count_for_video(&mut self, video_id: VideoId) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT count(*) FROM comments WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count.0)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Comments<'c> {
    type CreateRequest = CommentCreateDBRequest;
    type UpdateRequest = CommentUpdateDBRequest;
    type Response = CommentDBResponse;
    type Id = CommentId;
    type Filter = CommentFilter;

    #[instrument(skip(self, request), fields(video_id = %abbrev_uuid(&request.video_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let comment = sqlx::query_as::<_, CommentDBResponse>(
            "INSERT INTO comments (video_id, owner_id, content) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(request.video_id)
        .bind(request.owner_id)
        .bind(&request.content)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(comment)
    }

    #[instrument(skip(self), fields(comment_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let comment = sqlx::query_as::<_, CommentDBResponse>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(comment)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let comments = sqlx::query_as::<_, CommentDBResponse>(
            "SELECT * FROM comments WHERE video_id = $1 ORDER BY created_at DESC OFFSET $2 LIMIT $3",
        )
        .bind(filter.video_id)
        .bind(filter.offset)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(comments)
    }

    #[instrument(skip(self), fields(comment_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(comment_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let comment = sqlx::query_as::<_, CommentDBResponse>("UPDATE comments SET content = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(&request.content)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_db_user, create_db_video};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn comments_list_newest_first_with_authors(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        let commenter = create_db_user(&pool, "commenter").await;
        let video = create_db_video(&pool, owner.id, "Video").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut comments = Comments::new(&mut conn);

        for content in ["first", "second"] {
            comments
                .create(&CommentCreateDBRequest {
                    video_id: video.id,
                    owner_id: commenter.id,
                    content: content.to_string(),
                })
                .await
                .unwrap();
        }

        let filter = CommentFilter {
            video_id: video.id,
            offset: 0,
            limit: 10,
        };
        let listed = comments.list_with_authors(&filter).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].content, "second");
        assert_eq!(listed[0].owner_username, "commenter");
        assert_eq!(comments.count_for_video(video.id).await.unwrap(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn update_and_delete_comment(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;
        let video = create_db_video(&pool, owner.id, "Video").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut comments = Comments::new(&mut conn);

        let comment = comments
            .create(&CommentCreateDBRequest {
                video_id: video.id,
                owner_id: owner.id,
                content: "typo".to_string(),
            })
            .await
            .unwrap();

        let updated = comments
            .update(
                comment.id,
                &CommentUpdateDBRequest {
                    content: "fixed".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content, "fixed");

        assert!(comments.delete(comment.id).await.unwrap());
        assert!(!comments.delete(comment.id).await.unwrap());
        assert!(comments.get_by_id(comment.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn comment_on_missing_video_is_foreign_key_violation(pool: PgPool) {
        let owner = create_db_user(&pool, "owner").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut comments = Comments::new(&mut conn);

        let err = comments
            .create(&CommentCreateDBRequest {
                video_id: uuid::Uuid::new_v4(),
                owner_id: owner.id,
                content: "hello".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
