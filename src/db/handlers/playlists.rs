//! Database repository for playlists.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::playlists::{PlaylistCreateDBRequest, PlaylistDBResponse, PlaylistUpdateDBRequest},
    models::videos::VideoWithOwnerDBResponse,
};
use crate::types::{PlaylistId, UserId, VideoId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing a user's playlists
#[derive(Debug, Clone)]
pub struct PlaylistFilter {
    pub owner_id: UserId,
}

pub struct Playlists<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Playlists<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Add a video to a playlist. Returns false when it was already there.
    #[instrument(skip(self), fields(playlist_id = %abbrev_uuid(&playlist_id), video_id = %abbrev_uuid(&video_id)), err)]
    pub async fn add_video(&mut self, playlist_id: PlaylistId, video_id: VideoId) -> Result<bool> {
        let result = sqlx::query("INSERT INTO playlist_videos (playlist_id, video_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(playlist_id)
            .bind(video_id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a video from a playlist. Returns false when it was not there.
    #[instrument(skip(self), fields(playlist_id = %abbrev_uuid(&playlist_id), video_id = %abbrev_uuid(&video_id)), err)]
    pub async fn remove_video(&mut self, playlist_id: PlaylistId, video_id: VideoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
            .bind(playlist_id)
            .bind(video_id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Videos in a playlist with owner fields, in the order they were added.
    #[instrument(skip(self), fields(playlist_id = %abbrev_uuid(&playlist_id)), err)]
    pub async fn videos_in(&mut self, playlist_id: PlaylistId) -> Result<Vec<VideoWithOwnerDBResponse>> {
        let videos = sqlx::query_as::<_, VideoWithOwnerDBResponse>(
            r#"
            SELECT v.*, u.username AS owner_username, u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url
            FROM playlist_videos pv
            JOIN videos v ON v.id = pv.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE pv.playlist_id = $1
            ORDER BY pv.added_at ASC
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(videos)
    }

    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner_id)), err)]
    pub async fn count_for_owner(&mut self, owner_id: UserId) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT count(*) FROM playlists WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count.0)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Playlists<'c> {
    type CreateRequest = PlaylistCreateDBRequest;
    type UpdateRequest = PlaylistUpdateDBRequest;
    type Response = PlaylistDBResponse;
    type Id = PlaylistId;
    type Filter = PlaylistFilter;

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&request.owner_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let playlist = sqlx::query_as::<_, PlaylistDBResponse>(
            "INSERT INTO playlists (owner_id, title, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(request.owner_id)
        .bind(&request.title)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(playlist)
    }

    #[instrument(skip(self), fields(playlist_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let playlist = sqlx::query_as::<_, PlaylistDBResponse>("SELECT * FROM playlists WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(playlist)
    }

    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&filter.owner_id)), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let playlists = sqlx::query_as::<_, PlaylistDBResponse>(
            "SELECT * FROM playlists WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(filter.owner_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(playlists)
    }

    #[instrument(skip(self), fields(playlist_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(playlist_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let playlist = sqlx::query_as::<_, PlaylistDBResponse>(
            r#"
            UPDATE playlists
            SET title = COALESCE($2, title),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;
        Ok(playlist)
    }
}
