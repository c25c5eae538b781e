//! The HTTP surface: routes, handlers and wire models.

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::AppState;

pub mod handlers;
pub mod models;

/// All API routes, to be nested under the version prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        // users & auth
        .route("/users/register", post(handlers::auth::register))
        .route("/users/login", post(handlers::auth::login))
        .route("/users/logout", post(handlers::auth::logout))
        .route("/users/refresh-token", post(handlers::auth::refresh_token))
        .route("/users/change-password", post(handlers::auth::change_password))
        .route("/users/current-user", get(handlers::users::current_user))
        .route("/users/update-account", patch(handlers::users::update_account))
        .route("/users/avatar", patch(handlers::users::update_avatar))
        .route("/users/cover-image", patch(handlers::users::update_cover_image))
        .route("/users/c/{username}", get(handlers::users::channel_profile))
        .route("/users/history", get(handlers::users::watch_history))
        // videos
        .route("/videos", get(handlers::videos::list_videos).post(handlers::videos::publish_video))
        .route(
            "/videos/{video_id}",
            get(handlers::videos::get_video)
                .patch(handlers::videos::update_video)
                .delete(handlers::videos::delete_video),
        )
        .route("/videos/toggle/publish/{video_id}", patch(handlers::videos::toggle_publish))
        // comments
        .route(
            "/comments/{video_id}",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        .route(
            "/comments/c/{comment_id}",
            patch(handlers::comments::update_comment).delete(handlers::comments::delete_comment),
        )
        // likes
        .route("/likes/toggle/v/{video_id}", post(handlers::likes::toggle_video_like))
        .route("/likes/toggle/c/{comment_id}", post(handlers::likes::toggle_comment_like))
        .route("/likes/toggle/t/{tweet_id}", post(handlers::likes::toggle_tweet_like))
        .route("/likes/videos", get(handlers::likes::liked_videos))
        // playlists
        .route("/playlists", post(handlers::playlists::create_playlist))
        .route("/playlists/user/{user_id}", get(handlers::playlists::user_playlists))
        .route(
            "/playlists/{playlist_id}",
            get(handlers::playlists::get_playlist)
                .patch(handlers::playlists::update_playlist)
                .delete(handlers::playlists::delete_playlist),
        )
        .route(
            "/playlists/{playlist_id}/videos/{video_id}",
            post(handlers::playlists::add_video_to_playlist).delete(handlers::playlists::remove_video_from_playlist),
        )
        // subscriptions
        .route("/subscriptions/c/{channel_id}", post(handlers::subscriptions::toggle_subscription))
        .route(
            "/subscriptions/c/{channel_id}/subscribers",
            get(handlers::subscriptions::channel_subscribers),
        )
        .route("/subscriptions/u/{subscriber_id}", get(handlers::subscriptions::subscribed_channels))
        // dashboard
        .route("/dashboard/stats", get(handlers::dashboard::channel_stats))
        .route("/dashboard/videos", get(handlers::dashboard::channel_videos))
}
