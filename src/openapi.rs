//! OpenAPI document for the HTTP API.

use utoipa::OpenApi;

use crate::api::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "vidstream API",
        description = "Video sharing platform backend: accounts, videos, comments, likes, playlists, subscriptions and a channel dashboard.",
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::refresh_token,
        handlers::auth::change_password,
        handlers::users::current_user,
        handlers::users::update_account,
        handlers::users::update_avatar,
        handlers::users::update_cover_image,
        handlers::users::channel_profile,
        handlers::users::watch_history,
        handlers::videos::list_videos,
        handlers::videos::publish_video,
        handlers::videos::get_video,
        handlers::videos::update_video,
        handlers::videos::delete_video,
        handlers::videos::toggle_publish,
        handlers::comments::list_comments,
        handlers::comments::create_comment,
        handlers::comments::update_comment,
        handlers::comments::delete_comment,
        handlers::likes::toggle_video_like,
        handlers::likes::toggle_comment_like,
        handlers::likes::toggle_tweet_like,
        handlers::likes::liked_videos,
        handlers::playlists::create_playlist,
        handlers::playlists::user_playlists,
        handlers::playlists::get_playlist,
        handlers::playlists::update_playlist,
        handlers::playlists::delete_playlist,
        handlers::playlists::add_video_to_playlist,
        handlers::playlists::remove_video_from_playlist,
        handlers::subscriptions::toggle_subscription,
        handlers::subscriptions::channel_subscribers,
        handlers::subscriptions::subscribed_channels,
        handlers::dashboard::channel_stats,
        handlers::dashboard::channel_videos,
    ),
    tags(
        (name = "users", description = "Accounts, authentication and channel profiles"),
        (name = "videos", description = "Video publishing and playback"),
        (name = "comments", description = "Comments on videos"),
        (name = "likes", description = "Likes on videos, comments and tweets"),
        (name = "playlists", description = "User playlists"),
        (name = "subscriptions", description = "Channel subscriptions"),
        (name = "dashboard", description = "Channel owner dashboard"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builds_and_covers_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for prefix in ["/users", "/videos", "/comments", "/likes", "/playlists", "/subscriptions", "/dashboard"] {
            assert!(
                paths.iter().any(|p| p.starts_with(prefix)),
                "no documented path under {prefix}"
            );
        }
    }
}
