//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod forms;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod users;
pub mod videos;
