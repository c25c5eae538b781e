//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction and provides
//! strongly-typed operations for one entity. CRUD-shaped entities implement
//! the [`Repository`] trait; membership-toggle entities (likes, subscriptions)
//! expose bespoke methods instead.

pub mod comments;
pub mod likes;
pub mod playlists;
pub mod repository;
pub mod subscriptions;
pub mod users;
pub mod videos;

pub use comments::{CommentFilter, Comments};
pub use likes::Likes;
pub use playlists::{PlaylistFilter, Playlists};
pub use repository::Repository;
pub use subscriptions::Subscriptions;
pub use users::Users;
pub use videos::{VideoFilter, Videos};
