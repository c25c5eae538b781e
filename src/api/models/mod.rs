//! Wire-facing request/response types.
//!
//! Database models live in [`crate::db::models`]; the types here are the
//! JSON shapes clients see, converted via `From` impls so handlers never
//! serialize a database row directly.

pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod envelope;
pub mod likes;
pub mod pagination;
pub mod playlists;
pub mod subscriptions;
pub mod users;
pub mod videos;

pub use envelope::{ApiEnvelope, WithCookies};
pub use pagination::{PaginatedResponse, Pagination};
