//! Authentication system.
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`tokens`]: dual JWT scheme (short-lived access token, long-lived refresh
//!   token with its own secret; the honored refresh token is persisted per user)
//! - [`cookies`]: HttpOnly cookie construction for both tokens
//! - [`current_user`]: axum extractor resolving the caller from the access
//!   token cookie or an `Authorization: Bearer` header
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use vidstream::api::models::users::CurrentUser;
//!
//! async fn protected_handler(user: CurrentUser) -> String {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

pub mod cookies;
pub mod current_user;
pub mod password;
pub mod tokens;
