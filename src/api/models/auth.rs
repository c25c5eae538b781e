use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::users::UserResponse;

/// Login accepts either a username or an email (or both; username wins).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Refresh token from the body, for clients that do not hold cookies.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Tokens are returned in the body as well as in cookies so that
/// non-browser clients can use the API without a cookie jar.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthData {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
