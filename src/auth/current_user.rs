use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{cookies::ACCESS_TOKEN_COOKIE, tokens},
    db::handlers::{Repository, Users},
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract an access token from the token cookie if present.
/// Returns:
/// - None: No access-token cookie present
/// - Some(token): Cookie found (verification happens later)
fn try_cookie_token(parts: &Parts) -> Option<String> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=')
            && name == ACCESS_TOKEN_COOKIE
            && !value.is_empty()
        {
            return Some(value.to_string());
        }
    }
    None
}

/// Extract an access token from an `Authorization: Bearer` header if present.
fn try_bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(axum::http::header::AUTHORIZATION)?;
    let value = header.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|t| t.trim().to_string())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Cookie first (browser clients), then Bearer header (API clients).
        let token = match try_cookie_token(parts).or_else(|| try_bearer_token(parts)) {
            Some(token) => token,
            None => {
                trace!("No access token presented");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        let claims = tokens::verify_access_token(&token, &state.config)?;

        // Load the user row so tokens for deleted accounts stop working
        // immediately, and profile fields are always current.
        let mut conn = state.db.acquire().await.map_err(crate::db::errors::DbError::from)?;
        let mut users = Users::new(&mut conn);
        let user = users.get_by_id(claims.sub).await?.ok_or(Error::Unauthenticated {
            message: Some("Invalid access token".to_string()),
        })?;

        debug!("Authenticated user {}", user.id);
        Ok(CurrentUser::from(user))
    }
}
