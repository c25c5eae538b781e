//! Registration, login, token refresh and password management.

use axum::{
    Json,
    extract::{Multipart, State},
    http::HeaderMap,
};
use tracing::{info, instrument};

use crate::{
    AppState,
    api::handlers::forms::collect_form,
    api::models::{
        ApiEnvelope, WithCookies,
        auth::{AuthData, LoginRequest, RefreshRequest, TokenPair},
        users::{ChangePasswordRequest, CurrentUser, UserResponse},
    },
    auth::{
        cookies::{self, REFRESH_TOKEN_COOKIE},
        password::{self, Argon2Params},
        tokens,
    },
    config::PasswordConfig,
    db::{errors::DbError, handlers::Users, handlers::repository::Repository, models::users::UserCreateDBRequest},
    errors::{Error, Result},
    media::MediaKind,
};

fn validate_password(password: &str, config: &PasswordConfig) -> Result<()> {
    if password.len() < config.min_length {
        return Err(Error::bad_request(format!(
            "Password must be at least {} characters long",
            config.min_length
        )));
    }
    if password.len() > config.max_length {
        return Err(Error::bad_request(format!(
            "Password must be at most {} characters long",
            config.max_length
        )));
    }
    Ok(())
}

/// Argon2 hashing is CPU-bound, so it runs off the async runtime.
async fn hash_password(password: String, params: Argon2Params) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password hashing task: {e}"),
        })?
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password verification task: {e}"),
        })?
}

fn refresh_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_str = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for cookie in cookie_str.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=')
            && name == REFRESH_TOKEN_COOKIE
            && !value.is_empty()
        {
            return Some(value.to_string());
        }
    }
    None
}

/// Register a new account.
///
/// Multipart form: `username`, `email`, `full_name`, `password` text fields,
/// a required `avatar` image and an optional `cover_image`. All field
/// validation happens before anything is sent to the media provider, so a
/// rejected registration leaves no uploaded assets behind.
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "users",
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Username or email already taken"),
    )
)]
#[instrument(skip_all)]
pub async fn register(State(state): State<AppState>, multipart: Multipart) -> Result<ApiEnvelope<UserResponse>> {
    let file_limits = [
        ("avatar", state.config.uploads.max_image_size as u64),
        ("cover_image", state.config.uploads.max_image_size as u64),
    ];
    let mut form = collect_form(multipart, &file_limits, state.config.uploads.temp_dir.as_ref()).await?;

    let username = form.require_text("username")?.trim().to_lowercase();
    let email = form.require_text("email")?.trim().to_string();
    let full_name = form.require_text("full_name")?.trim().to_string();
    let password = form.require_text("password")?.to_string();

    if !email.contains('@') {
        return Err(Error::bad_request("Invalid email address"));
    }
    validate_password(&password, &state.config.auth.password)?;

    let avatar = form.require_file("avatar")?;
    let cover = form.take_file("cover_image");

    let password_hash = hash_password(password, Argon2Params::from(&state.config.auth.password)).await?;

    let avatar_asset = state
        .media
        .upload(avatar.path(), avatar.file_name(), MediaKind::Image, "avatars")
        .await?;
    let cover_image_url = match &cover {
        Some(file) => Some(
            state
                .media
                .upload(file.path(), file.file_name(), MediaKind::Image, "covers")
                .await?
                .url,
        ),
        None => None,
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut conn);
    let user = users
        .create(&UserCreateDBRequest {
            username,
            email,
            full_name,
            avatar_url: avatar_asset.url,
            cover_image_url,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "registered new user");
    Ok(ApiEnvelope::created(user.into(), "User registered successfully"))
}

/// Log in with username or email plus password.
///
/// Sets the token cookies and also returns both tokens in the body for
/// clients without a cookie jar.
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthData),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "No such user"),
    )
)]
#[instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<WithCookies<AuthData>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut conn);

    let user = match (&request.username, &request.email) {
        (Some(username), _) => users.get_by_username(username).await?,
        (None, Some(email)) => users.get_by_email(email).await?,
        (None, None) => return Err(Error::bad_request("Username or email is required")),
    };
    let identifier = request.username.or(request.email).unwrap_or_default();
    let user = user.ok_or_else(|| Error::not_found("User", &identifier))?;

    if !verify_password(request.password, user.password_hash.clone()).await? {
        return Err(Error::Unauthenticated {
            message: Some("Invalid user credentials".to_string()),
        });
    }

    let access_token = tokens::create_access_token(user.id, &user.username, &user.email, &state.config)?;
    let refresh_token = tokens::create_refresh_token(user.id, &state.config)?;
    users.set_refresh_token(user.id, Some(&refresh_token)).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(WithCookies {
        cookies: vec![
            cookies::access_token_cookie(&access_token, &state.config),
            cookies::refresh_token_cookie(&refresh_token, &state.config),
        ],
        envelope: ApiEnvelope::ok(
            AuthData {
                user: user.into(),
                access_token,
                refresh_token,
            },
            "User logged in successfully",
        ),
    })
}

/// Log out: invalidate the stored refresh token and clear both cookies.
#[utoipa::path(
    post,
    path = "/users/logout",
    tag = "users",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Not authenticated"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn logout(State(state): State<AppState>, current_user: CurrentUser) -> Result<WithCookies<()>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    Users::new(&mut conn).set_refresh_token(current_user.id, None).await?;

    Ok(WithCookies {
        cookies: cookies::clearing_cookies(&state.config).to_vec(),
        envelope: ApiEnvelope::message_only("User logged out successfully"),
    })
}

/// Exchange a refresh token for a fresh token pair.
///
/// The token is taken from the refresh cookie, falling back to the request
/// body. Rotation: the presented token must match the one stored for the
/// user, and a new refresh token replaces it.
#[utoipa::path(
    post,
    path = "/users/refresh-token",
    tag = "users",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Missing, invalid or already-used refresh token"),
    )
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<WithCookies<TokenPair>> {
    let presented = refresh_token_from_headers(&headers)
        .or_else(|| body.and_then(|Json(b)| b.refresh_token))
        .ok_or(Error::Unauthenticated {
            message: Some("Refresh token is required".to_string()),
        })?;

    let claims = tokens::verify_refresh_token(&presented, &state.config)?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut conn);
    let user = users.get_by_id(claims.sub).await?.ok_or(Error::Unauthenticated {
        message: Some("Invalid refresh token".to_string()),
    })?;

    if user.refresh_token.as_deref() != Some(presented.as_str()) {
        return Err(Error::Unauthenticated {
            message: Some("Refresh token is expired or used".to_string()),
        });
    }

    let access_token = tokens::create_access_token(user.id, &user.username, &user.email, &state.config)?;
    let new_refresh_token = tokens::create_refresh_token(user.id, &state.config)?;
    users.set_refresh_token(user.id, Some(&new_refresh_token)).await?;

    Ok(WithCookies {
        cookies: vec![
            cookies::access_token_cookie(&access_token, &state.config),
            cookies::refresh_token_cookie(&new_refresh_token, &state.config),
        ],
        envelope: ApiEnvelope::ok(
            TokenPair {
                access_token,
                refresh_token: new_refresh_token,
            },
            "Access token refreshed",
        ),
    })
}

/// Change the current user's password.
#[utoipa::path(
    post,
    path = "/users/change-password",
    tag = "users",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "New password fails the length rules"),
        (status = 401, description = "Old password is wrong"),
    )
)]
#[instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<ApiEnvelope<()>> {
    validate_password(&request.new_password, &state.config.auth.password)?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut conn);
    let user = users
        .get_by_id(current_user.id)
        .await?
        .ok_or_else(|| Error::not_found("User", current_user.id))?;

    if !verify_password(request.old_password, user.password_hash).await? {
        return Err(Error::Unauthenticated {
            message: Some("Invalid old password".to_string()),
        });
    }

    let password_hash = hash_password(request.new_password, Argon2Params::from(&state.config.auth.password)).await?;
    users.set_password_hash(current_user.id, &password_hash).await?;

    info!(user_id = %current_user.id, "password changed");
    Ok(ApiEnvelope::message_only("Password changed successfully"))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, register_user, signup_and_login};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn register_without_avatar_is_rejected_and_leaves_no_record(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;

        let form = axum_test::multipart::MultipartForm::new()
            .add_text("username", "alice")
            .add_text("email", "alice@example.com")
            .add_text("full_name", "Alice")
            .add_text("password", "correct horse");
        let response = server.post("/api/v1/users/register").multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let count: (i64,) = sqlx::query_as("SELECT count(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn register_then_duplicate_username_conflicts(pool: PgPool) {
        let server = create_test_app(pool).await;

        let response = register_user(&server, "alice", "alice@example.com").await;
        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["statusCode"], 201);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["username"], "alice");

        let response = register_user(&server, "alice", "other@example.com").await;
        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("username"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn short_password_is_rejected(pool: PgPool) {
        let server = create_test_app(pool).await;

        let form = axum_test::multipart::MultipartForm::new()
            .add_text("username", "bob")
            .add_text("email", "bob@example.com")
            .add_text("full_name", "Bob")
            .add_text("password", "short")
            .add_part(
                "avatar",
                axum_test::multipart::Part::bytes(b"png".to_vec())
                    .file_name("a.png")
                    .mime_type("image/png"),
            );
        let response = server.post("/api/v1/users/register").multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn login_sets_cookies_and_returns_tokens(pool: PgPool) {
        let server = create_test_app(pool).await;
        register_user(&server, "carol", "carol@example.com").await.assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/v1/users/login")
            .json(&json!({"username": "carol", "password": "correct horse"}))
            .await;
        response.assert_status_ok();

        let set_cookie: Vec<String> = response
            .iter_headers_by_name("set-cookie")
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(set_cookie.iter().any(|c| c.starts_with("access_token=")));
        assert!(set_cookie.iter().any(|c| c.starts_with("refresh_token=")));
        assert!(set_cookie.iter().all(|c| c.contains("HttpOnly")));

        let body: serde_json::Value = response.json();
        assert!(body["data"]["access_token"].as_str().is_some());
        assert!(body["data"]["refresh_token"].as_str().is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn login_by_email_works_and_wrong_password_is_401(pool: PgPool) {
        let server = create_test_app(pool).await;
        register_user(&server, "dave", "dave@example.com").await.assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/v1/users/login")
            .json(&json!({"email": "dave@example.com", "password": "correct horse"}))
            .await;
        response.assert_status_ok();

        let response = server
            .post("/api/v1/users/login")
            .json(&json!({"username": "dave", "password": "wrong horse"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .post("/api/v1/users/login")
            .json(&json!({"username": "nobody", "password": "correct horse"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn logout_clears_cookies_and_invalidates_refresh(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        signup_and_login(&server, "erin").await;

        let refresh_before: (Option<String>,) =
            sqlx::query_as("SELECT refresh_token FROM users WHERE username = 'erin'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(refresh_before.0.is_some());

        let response = server.post("/api/v1/users/logout").await;
        response.assert_status_ok();

        let refresh_after: (Option<String>,) =
            sqlx::query_as("SELECT refresh_token FROM users WHERE username = 'erin'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(refresh_after.0.is_none());

        // Cookies were cleared, so the next authenticated call fails.
        let response = server.get("/api/v1/users/current-user").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn refresh_rotates_the_stored_token(pool: PgPool) {
        let server = create_test_app(pool).await;
        let auth = signup_and_login(&server, "frank").await;

        let response = server
            .post("/api/v1/users/refresh-token")
            .json(&json!({"refresh_token": auth.refresh_token}))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let rotated = body["data"]["refresh_token"].as_str().unwrap().to_string();
        assert_ne!(rotated, auth.refresh_token);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn used_refresh_token_is_rejected(pool: PgPool) {
        let mut server = create_test_app(pool).await;
        let auth = signup_and_login(&server, "grace").await;

        // First exchange succeeds and rotates; replaying the original fails.
        // Clear the cookie jar so the body token is what gets used.
        server.clear_cookies();
        server
            .post("/api/v1/users/refresh-token")
            .json(&json!({"refresh_token": auth.refresh_token}))
            .await
            .assert_status_ok();

        let response = server
            .post("/api/v1/users/refresh-token")
            .json(&json!({"refresh_token": auth.refresh_token}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn change_password_requires_the_old_one(pool: PgPool) {
        let server = create_test_app(pool).await;
        signup_and_login(&server, "heidi").await;

        let response = server
            .post("/api/v1/users/change-password")
            .json(&json!({"old_password": "wrong horse", "new_password": "new password 1"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .post("/api/v1/users/change-password")
            .json(&json!({"old_password": "correct horse", "new_password": "new password 1"}))
            .await;
        response.assert_status_ok();

        // Old password no longer works, new one does.
        let response = server
            .post("/api/v1/users/login")
            .json(&json!({"username": "heidi", "password": "correct horse"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let response = server
            .post("/api/v1/users/login")
            .json(&json!({"username": "heidi", "password": "new password 1"}))
            .await;
        response.assert_status_ok();
    }
}
