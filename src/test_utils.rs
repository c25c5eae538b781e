//! Test utilities shared by handler and repository tests.

use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::{Config, DummyMediaConfig, MediaConfig};
use crate::db::handlers::repository::Repository;
use crate::db::handlers::{Users, Videos};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::db::models::videos::{VideoCreateDBRequest, VideoDBResponse};
use crate::types::UserId;

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "correct horse";

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.auth.access.secret = Some("test-access-secret".to_string());
    config.auth.refresh.secret = Some("test-refresh-secret".to_string());
    // The test client talks plain HTTP, so Secure cookies would never be sent back.
    config.auth.cookies.secure = false;
    // Cheap argon2 so password tests stay fast.
    config.auth.password.argon2_memory_kib = 1024;
    config.auth.password.argon2_iterations = 1;
    config.auth.password.argon2_parallelism = 1;
    config.media = MediaConfig::Dummy(DummyMediaConfig::default());
    config
}

pub async fn create_test_app(pool: PgPool) -> TestServer {
    create_test_app_with_media(pool, DummyMediaConfig::default()).await
}

pub async fn create_test_app_with_media(pool: PgPool, media: DummyMediaConfig) -> TestServer {
    let mut config = create_test_config();
    config.media = MediaConfig::Dummy(media);

    let app = crate::Application::with_pool(config, pool).expect("Failed to create application");
    app.into_test_server()
}

/// Register an account through the API, avatar included. Returns the raw
/// response so tests can assert on failures too.
pub async fn register_user(server: &TestServer, username: &str, email: &str) -> axum_test::TestResponse {
    let form = MultipartForm::new()
        .add_text("username", username)
        .add_text("email", email)
        .add_text("full_name", format!("Test {username}"))
        .add_text("password", TEST_PASSWORD)
        .add_part(
            "avatar",
            Part::bytes(b"avatar bytes".to_vec()).file_name("avatar.png").mime_type("image/png"),
        );
    server.post("/api/v1/users/register").multipart(form).await
}

pub struct TestAuth {
    pub access_token: String,
    pub refresh_token: String,
}

/// Register `{name}@example.com` and log in. The token cookies land in the
/// server's cookie jar, so subsequent requests are authenticated as this user.
pub async fn signup_and_login(server: &TestServer, username: &str) -> TestAuth {
    let email = format!("{username}@example.com");
    register_user(server, username, &email)
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/v1/users/login")
        .json(&json!({"username": username, "password": TEST_PASSWORD}))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    TestAuth {
        access_token: body["data"]["access_token"].as_str().expect("access token in login body").to_string(),
        refresh_token: body["data"]["refresh_token"]
            .as_str()
            .expect("refresh token in login body")
            .to_string(),
    }
}

/// Publish a video as the currently logged-in user.
pub async fn publish_test_video(server: &TestServer, title: &str) -> axum_test::TestResponse {
    let form = MultipartForm::new()
        .add_text("title", title)
        .add_text("description", format!("Description of {title}"))
        .add_part(
            "video_file",
            Part::bytes(b"mp4 bytes".to_vec()).file_name("clip.mp4").mime_type("video/mp4"),
        )
        .add_part(
            "thumbnail",
            Part::bytes(b"png bytes".to_vec()).file_name("thumb.png").mime_type("image/png"),
        );
    server.post("/api/v1/videos").multipart(form).await
}

/// A unique user create request for repository tests. Not a real hash; these
/// rows never go through login.
pub fn test_user_create_request(username: &str) -> UserCreateDBRequest {
    UserCreateDBRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        full_name: format!("Test {username}"),
        avatar_url: format!("https://media.invalid/dummy/image/upload/v1/avatars/{}.png", Uuid::new_v4().simple()),
        cover_image_url: None,
        password_hash: "$argon2id$test$hash".to_string(),
    }
}

pub async fn create_db_user(pool: &PgPool, username: &str) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = Users::new(&mut conn);
    users
        .create(&test_user_create_request(username))
        .await
        .expect("Failed to create test user")
}

pub async fn create_db_video(pool: &PgPool, owner_id: UserId, title: &str) -> VideoDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut videos = Videos::new(&mut conn);
    videos
        .create(&VideoCreateDBRequest {
            owner_id,
            title: title.to_string(),
            description: format!("Description of {title}"),
            video_url: format!("https://media.invalid/dummy/video/upload/v1/videos/{}.mp4", Uuid::new_v4().simple()),
            thumbnail_url: format!(
                "https://media.invalid/dummy/image/upload/v1/thumbnails/{}.png",
                Uuid::new_v4().simple()
            ),
            duration: 42.5,
        })
        .await
        .expect("Failed to create test video")
}
