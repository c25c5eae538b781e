//! # vidstream: video sharing platform backend
//!
//! `vidstream` is the HTTP backend of a video sharing platform: accounts and
//! channels, video publishing and playback, comments, likes, playlists,
//! channel subscriptions and an owner dashboard.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence. Uploaded media
//! (videos, thumbnails, avatars, cover images) is not stored locally: files
//! are spooled to disk during the multipart upload and handed to a media
//! storage provider (a Cloudinary-compatible API in production, an in-process
//! dummy in tests), and only the resulting delivery URLs are persisted.
//!
//! Authentication is a dual-token JWT scheme. A short-lived access token
//! carries identity claims and authenticates every request, from a cookie or
//! an `Authorization: Bearer` header. A longer-lived refresh token is stored
//! on the user row and rotated on every exchange, so a stolen refresh token
//! stops working as soon as the legitimate client refreshes.
//!
//! The **API layer** ([`api`]) exposes the REST surface under `/api/v1/*`,
//! with request/response models separated from database models. Every success
//! response is wrapped in a common envelope; errors share the same shape with
//! `success: false`.
//!
//! The **database layer** ([`db`]) uses the repository pattern: each entity
//! has a repository over a `PgConnection` that handles queries and mutations,
//! and maps constraint violations into typed errors.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use vidstream::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = vidstream::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     vidstream::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and automatically runs
//! migrations on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! vidstream::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod media;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::media::MediaStorage;
use crate::openapi::ApiDoc;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{Router, http, routing::get};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CommentId, LikeId, PlaylistId, SubscriptionId, TweetId, UserId, VideoId};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub media: Arc<dyn MediaStorage>,
}

/// Get the vidstream database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// The API lives under `/api/v1/*`; interactive docs are served at `/docs`.
/// The body limit is sized for the largest accepted upload (a video plus a
/// thumbnail and multipart overhead).
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let upload_limit = state.config.uploads.max_video_size + state.config.uploads.max_image_size + 1024 * 1024;

    let api_routes = api::router().with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(upload_limit));

    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations and builds the router.
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles
///    requests until the shutdown future resolves.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting vidstream with configuration: {:#?}", config);

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .acquire_timeout(config.database.acquire_timeout)
            .connect(&config.database.url)
            .await?;
        migrator().run(&pool).await?;

        Self::with_pool(config, pool)
    }

    /// Create an application over an existing pool (tests use this to reuse
    /// the per-test database).
    pub fn with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let media = media::create_storage(config.media.clone());

        let state = AppState::builder().db(pool.clone()).config(config.clone()).media(media).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "vidstream listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        let mut server = axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server");
        server.save_cookies();
        server
    }
}
