//! Media storage abstraction layer.
//!
//! This module defines the `MediaStorage` trait which abstracts remote media
//! hosting (video files, thumbnails, avatars, cover images). The service never
//! serves media bytes itself: uploads are pushed to the provider and only the
//! delivery URL (plus video duration) is stored.
//!
//! Uploaded request bodies are spooled to temp files first (see [`spool`]);
//! the temp file is removed when its handle drops, whether or not the upload
//! succeeds.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use url::Url;

use crate::config::MediaConfig;

pub mod cloudinary;
pub mod dummy;
pub mod spool;

pub use spool::SpooledFile;

/// Create a media storage provider from configuration
///
/// This is the single point where we convert config into provider instances.
/// Adding a new provider requires adding a match arm here.
pub fn create_storage(config: MediaConfig) -> Arc<dyn MediaStorage> {
    match config {
        MediaConfig::Cloudinary(cloudinary_config) => Arc::new(cloudinary::CloudinaryStorage::from(cloudinary_config)),
        MediaConfig::Dummy(dummy_config) => Arc::new(dummy::DummyStorage::from(dummy_config)),
    }
}

/// Result type for media storage operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Errors that can occur while talking to the media provider
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Media provider API error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Media provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to read spooled upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a recognized media delivery URL: {url}")]
    InvalidUrl { url: String },

    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

/// Resource type a stored asset is treated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    /// Let the provider detect the type from the payload
    Auto,
}

impl MediaKind {
    pub fn resource_type(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Auto => "auto",
        }
    }
}

/// A successfully stored asset.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    /// Delivery URL (HTTPS)
    pub url: String,
    /// Duration in seconds, reported by the provider for video payloads
    pub duration: Option<f64>,
}

/// Abstract media storage interface
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Upload a local file into the given remote folder.
    ///
    /// The caller owns the local file's lifetime; providers only read it.
    async fn upload(&self, path: &Path, file_name: &str, kind: MediaKind, folder: &str) -> Result<MediaAsset>;

    /// Delete the asset behind a delivery URL.
    ///
    /// Returns whether the provider reported an actual deletion (false means
    /// the asset was already gone).
    async fn delete(&self, url: &str, kind: MediaKind) -> Result<bool>;
}

/// Derive the provider public id from a delivery URL.
///
/// Delivery URLs look like
/// `https://res.example.com/<cloud>/<type>/upload/v1712345/<folder>/<id>.<ext>`;
/// the public id is everything after the version segment, extension stripped.
pub fn public_id_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| MediaError::InvalidUrl { url: url.to_string() })?;
    let segments: Vec<&str> = parsed.path_segments().map(|s| s.collect()).unwrap_or_default();

    let upload_pos = segments
        .iter()
        .position(|s| *s == "upload")
        .ok_or_else(|| MediaError::InvalidUrl { url: url.to_string() })?;

    let mut rest = &segments[upload_pos + 1..];

    // Skip the version segment (v<digits>) if present
    if let Some(first) = rest.first()
        && first.len() > 1
        && first.starts_with('v')
        && first[1..].chars().all(|c| c.is_ascii_digit())
    {
        rest = &rest[1..];
    }

    if rest.is_empty() || rest.iter().all(|s| s.is_empty()) {
        return Err(MediaError::InvalidUrl { url: url.to_string() });
    }

    let mut public_id = rest.join("/");

    // Strip the file extension from the final segment
    if let Some(dot) = public_id.rfind('.')
        && dot > public_id.rfind('/').map_or(0, |s| s + 1)
    {
        public_id.truncate(dot);
    }

    Ok(public_id)
}
