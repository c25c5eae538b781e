//! In-process media storage for tests and local development.
//!
//! Fabricates delivery URLs without any network traffic, records every call,
//! and can be configured to fail uploads or deletions so failure paths are
//! exercisable end to end.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use super::{MediaAsset, MediaError, MediaKind, MediaStorage, Result, public_id_from_url};
use crate::config::DummyMediaConfig;

/// Duration reported for every non-image upload.
pub const DUMMY_DURATION_SECS: f64 = 42.5;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpload {
    pub file_name: String,
    pub folder: String,
    pub url: String,
}

#[derive(Default)]
pub struct DummyStorage {
    config: DummyMediaConfig,
    uploads: Mutex<Vec<RecordedUpload>>,
    deletions: Mutex<Vec<String>>,
}

impl From<DummyMediaConfig> for DummyStorage {
    fn from(config: DummyMediaConfig) -> Self {
        Self {
            config,
            uploads: Mutex::new(Vec::new()),
            deletions: Mutex::new(Vec::new()),
        }
    }
}

impl DummyStorage {
    /// Every upload recorded so far.
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().expect("uploads lock").clone()
    }

    /// Public ids of every deletion attempted so far.
    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().expect("deletions lock").clone()
    }
}

#[async_trait]
impl MediaStorage for DummyStorage {
    async fn upload(&self, path: &Path, file_name: &str, kind: MediaKind, folder: &str) -> Result<MediaAsset> {
        if self.config.fail_uploads {
            return Err(MediaError::UploadFailed("dummy provider configured to fail".to_string()));
        }

        // The spooled file must exist at upload time.
        if !path.exists() {
            return Err(MediaError::UploadFailed(format!("missing spooled file {}", path.display())));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let url = format!(
            "https://media.invalid/dummy/{}/upload/v1/{}/{}.{}",
            kind.resource_type(),
            folder,
            Uuid::new_v4().simple(),
            extension
        );

        let record = RecordedUpload {
            file_name: file_name.to_string(),
            folder: folder.to_string(),
            url: url.clone(),
        };
        self.uploads.lock().expect("uploads lock").push(record);

        let duration = match kind {
            MediaKind::Image => None,
            MediaKind::Video | MediaKind::Auto => Some(DUMMY_DURATION_SECS),
        };

        Ok(MediaAsset { url, duration })
    }

    async fn delete(&self, url: &str, _kind: MediaKind) -> Result<bool> {
        let public_id = public_id_from_url(url)?;
        self.deletions.lock().expect("deletions lock").push(public_id);

        if self.config.fail_deletes {
            return Err(MediaError::Provider {
                status: 500,
                message: "dummy provider configured to fail deletions".to_string(),
            });
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"payload").unwrap();
        file
    }

    #[tokio::test]
    async fn upload_records_and_returns_parseable_url() {
        let storage = DummyStorage::default();
        let file = temp_file();

        let asset = storage
            .upload(file.path(), "clip.mp4", MediaKind::Auto, "videos")
            .await
            .unwrap();
        assert_eq!(asset.duration, Some(DUMMY_DURATION_SECS));
        assert!(public_id_from_url(&asset.url).unwrap().starts_with("videos/"));

        let uploads = storage.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].folder, "videos");
    }

    #[tokio::test]
    async fn image_uploads_have_no_duration() {
        let storage = DummyStorage::default();
        let file = temp_file();

        let asset = storage
            .upload(file.path(), "pic.png", MediaKind::Image, "avatars")
            .await
            .unwrap();
        assert_eq!(asset.duration, None);
    }

    #[tokio::test]
    async fn configured_failures_are_reported() {
        let storage = DummyStorage::from(DummyMediaConfig {
            fail_uploads: true,
            fail_deletes: true,
        });
        let file = temp_file();

        assert!(storage.upload(file.path(), "a.png", MediaKind::Image, "avatars").await.is_err());

        let err = storage
            .delete("https://media.invalid/dummy/image/upload/v1/avatars/x.png", MediaKind::Image)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Provider { status: 500, .. }));
        // The deletion attempt was still recorded before failing.
        assert_eq!(storage.deletions().len(), 1);
    }
}
