//! Cloudinary-compatible storage provider.
//!
//! Upload and destroy calls go to the provider's HTTP API
//! (`/v1_1/<cloud_name>/<resource_type>/upload` and `.../destroy`), with
//! request parameters signed using the account API secret (SHA-256 over the
//! sorted parameter string).

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, instrument, warn};

use super::{MediaAsset, MediaError, MediaKind, MediaStorage, Result, public_id_from_url};
use crate::config::CloudinaryConfig;

pub struct CloudinaryStorage {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl From<CloudinaryConfig> for CloudinaryStorage {
    fn from(config: CloudinaryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.upload_timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }
}

/// Successful upload response (fields we care about).
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    #[serde(default)]
    duration: Option<f64>,
}

/// Destroy response: `result` is `"ok"` or `"not found"`.
#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStorage {
    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.api_base.as_str().trim_end_matches('/'),
            self.config.cloud_name,
            resource_type,
            action
        )
    }

    /// Sign request parameters: sort by key, join as `k=v` with `&`, append
    /// the API secret, SHA-256 hex digest.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by_key(|(k, _)| *k);
        let to_sign: String = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let digest = Sha256::digest(format!("{to_sign}{}", self.config.api_secret).as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    async fn parse_error(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());
        MediaError::Provider { status, message }
    }
}

#[async_trait]
impl MediaStorage for CloudinaryStorage {
    #[instrument(skip(self, path), fields(folder = folder, kind = kind.resource_type()))]
    async fn upload(&self, path: &Path, file_name: &str, kind: MediaKind, folder: &str) -> Result<MediaAsset> {
        let bytes = tokio::fs::read(path).await?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder), ("timestamp", &timestamp)]);

        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.as_ref())
            .map_err(MediaError::Request)?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint(kind.resource_type(), "upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let uploaded: UploadResponse = response.json().await?;
        debug!(url = %uploaded.secure_url, "uploaded media asset");

        Ok(MediaAsset {
            url: uploaded.secure_url,
            duration: uploaded.duration,
        })
    }

    #[instrument(skip(self), fields(kind = kind.resource_type()))]
    async fn delete(&self, url: &str, kind: MediaKind) -> Result<bool> {
        let public_id = public_id_from_url(url)?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", &public_id), ("timestamp", &timestamp)]);

        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id.clone())
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint(kind.resource_type(), "destroy"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let destroyed: DestroyResponse = response.json().await?;
        if destroyed.result != "ok" {
            warn!(public_id, result = %destroyed.result, "remote asset was not deleted");
        }
        Ok(destroyed.result == "ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn install_crypto_provider() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    }

    fn storage_for(server: &MockServer) -> CloudinaryStorage {
        install_crypto_provider();
        let mut config = CloudinaryConfig::default();
        config.cloud_name = "testcloud".to_string();
        config.api_key = "key".to_string();
        config.api_secret = "secret".to_string();
        config.api_base = url::Url::parse(&server.uri()).unwrap();
        CloudinaryStorage::from(config)
    }

    fn temp_file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn signature_is_deterministic_and_sorted() {
        install_crypto_provider();
        let mut config = CloudinaryConfig::default();
        config.api_secret = "secret".to_string();
        let storage = CloudinaryStorage::from(config);

        let a = storage.sign(&[("timestamp", "100"), ("folder", "videos")]);
        let b = storage.sign(&[("folder", "videos"), ("timestamp", "100")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // SHA-256 hex
    }

    #[tokio::test]
    async fn upload_parses_secure_url_and_duration() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/testcloud/auto/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "secure_url": "https://res.example.com/testcloud/video/upload/v1/videos/abc.mp4",
                "public_id": "videos/abc",
                "duration": 33.5,
            })))
            .mount(&server)
            .await;

        let storage = storage_for(&server);
        let file = temp_file_with(b"fake video bytes");

        let asset = storage
            .upload(file.path(), "clip.mp4", MediaKind::Auto, "videos")
            .await
            .unwrap();
        assert_eq!(asset.url, "https://res.example.com/testcloud/video/upload/v1/videos/abc.mp4");
        assert_eq!(asset.duration, Some(33.5));
    }

    #[tokio::test]
    async fn upload_failure_surfaces_provider_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/testcloud/image/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid signature"))
            .mount(&server)
            .await;

        let storage = storage_for(&server);
        let file = temp_file_with(b"png");

        let err = storage
            .upload(file.path(), "a.png", MediaKind::Image, "avatars")
            .await
            .unwrap_err();
        match err {
            MediaError::Provider { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("invalid signature"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_reports_whether_asset_existed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/testcloud/video/destroy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": "not found" })))
            .mount(&server)
            .await;

        let storage = storage_for(&server);
        let deleted = storage
            .delete(
                "https://res.example.com/testcloud/video/upload/v1/videos/gone.mp4",
                MediaKind::Video,
            )
            .await
            .unwrap();
        assert!(!deleted);
    }
}
