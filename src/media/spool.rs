//! Multipart upload spooling.
//!
//! File fields are streamed chunk-by-chunk into a named temp file so whole
//! videos never sit in memory. The temp file is removed when the
//! [`SpooledFile`] drops, whether or not the subsequent provider upload
//! succeeded.

use axum::extract::multipart::Field;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::errors::{Error, Result};

/// A multipart file field spooled to disk.
pub struct SpooledFile {
    file: NamedTempFile,
    file_name: String,
    size: u64,
}

impl SpooledFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Original client-side file name (falls back to the field name).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Stream a multipart field into a temp file, enforcing a size cap as chunks
/// arrive so oversized uploads fail fast.
pub async fn spool_field(mut field: Field<'_>, max_size: u64, temp_dir: Option<&PathBuf>) -> Result<SpooledFile> {
    let field_name = field.name().unwrap_or("file").to_string();
    let file_name = field.file_name().map(|s| s.to_string()).unwrap_or_else(|| field_name.clone());

    let mut file = match temp_dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
    .map_err(|e| Error::Internal {
        operation: format!("create spool file: {e}"),
    })?;

    let mut total_size: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to read upload chunk: {e}"),
    })? {
        total_size += chunk.len() as u64;
        if total_size > max_size {
            tracing::warn!(field = %field_name, total_size, max_size, "upload size limit exceeded, aborting");
            return Err(Error::BadRequest {
                message: format!(
                    "Uploaded file exceeds maximum allowed size of {} bytes ({} MB)",
                    max_size,
                    max_size / (1024 * 1024)
                ),
            });
        }

        file.write_all(&chunk).map_err(|e| Error::Internal {
            operation: format!("write spool file: {e}"),
        })?;
    }

    if total_size == 0 {
        return Err(Error::BadRequest {
            message: format!("Uploaded file '{field_name}' is empty"),
        });
    }

    file.flush().map_err(|e| Error::Internal {
        operation: format!("flush spool file: {e}"),
    })?;

    tracing::debug!(field = %field_name, file_name = %file_name, size = total_size, "spooled upload to disk");

    Ok(SpooledFile {
        file,
        file_name,
        size: total_size,
    })
}
