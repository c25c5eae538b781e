//! Multipart form collection shared by the upload endpoints.

use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::{Error, Result};
use crate::media::spool::{SpooledFile, spool_field};

/// Text fields and spooled file fields of one multipart request.
#[derive(Default)]
pub struct MultipartForm {
    texts: HashMap<String, String>,
    files: HashMap<String, SpooledFile>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(|s| s.as_str()).filter(|s| !s.trim().is_empty())
    }

    pub fn require_text(&self, name: &str) -> Result<&str> {
        self.text(name)
            .ok_or_else(|| Error::bad_request(format!("Field '{name}' is required")))
    }

    pub fn take_file(&mut self, name: &str) -> Option<SpooledFile> {
        self.files.remove(name)
    }

    pub fn require_file(&mut self, name: &str) -> Result<SpooledFile> {
        self.take_file(name)
            .ok_or_else(|| Error::bad_request(format!("File '{name}' is required")))
    }
}

/// Drain a multipart body into text fields and spooled files.
///
/// `file_limits` names every accepted file field and its size cap; a file
/// field outside that list rejects the whole request before anything is
/// uploaded to the provider.
pub async fn collect_form(
    mut multipart: Multipart,
    file_limits: &[(&str, u64)],
    temp_dir: Option<&PathBuf>,
) -> Result<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            let Some((_, max_size)) = file_limits.iter().find(|(n, _)| *n == name) else {
                return Err(Error::bad_request(format!("Unexpected file field '{name}'")));
            };
            let spooled = spool_field(field, *max_size, temp_dir).await?;
            form.files.insert(name, spooled);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| Error::bad_request(format!("Invalid text field '{name}': {e}")))?;
            form.texts.insert(name, value);
        }
    }

    Ok(form)
}
