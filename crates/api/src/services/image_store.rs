//! Local filesystem storage for profile pictures.
//!
//! [`LocalImageStore`] is the server-side [`UploadService`]: it checks the
//! declared content type, the size limit and the actual image signature, then
//! writes the file under a random name and returns the public URL path it is
//! served from.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use onboard_core::types::ImageRef;
use onboard_core::upload::{FileHandle, UploadError, UploadService};
use uuid::Uuid;

/// URL prefix under which stored images are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Accepted content types, the format they must sniff as, and the stored
/// file extension.
const ACCEPTED_TYPES: [(&str, ImageFormat, &str); 4] = [
    ("image/png", ImageFormat::Png, "png"),
    ("image/jpeg", ImageFormat::Jpeg, "jpg"),
    ("image/jpg", ImageFormat::Jpeg, "jpg"),
    ("image/webp", ImageFormat::WebP, "webp"),
];

#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate `file` and return the extension it will be stored under.
    pub fn check(&self, file: &FileHandle) -> Result<&'static str, UploadError> {
        if file.is_empty() {
            return Err(UploadError::Validation("File is empty".to_string()));
        }
        if file.len() > self.max_bytes {
            return Err(UploadError::Validation(format!(
                "File is {} bytes; the limit is {} bytes",
                file.len(),
                self.max_bytes
            )));
        }

        let declared = file.content_type.trim().to_ascii_lowercase();
        let &(_, expected, extension) = ACCEPTED_TYPES
            .iter()
            .find(|(mime, _, _)| *mime == declared)
            .ok_or_else(|| {
                UploadError::Validation(format!(
                    "Unsupported content type '{}'; expected PNG, JPEG or WebP",
                    file.content_type
                ))
            })?;

        match image::guess_format(&file.bytes) {
            Ok(actual) if actual == expected => Ok(extension),
            Ok(actual) => Err(UploadError::Validation(format!(
                "File content is {actual:?} but was declared as {declared}"
            ))),
            Err(_) => Err(UploadError::Validation(
                "File content is not a recognised image".to_string(),
            )),
        }
    }
}

impl UploadService for LocalImageStore {
    async fn upload_image(&self, file: &FileHandle) -> Result<ImageRef, UploadError> {
        let extension = self.check(file)?;
        let stored_name = format!("{}.{extension}", Uuid::new_v4());

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            UploadError::Network(format!("Failed to prepare upload directory: {e}"))
        })?;
        tokio::fs::write(self.dir.join(&stored_name), &file.bytes)
            .await
            .map_err(|e| UploadError::Network(format!("Failed to store image: {e}")))?;

        tracing::info!(
            original_name = %file.file_name,
            stored_name = %stored_name,
            size_bytes = file.len(),
            "Profile picture stored"
        );

        Ok(format!("{UPLOADS_ROUTE}/{stored_name}"))
    }
}
