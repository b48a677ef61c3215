//! Profile picture upload tracking.
//!
//! The wizard never performs the upload itself. It hands out an
//! [`UploadTicket`] and later folds the collaborator's result back in through
//! [`FormWizard::complete_upload`](crate::wizard::FormWizard::complete_upload).
//! Every ticket carries a fresh attempt token so results from superseded
//! attempts can be recognised and dropped.

use std::future::Future;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{ImageRef, UploadAttempt};

/// Scheme prefix of references that only exist on the client.
pub const LOCAL_PREVIEW_SCHEME: &str = "local://";

/// Number of hex digest characters embedded in a local preview reference.
const PREVIEW_DIGEST_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Upload status
// ---------------------------------------------------------------------------

/// Lifecycle of the profile picture upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Done,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// File handle
// ---------------------------------------------------------------------------

/// An image chosen by the user, held in memory until the upload completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileHandle {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Derive a client-side preview reference from the file contents.
    ///
    /// Deterministic: the same bytes and name always yield the same reference.
    pub fn preview_ref(&self) -> ImageRef {
        let digest = format!("{:x}", Sha256::digest(&self.bytes));
        let name: String = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        let name = if name.is_empty() { "image".to_string() } else { name };
        format!(
            "{LOCAL_PREVIEW_SCHEME}{}/{name}",
            &digest[..PREVIEW_DIGEST_LEN]
        )
    }
}

/// Returns `true` if `image_ref` points at a client-side preview rather than
/// a stored image.
pub fn is_local_preview(image_ref: &str) -> bool {
    image_ref.starts_with(LOCAL_PREVIEW_SCHEME)
}

// ---------------------------------------------------------------------------
// Tickets and outcomes
// ---------------------------------------------------------------------------

/// Work order for one upload attempt.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub attempt: UploadAttempt,
    pub file: FileHandle,
}

/// What happened when an upload result was folded back into the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The result belonged to the latest attempt and set this status.
    Applied(UploadStatus),
    /// A newer attempt (or a reset) superseded this one; nothing changed.
    Stale,
}

// ---------------------------------------------------------------------------
// Collaborator contract
// ---------------------------------------------------------------------------

/// Errors reported by an [`UploadService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// Transport or storage failure; the same file may succeed on retry.
    #[error("Upload failed: {0}")]
    Network(String),

    /// The file itself was rejected (type, size, content).
    #[error("Upload rejected: {0}")]
    Validation(String),
}

/// Stores an image and returns the server-side reference to it.
pub trait UploadService: Send + Sync {
    fn upload_image(
        &self,
        file: &FileHandle,
    ) -> impl Future<Output = Result<ImageRef, UploadError>> + Send;
}
