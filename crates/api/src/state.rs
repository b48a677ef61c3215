use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::{LocalImageStore, SubmissionSink};
use crate::sessions::SessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Active wizard sessions keyed by session id.
    pub sessions: Arc<SessionStore>,
    /// Profile picture storage backing the upload step.
    pub images: Arc<LocalImageStore>,
    /// Destination of completed profiles.
    pub submissions: Arc<SubmissionSink>,
}

impl AppState {
    /// Wire up the collaborators selected by `config`.
    pub fn new(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let images = LocalImageStore::new(config.upload_dir.clone(), config.max_upload_bytes);
        let submissions = SubmissionSink::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
            images: Arc::new(images),
            submissions: Arc::new(submissions),
        })
    }
}
