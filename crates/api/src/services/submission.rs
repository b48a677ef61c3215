//! Persistence of completed profiles.
//!
//! [`SubmissionSink`] is the server-side [`SubmitService`]. With `SUBMIT_URL`
//! configured it forwards each profile as JSON to that endpoint; otherwise it
//! writes one JSON document per submission into `SUBMISSIONS_DIR`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use onboard_core::submit::{ProfileSubmission, SubmitAck, SubmitError, SubmitService};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::ServerConfig;

/// HTTP request timeout for a single submission.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Optional acknowledgement body returned by the remote endpoint.
#[derive(Debug, Default, Deserialize)]
struct RemoteAck {
    #[serde(default, alias = "id")]
    reference: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub enum SubmissionSink {
    /// POST each submission to a remote endpoint.
    Http { client: reqwest::Client, url: String },
    /// Write each submission to `<dir>/<reference>.json`.
    Directory { dir: PathBuf },
}

impl SubmissionSink {
    /// Build the sink selected by the configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        match &config.submit_url {
            Some(url) => Self::http(url.clone()),
            None => Ok(Self::directory(config.submissions_dir.clone())),
        }
    }

    /// Create an HTTP sink with a pre-configured client.
    pub fn http(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::Http {
            client,
            url: url.into(),
        })
    }

    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self::Directory { dir: dir.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Directory { .. } => "directory",
        }
    }

    async fn post(
        client: &reqwest::Client,
        url: &str,
        submission: &ProfileSubmission,
    ) -> Result<SubmitAck, SubmitError> {
        let response = client
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(SubmitError::Rejected(format!(
                "Endpoint returned HTTP {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(SubmitError::Network(format!(
                "Endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        // An empty or non-JSON body is still an acknowledgement.
        let body = response.bytes().await.unwrap_or_default();
        let remote: RemoteAck = serde_json::from_slice(&body).unwrap_or_default();
        let reference = match remote.reference {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        Ok(SubmitAck {
            reference,
            received_at: Utc::now(),
        })
    }

    async fn write(dir: &Path, submission: &ProfileSubmission) -> Result<SubmitAck, SubmitError> {
        let reference = Uuid::new_v4().to_string();
        let json = serde_json::to_vec_pretty(submission)
            .map_err(|e| SubmitError::Rejected(format!("Unserializable submission: {e}")))?;

        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            SubmitError::Network(format!("Failed to prepare submissions directory: {e}"))
        })?;
        tokio::fs::write(dir.join(format!("{reference}.json")), json)
            .await
            .map_err(|e| SubmitError::Network(format!("Failed to write submission: {e}")))?;

        Ok(SubmitAck {
            reference,
            received_at: Utc::now(),
        })
    }
}

impl SubmitService for SubmissionSink {
    async fn submit(&self, submission: &ProfileSubmission) -> Result<SubmitAck, SubmitError> {
        let ack = match self {
            Self::Http { client, url } => Self::post(client, url, submission).await?,
            Self::Directory { dir } => Self::write(dir, submission).await?,
        };
        tracing::info!(
            sink = self.kind(),
            reference = %ack.reference,
            "Profile submission persisted"
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_core::Draft;

    fn submission() -> ProfileSubmission {
        ProfileSubmission::from_draft(&Draft::new(), "/uploads/a.png".into(), Utc::now())
    }

    #[test]
    fn from_config_selects_directory_without_url() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        let sink = SubmissionSink::from_config(&config).unwrap();
        assert_eq!(sink.kind(), "directory");
    }

    #[test]
    fn from_config_selects_http_with_url() {
        let config = ServerConfig::from_lookup(|key| {
            (key == "SUBMIT_URL").then(|| "http://127.0.0.1:9/profiles".to_string())
        })
        .unwrap();
        let sink = SubmissionSink::from_config(&config).unwrap();
        assert_eq!(sink.kind(), "http");
    }

    #[tokio::test]
    async fn directory_sink_writes_json_named_by_reference() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SubmissionSink::directory(dir.path().join("out"));

        let ack = sink.submit(&submission()).await.unwrap();

        let path = dir.path().join("out").join(format!("{}.json", ack.reference));
        let stored: serde_json::Value =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(stored["profilePic"], "/uploads/a.png");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        // Port 9 (discard) is not listening on the loopback interface.
        let sink = SubmissionSink::http("http://127.0.0.1:9/profiles").unwrap();
        let result = sink.submit(&submission()).await;
        assert!(matches!(result, Err(SubmitError::Network(_))));
    }
}
