use std::path::PathBuf;
use std::str::FromStr;

use onboard_core::PreviewEditPolicy;

/// Default cap on uploaded profile pictures (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// A configuration variable held a value that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value '{value}' for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory uploaded profile pictures are written to.
    pub upload_dir: PathBuf,
    /// Largest accepted profile picture in bytes.
    pub max_upload_bytes: usize,
    /// Endpoint completed profiles are POSTed to. When unset, submissions are
    /// written to `submissions_dir` instead.
    pub submit_url: Option<String>,
    /// Directory used for submissions when no `submit_url` is configured.
    pub submissions_dir: PathBuf,
    /// How in-place edits on the preview step are checked.
    pub preview_edit_policy: PreviewEditPolicy,
    /// Sessions untouched for this many seconds are discarded (default:
    /// `3600`). `0` keeps sessions until they are deleted or the server stops.
    pub session_idle_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `UPLOAD_DIR`                | `./data/uploads`        |
    /// | `MAX_UPLOAD_BYTES`          | `5242880`               |
    /// | `SUBMIT_URL`                | unset                   |
    /// | `SUBMISSIONS_DIR`           | `./data/submissions`    |
    /// | `PREVIEW_EDIT_POLICY`       | `trusted`               |
    /// | `SESSION_IDLE_TIMEOUT_SECS` | `3600`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port = parse("PORT", var("PORT", "3000"))?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs =
            parse("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"))?;
        let upload_dir = PathBuf::from(var("UPLOAD_DIR", "./data/uploads"));
        let max_upload_bytes = parse(
            "MAX_UPLOAD_BYTES",
            var("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string()),
        )?;
        let submit_url = lookup("SUBMIT_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let submissions_dir = PathBuf::from(var("SUBMISSIONS_DIR", "./data/submissions"));
        let preview_edit_policy =
            parse("PREVIEW_EDIT_POLICY", var("PREVIEW_EDIT_POLICY", "trusted"))?;
        let session_idle_timeout_secs = parse(
            "SESSION_IDLE_TIMEOUT_SECS",
            var("SESSION_IDLE_TIMEOUT_SECS", "3600"),
        )?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload_dir,
            max_upload_bytes,
            submit_url,
            submissions_dir,
            preview_edit_policy,
            session_idle_timeout_secs,
        })
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.submit_url, None);
        assert_eq!(config.preview_edit_policy, PreviewEditPolicy::Trusted);
        assert_eq!(config.session_idle_timeout_secs, 3600);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("SUBMIT_URL", "https://records.example/profiles"),
            ("PREVIEW_EDIT_POLICY", "revalidate"),
            ("SESSION_IDLE_TIMEOUT_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(
            config.submit_url.as_deref(),
            Some("https://records.example/profiles")
        );
        assert_eq!(
            config.preview_edit_policy,
            PreviewEditPolicy::RevalidateOwningStep
        );
        assert_eq!(config.session_idle_timeout_secs, 0);
    }

    #[test]
    fn blank_submit_url_is_unset() {
        let config = load(&[("SUBMIT_URL", "  ")]).unwrap();
        assert_eq!(config.submit_url, None);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.key, "PORT");
        assert_eq!(err.value, "eighty");

        let err = load(&[("PREVIEW_EDIT_POLICY", "strict")]).unwrap_err();
        assert_eq!(err.key, "PREVIEW_EDIT_POLICY");
    }
}
