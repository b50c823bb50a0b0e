//! Fetch-once artifact downloads.
//!
//! Artifacts are looked up on disk first; only a missing file triggers a
//! download, and a file that exists is never re-validated or refreshed.

use std::fs;
use std::path::Path;

use reqwest::blocking::Client;

use crate::error::DashError;

/// Remote locations of the artifacts, from the environment (`.env` honored).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactUrls {
    pub model: Option<String>,
    pub encoders: Option<String>,
}

impl ArtifactUrls {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            model: non_empty_var("PANGAN_MODEL_URL"),
            encoders: non_empty_var("PANGAN_ENCODER_URL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub struct ArtifactFetcher {
    client: Client,
}

impl ArtifactFetcher {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Make sure `path` exists locally, downloading it from `url` if needed.
    pub fn ensure_local(&self, path: &Path, url: Option<&str>) -> Result<(), DashError> {
        if path.exists() {
            return Ok(());
        }
        let Some(url) = url else {
            return Err(DashError::MissingArtifact {
                path: path.to_path_buf(),
                reason: "not found locally and no download URL configured".to_string(),
            });
        };

        tracing::info!(path = %path.display(), url, "downloading artifact");
        let missing = |reason: String| DashError::MissingArtifact {
            path: path.to_path_buf(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| missing(format!("download failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(missing(format!("download failed with status {}", resp.status())));
        }
        let bytes = resp
            .bytes()
            .map_err(|e| missing(format!("download interrupted: {e}")))?;

        // Write beside the target and rename so a partial download never looks complete.
        let partial = path.with_extension("part");
        fs::write(&partial, &bytes).map_err(|e| missing(format!("failed to save download: {e}")))?;
        fs::rename(&partial, path).map_err(|e| missing(format!("failed to save download: {e}")))?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "artifact downloaded");
        Ok(())
    }
}

impl Default for ArtifactFetcher {
    fn default() -> Self {
        Self::new()
    }
}
