//! JSON persistence of the aggregate document.
//!
//! The document lives at one fixed path and is rewritten whole on every run.
//! It is written to a sibling temporary file first and renamed into place,
//! so a reader never sees a half-written document.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::StoreError;
use crate::models::AggregateResult;

#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }

    /// Replace the persisted document with `result`.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn write(&self, result: &AggregateResult) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(result)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let temp = self.temp_path();
        fs::write(&temp, json).await?;
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        info!(categories = result.categories.len(), "Wrote news document");
        Ok(())
    }

    /// Read back the whole document, if one has been written.
    pub async fn load(&self) -> Result<Option<AggregateResult>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// `updated_at` of the current document, or an empty string if there is
    /// no readable document yet.
    pub async fn updated_at(&self) -> String {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return String::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read news document");
                return String::new();
            }
        };

        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(doc) => doc
                .get("updated_at")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "News document is not valid JSON");
                String::new()
            }
        }
    }
}
