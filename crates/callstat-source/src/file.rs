//! File call source
//!
//! Reads a JSON document from disk. The document may be a saved API
//! response (`{"success": true, "data": [...]}`) or a bare array of call
//! records.

use async_trait::async_trait;
use callstat_core::error::{CallstatError, Result};
use callstat_core::provider::CallSource;
use callstat_core::types::{ApiResponse, CallRecord};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Call source reading a local JSON file
pub struct FileCallSource {
    path: PathBuf,
}

impl FileCallSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CallSource for FileCallSource {
    async fn fetch_calls(&self) -> Result<Vec<CallRecord>> {
        debug!("Reading calls from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CallstatError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {e}", self.path.display()),
            ))
        })?;

        let calls = parse_calls_document(&content)?;
        debug!("Loaded {} calls from {}", calls.len(), self.path.display());
        Ok(calls)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parse a saved API response or a bare array of records
pub fn parse_calls_document(content: &str) -> Result<Vec<CallRecord>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    let envelope: ApiResponse<Vec<CallRecord>> = serde_json::from_str(trimmed)?;
    envelope.into_result()
}
