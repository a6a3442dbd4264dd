//! Error types for callstat
//!
//! This module defines the error type shared by every callstat crate.
//! Errors derive from `thiserror` so that IO, JSON and HTTP failures
//! convert automatically through `?`.
//!
//! # Example
//!
//! ```
//! use callstat_core::error::{CallstatError, Result};
//!
//! fn parse_payload(raw: &str) -> Result<serde_json::Value> {
//!     // serde_json::Error converts into CallstatError::Json
//!     Ok(serde_json::from_str(raw)?)
//! }
//!
//! assert!(matches!(parse_payload("{"), Err(CallstatError::Json(_))));
//! ```

use thiserror::Error;

/// Message shown when the call API fails without saying why
pub const DEFAULT_FETCH_ERROR: &str = "Failed to fetch calls";

/// Main error type for callstat operations
///
/// Empty filter results are never an error; statistics over an empty
/// collection are zero-defaulted instead.
#[derive(Error, Debug)]
pub enum CallstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The call API answered with a failure envelope
    ///
    /// Displays as the bare message so it can be shown to the user as-is.
    #[error("{0}")]
    Fetch(String),

    /// Invalid argument (unknown selector value, zero page size, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File watcher could not be set up
    #[error("Watch error: {0}")]
    Watch(String),
}

impl CallstatError {
    /// Build a fetch error, falling back to the generic message
    pub fn fetch(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.trim().is_empty() => Self::Fetch(msg),
            _ => Self::Fetch(DEFAULT_FETCH_ERROR.to_string()),
        }
    }
}

/// Convenience type alias for Results in callstat
pub type Result<T> = std::result::Result<T, CallstatError>;
