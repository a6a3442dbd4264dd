//! Call data sources for callstat
//!
//! This crate implements the `CallSource` trait for the dashboard HTTP API
//! and for JSON files saved from it.

pub mod file;
pub mod http;

pub use file::{FileCallSource, parse_calls_document};
pub use http::HttpCallSource;

use callstat_core::error::{CallstatError, Result};
use callstat_core::provider::CallSource;
use std::path::Path;

/// API base used when neither a URL nor a file is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Pick the source matching the configured URL or file
pub fn open_source(api_url: Option<&str>, file: Option<&Path>) -> Result<Box<dyn CallSource>> {
    match (api_url, file) {
        (Some(_), Some(_)) => Err(CallstatError::Config(
            "use either an API URL or a data file, not both".to_string(),
        )),
        (_, Some(path)) => Ok(Box::new(FileCallSource::new(path))),
        (url, None) => Ok(Box::new(HttpCallSource::new(
            url.unwrap_or(DEFAULT_API_URL),
        )?)),
    }
}
