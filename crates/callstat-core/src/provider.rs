//! Source trait for call data
//!
//! This module defines the `CallSource` trait that every data source
//! implements. It gives the binary one interface for fetching the full call
//! collection, whether it comes from the HTTP API or a local file.

use crate::error::Result;
use crate::types::CallRecord;
use async_trait::async_trait;

/// Trait for call data sources.
///
/// A fetch returns the complete collection in the order the source delivered
/// it. Failures are reported once; retrying is left to the caller.
#[async_trait]
pub trait CallSource: Send + Sync {
    /// Fetch every call the source knows about.
    async fn fetch_calls(&self) -> Result<Vec<CallRecord>>;

    /// Human-readable description used in logs and headers.
    fn describe(&self) -> String;
}
