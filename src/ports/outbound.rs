//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ClassifiedRecord, DomainError, Post};
use std::path::PathBuf;

/// Forum API gateway. Fetch posts with their comment trees.
#[async_trait::async_trait]
pub trait ForumGateway: Send + Sync {
    /// Fetch up to `limit` hot posts from `source`, each with all comments already expanded
    /// and flattened (no further pagination needed by the caller).
    async fn hot_posts(&self, source: &str, limit: u32) -> Result<Vec<Post>, DomainError>;
}

/// Classification service. One prompt in, one text payload out.
#[async_trait::async_trait]
pub trait AiPort: Send + Sync {
    /// Send a single prompt.
    ///
    /// Returns `Ok(None)` when the service answered without content; transport and
    /// HTTP failures are `Err`. Parsing the payload is the caller's job.
    async fn complete(&self, prompt: &str) -> Result<Option<String>, DomainError>;
}

/// Persist the run's outputs.
#[async_trait::async_trait]
pub trait ExportPort: Send + Sync {
    /// Write the tabular export (one row per record). Returns the written path.
    async fn write_records(&self, records: &[ClassifiedRecord]) -> Result<PathBuf, DomainError>;

    /// Write the rendered text summary. Returns the written path.
    async fn write_summary(&self, summary: &str) -> Result<PathBuf, DomainError>;
}
