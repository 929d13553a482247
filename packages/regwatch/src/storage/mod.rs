use crate::types::{CapturedVersion, DocumentId, RegDocument};
use anyhow::Result;
use async_trait::async_trait;

pub mod postgres;
pub use postgres::PostgresStore;

/// Storage trait for document rows and their version history
///
/// Document rows are created by an out-of-scope ingestion process; this job
/// only transitions them between states and appends version rows.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch at most `limit` documents in `pending` state, store-defined order.
    async fn fetch_pending(&self, limit: i64) -> Result<Vec<RegDocument>>;

    /// Persist a captured change: mutate the document row and append the
    /// matching version row as one unit.
    async fn save_capture(&self, capture: &CapturedVersion) -> Result<()>;

    /// Touch an unchanged document: status to `active`, check timestamp only.
    async fn mark_checked(&self, id: DocumentId) -> Result<()>;

    /// Record a failed check: status to `error`, check timestamp refreshed.
    async fn mark_error(&self, id: DocumentId) -> Result<()>;
}
