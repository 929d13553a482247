pub mod checker;
pub mod config;
pub mod renderer;
pub mod snapshots;
pub mod storage;
pub mod types;

// Re-exports for clean API
pub use checker::{check_pending_documents, BatchSummary, PENDING_BATCH_SIZE};
pub use config::Config;
pub use renderer::{ChromeRenderer, DocumentRenderer, RenderError, RenderedPage};
pub use snapshots::{snapshot_path, SnapshotClient, SnapshotStore, SNAPSHOT_BUCKET};
pub use storage::{DocumentStore, PostgresStore};
pub use types::{
    CapturedVersion, CheckOutcome, ContentHash, DocumentId, DocumentStatus, DocumentVersionId,
    RegDocument,
};
