use crate::renderer::DocumentRenderer;
use crate::snapshots::{snapshot_path, SnapshotStore};
use crate::storage::DocumentStore;
use crate::types::{CapturedVersion, CheckOutcome, ContentHash, RegDocument};
use anyhow::{Context, Result};
use chrono::Utc;

/// Documents attempted per run
pub const PENDING_BATCH_SIZE: i64 = 20;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub checked: usize,
    pub changed: usize,
    pub failed: usize,
}

/// Check every pending document once, sequentially.
///
/// The initial queue read is the only fatal error; everything after it is
/// isolated per document. The renderer is shared across the whole batch and
/// owned by the caller.
pub async fn check_pending_documents(
    store: &impl DocumentStore,
    renderer: &impl DocumentRenderer,
    snapshots: &impl SnapshotStore,
) -> Result<BatchSummary> {
    let documents = store
        .fetch_pending(PENDING_BATCH_SIZE)
        .await
        .context("Failed to fetch pending documents")?;

    if documents.is_empty() {
        tracing::info!("No pending documents");
        return Ok(BatchSummary::default());
    }

    let mut summary = BatchSummary::default();

    for document in documents {
        tracing::info!(url = %document.canonical_url, "Checking document");
        summary.checked += 1;

        match process_document(&document, renderer, snapshots, store).await {
            Ok(CheckOutcome::Changed { version }) => {
                summary.changed += 1;
                tracing::info!(
                    url = %document.canonical_url,
                    version,
                    "Captured new version"
                );
            }
            Ok(CheckOutcome::Unchanged) => {
                tracing::info!(url = %document.canonical_url, "Content unchanged");
            }
            Err(error) => {
                summary.failed += 1;
                tracing::error!(
                    url = %document.canonical_url,
                    error = ?error,
                    "Document check failed"
                );
                if let Err(mark_error) = store.mark_error(document.id).await {
                    tracing::error!(
                        url = %document.canonical_url,
                        error = ?mark_error,
                        "Failed to record error status"
                    );
                }
            }
        }
    }

    tracing::info!(
        checked = summary.checked,
        changed = summary.changed,
        failed = summary.failed,
        "Batch complete"
    );

    Ok(summary)
}

/// Process one document: render, compare hashes, and persist the outcome.
///
/// Any error returned here marks the document `error` in the caller; the
/// document row is never updated with partial capture data.
async fn process_document(
    document: &RegDocument,
    renderer: &impl DocumentRenderer,
    snapshots: &impl SnapshotStore,
    store: &impl DocumentStore,
) -> Result<CheckOutcome> {
    let page = renderer.fetch(&document.canonical_url).await?;

    let content_hash = ContentHash::from_text(&page.text);
    let changed = match &document.content_hash {
        Some(previous) => *previous != content_hash,
        None => true,
    };

    if !changed {
        store
            .mark_checked(document.id)
            .await
            .context("Failed to update check timestamp")?;
        return Ok(CheckOutcome::Unchanged);
    }

    if document.content_hash.is_none() && document.latest_version.is_some_and(|v| v > 1) {
        // Manually reset hash with a stale version counter: the capture
        // keeps the stored number, which may collide with an existing
        // version row. Surfaced here instead of silently renumbering.
        tracing::warn!(
            url = %document.canonical_url,
            latest_version = ?document.latest_version,
            "Document has no stored hash but a version counter above 1"
        );
    }

    let version = document.next_version();
    let pdf = renderer.pdf_snapshot().await?;

    let path = snapshot_path(document.id, version);
    snapshots
        .upload_pdf(&path, pdf)
        .await
        .context("Failed to upload snapshot")?;

    let capture = CapturedVersion {
        document_id: document.id,
        version,
        title: page.title,
        full_text: page.text,
        content_hash,
        snapshot_path: path,
        retrieved_at: Utc::now(),
    };

    store
        .save_capture(&capture)
        .await
        .context("Failed to persist captured version")?;

    Ok(CheckOutcome::Changed { version })
}
