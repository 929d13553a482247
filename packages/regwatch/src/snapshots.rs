use crate::types::DocumentId;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Bucket holding every PDF snapshot
pub const SNAPSHOT_BUCKET: &str = "document-snapshots";

/// Object key for a document's snapshot at a given version.
///
/// Re-uploading to the same key overwrites, so retrying a version is
/// idempotent.
pub fn snapshot_path(id: DocumentId, version: i32) -> String {
    format!("{}/v{}/snapshot.pdf", id, version)
}

/// Trait for snapshot blob uploads (to allow mocking)
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn upload_pdf(&self, path: &str, bytes: Vec<u8>) -> Result<()>;
}

/// HTTP client for the hosted object-storage service
pub struct SnapshotClient {
    base_url: String,
    service_key: String,
    client: reqwest::Client,
}

impl SnapshotClient {
    pub fn new(base_url: String, service_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            client,
        })
    }
}

#[async_trait]
impl SnapshotStore for SnapshotClient {
    async fn upload_pdf(&self, path: &str, bytes: Vec<u8>) -> Result<()> {
        let url = format!("{}/object/{}/{}", self.base_url, SNAPSHOT_BUCKET, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, "application/pdf")
            .body(bytes)
            .send()
            .await
            .context("Snapshot upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Snapshot upload rejected with {status}: {body}");
        }

        Ok(())
    }
}
