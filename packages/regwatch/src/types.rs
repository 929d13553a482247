use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Unique identifier for a tracked document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a captured version row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentVersionId(pub Uuid);

impl DocumentVersionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DocumentVersionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle state of a document row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Queued for this job by the ingestion process
    Pending,
    /// Last check completed, changed or not
    Active,
    /// Last check failed; an external process may re-queue it
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Active => "active",
            DocumentStatus::Error => "error",
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DocumentStatus::Pending),
            "active" => Ok(DocumentStatus::Active),
            "error" => Ok(DocumentStatus::Error),
            other => Err(anyhow::anyhow!("unknown document status: {other}")),
        }
    }
}

/// Lowercase hex SHA-256 digest of rendered page text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    pub fn from_text(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        Self(hex::encode(digest))
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tracked regulatory document row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegDocument {
    pub id: DocumentId,
    pub canonical_url: String,
    pub status: DocumentStatus,
    pub latest_version: Option<i32>,
    pub content_hash: Option<ContentHash>,
    pub title: Option<String>,
    pub full_text: Option<String>,
    pub snapshot_path: Option<String>,
    pub retrieved_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl RegDocument {
    /// Version number the next capture should carry.
    ///
    /// A document with no stored hash keeps whatever version number the row
    /// already holds (first capture defaults to 1); otherwise the stored
    /// number is incremented.
    pub fn next_version(&self) -> i32 {
        match self.content_hash {
            Some(_) => self.latest_version.unwrap_or(0) + 1,
            None => self.latest_version.unwrap_or(1),
        }
    }
}

/// Outcome of a single document check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Changed { version: i32 },
    Unchanged,
}

/// Fields persisted when a content change is captured: the mutated document
/// row and the append-only version row share these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedVersion {
    pub document_id: DocumentId,
    pub version: i32,
    pub title: Option<String>,
    pub full_text: String,
    pub content_hash: ContentHash,
    pub snapshot_path: String,
    pub retrieved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(latest_version: Option<i32>, content_hash: Option<&str>) -> RegDocument {
        RegDocument {
            id: DocumentId::new(),
            canonical_url: "https://example.gov/rule".to_string(),
            status: DocumentStatus::Pending,
            latest_version,
            content_hash: content_hash.map(|h| ContentHash(h.to_string())),
            title: None,
            full_text: None,
            snapshot_path: None,
            retrieved_at: None,
            last_checked_at: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn first_capture_defaults_to_version_one() {
        assert_eq!(document(None, None).next_version(), 1);
    }

    #[test]
    fn stored_version_is_reused_when_hash_absent() {
        assert_eq!(document(Some(3), None).next_version(), 3);
    }

    #[test]
    fn stored_version_increments_when_hash_present() {
        assert_eq!(document(Some(3), Some("abc")).next_version(), 4);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            DocumentStatus::Pending,
            DocumentStatus::Active,
            DocumentStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
        }
        assert!("archived".parse::<DocumentStatus>().is_err());
    }
}
