use crate::storage::DocumentStore;
use crate::types::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_document(row: &PgRow) -> Result<RegDocument> {
    let status: String = row.get("status");
    Ok(RegDocument {
        id: DocumentId(row.get("id")),
        canonical_url: row.get("canonical_url"),
        status: status.parse()?,
        latest_version: row.get("latest_version"),
        content_hash: row
            .get::<Option<String>, _>("content_hash")
            .map(ContentHash),
        title: row.get("title"),
        full_text: row.get("full_text"),
        snapshot_path: row.get("snapshot_path"),
        retrieved_at: row.get("retrieved_at"),
        last_checked_at: row.get("last_checked_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn fetch_pending(&self, limit: i64) -> Result<Vec<RegDocument>> {
        let rows = sqlx::query(
            r#"
            SELECT id, canonical_url, status, latest_version, content_hash,
                   title, full_text, snapshot_path,
                   retrieved_at, last_checked_at, updated_at
            FROM reg_documents
            WHERE status = $1
            LIMIT $2
            "#,
        )
        .bind(DocumentStatus::Pending.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch pending documents")?;

        rows.iter().map(row_to_document).collect()
    }

    async fn save_capture(&self, capture: &CapturedVersion) -> Result<()> {
        // One transaction: the document row and its version history never
        // diverge, even if the process dies between the two statements.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE reg_documents
            SET title = $2,
                status = $3,
                latest_version = $4,
                snapshot_path = $5,
                full_text = $6,
                content_hash = $7,
                retrieved_at = $8,
                last_checked_at = $8,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(capture.document_id.0)
        .bind(&capture.title)
        .bind(DocumentStatus::Active.as_str())
        .bind(capture.version)
        .bind(&capture.snapshot_path)
        .bind(&capture.full_text)
        .bind(&capture.content_hash.0)
        .bind(capture.retrieved_at)
        .execute(&mut *tx)
        .await
        .context("Failed to update document row")?;

        sqlx::query(
            r#"
            INSERT INTO reg_document_versions (
                id, document_id, version, title, snapshot_path,
                full_text, content_hash, retrieved_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(DocumentVersionId::new().0)
        .bind(capture.document_id.0)
        .bind(capture.version)
        .bind(&capture.title)
        .bind(&capture.snapshot_path)
        .bind(&capture.full_text)
        .bind(&capture.content_hash.0)
        .bind(capture.retrieved_at)
        .execute(&mut *tx)
        .await
        .context("Failed to insert version row")?;

        tx.commit().await.context("Failed to commit capture")?;
        Ok(())
    }

    async fn mark_checked(&self, id: DocumentId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE reg_documents
            SET status = $2, last_checked_at = $3, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(DocumentStatus::Active.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to mark document checked")?;
        Ok(())
    }

    async fn mark_error(&self, id: DocumentId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE reg_documents
            SET status = $2, last_checked_at = $3, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(DocumentStatus::Error.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to mark document errored")?;
        Ok(())
    }
}
