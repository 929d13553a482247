// Batch entry point: check every pending document once, then exit.

use anyhow::{Context, Result};
use regwatch::{check_pending_documents, ChromeRenderer, Config, PostgresStore, SnapshotClient};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,regwatch=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting regulatory document check");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let store = PostgresStore::new(pool);
    let snapshots = SnapshotClient::new(config.storage_url, config.storage_service_key)
        .context("Failed to create snapshot client")?;

    // One browser and one page for the whole run
    let renderer = ChromeRenderer::launch()
        .await
        .context("Failed to launch browser")?;

    let result = check_pending_documents(&store, &renderer, &snapshots).await;

    // Release the browser even when the batch query failed
    renderer.close().await;

    let summary = result?;
    tracing::info!(
        checked = summary.checked,
        changed = summary.changed,
        failed = summary.failed,
        "Run complete"
    );

    Ok(())
}
