// src/storage/pg.rs

//! Postgres-backed persistence client.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::model::{BlobSection, DatabaseSection};
use crate::envelope::CrawlResult;
use crate::storage::StorageClient;

/// Persistence client holding the database pool and the blob backend
/// settings a run was configured with.
pub struct Client {
    pool: PgPool,
    blob: BlobSection,
}

impl Client {
    /// Connect to the configured backends.
    ///
    /// Construction failure (bad URL, unreachable database, incomplete blob
    /// settings) is a setup error: the caller aborts the run before any job
    /// starts.
    pub async fn connect(database: &DatabaseSection, blob: &BlobSection) -> Result<Self> {
        if blob.endpoint.trim().is_empty() || blob.container.trim().is_empty() {
            return Err(anyhow!("blob storage endpoint/container not configured"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database.url)
            .await
            .context("connecting to the results database")?;

        Ok(Self {
            pool,
            blob: blob.clone(),
        })
    }
}

#[async_trait]
impl StorageClient for Client {
    /// Store one decoded result.
    ///
    /// Each call inserts a new row; re-running a job for the same
    /// month/year stores a new record. Deduplication, if any, belongs to
    /// the database schema, not this client.
    async fn store(&self, result: CrawlResult) -> Result<()> {
        let payload =
            serde_json::to_value(&result).context("serializing crawl result for storage")?;

        sqlx::query(
            "INSERT INTO crawl_results (agency_id, month, year, payload, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&result.agency_id)
        .bind(result.month as i32)
        .bind(result.year)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("inserting crawl result")?;

        // TODO: upload result.files to the configured blob container once
        // the object-store side of the gateway lands.
        info!(
            agency = %result.agency_id,
            files = result.files.len(),
            container = %self.blob.container,
            "crawl result stored"
        );

        Ok(())
    }
}
