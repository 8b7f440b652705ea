// src/storage/mod.rs

//! Persistence gateway for decoded crawl results.
//!
//! The pipeline only depends on the [`StorageClient`] trait: one atomic,
//! non-retryable `store` call per successfully executed job. The shipped
//! implementation ([`pg::Client`]) persists the full envelope to Postgres;
//! tests substitute an in-memory double.

pub mod pg;

use anyhow::Result;
use async_trait::async_trait;

use crate::envelope::CrawlResult;

/// Contract the pipeline consumes to durably store one decoded result.
///
/// Implementations must be safe for concurrent calls from independent job
/// pipelines. Errors are surfaced to the calling job's Store stage and never
/// retried here.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn store(&self, result: CrawlResult) -> Result<()>;
}

pub use pg::Client;
