// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Setup failures (config, output root, git revision, storage client) use
//! plain `anyhow` and abort the run from `lib.rs`. Once the per-job
//! pipelines are running, every failure is classified as a [`StageError`]
//! so it can be logged with full job context and isolated to that job.

pub use anyhow::{Error, Result};

use thiserror::Error;

/// A failure inside one job's pipeline.
///
/// A `StageError` terminates only the job it belongs to; the orchestrator
/// logs it and keeps the remaining jobs running.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("build error {job}: {source}")]
    Build {
        job: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("execution error {job}-{month}-{year}: {source}")]
    Exec {
        job: String,
        month: u32,
        year: i32,
        #[source]
        source: anyhow::Error,
    },

    /// Decode or persistence failure after a successful execution.
    #[error("store error {job}-{month}-{year}: {source}")]
    Store {
        job: String,
        month: u32,
        year: i32,
        #[source]
        source: anyhow::Error,
    },

    /// Failure writing a stage's output to the backup root.
    #[error("backup error {job} ({label}): {source}")]
    Backup {
        job: String,
        label: String,
        #[source]
        source: anyhow::Error,
    },
}

impl StageError {
    /// Name of the job this error belongs to.
    pub fn job(&self) -> &str {
        match self {
            StageError::Build { job, .. }
            | StageError::Exec { job, .. }
            | StageError::Store { job, .. }
            | StageError::Backup { job, .. } => job,
        }
    }

    /// Whether this is a backup-write failure (tracked separately by the
    /// orchestrator so audit-trail problems surface in the run summary).
    pub fn is_backup(&self) -> bool {
        matches!(self, StageError::Backup { .. })
    }
}
