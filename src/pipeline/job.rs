// src/pipeline/job.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::info;

use crate::backup::BackupWriter;
use crate::config::model::Settings;
use crate::envelope::decode_crawl_result;
use crate::errors::StageError;
use crate::exec::{ProcessResult, docker, run_command};
use crate::storage::StorageClient;

/// One data-collection job, re-resolved from configuration each run.
///
/// The path points at the job's source directory (its build context); the
/// basename doubles as job name, image tag and output subdirectory.
#[derive(Debug, Clone)]
pub struct Job {
    path: PathBuf,
    name: String,
}

impl Job {
    /// Build a job from its configured source path.
    ///
    /// Fails when the path has no usable basename; config validation rejects
    /// such paths up front, so hitting this at run time is a setup error.
    pub fn from_path(path: PathBuf) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .ok_or_else(|| anyhow!("job path {:?} has no usable basename", path))?;
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Strictly sequential Build → Execute → Store state machine for one job.
///
/// Terminal on the first failing stage; no stage is retried and nothing is
/// rolled back (a built image is intentionally left in place when a later
/// stage fails, to aid debugging and skip rebuild cost on a manual re-run).
/// Stage output is always backed up, success or failure.
///
/// The pipeline holds no per-job mutable state, so one instance is shared by
/// all concurrent job tasks.
pub struct JobPipeline {
    settings: Arc<Settings>,
    storage: Arc<dyn StorageClient>,
    backups: BackupWriter,
    revision: String,
}

impl JobPipeline {
    pub fn new(
        settings: Arc<Settings>,
        storage: Arc<dyn StorageClient>,
        backups: BackupWriter,
        revision: String,
    ) -> Self {
        Self {
            settings,
            storage,
            backups,
            revision,
        }
    }

    /// Run all stages for `job`, stopping at the first failure.
    ///
    /// The returned error carries the job/stage/command context; the caller
    /// (orchestrator) is responsible for logging it exactly once.
    pub async fn run(&self, job: &Job) -> std::result::Result<(), StageError> {
        self.build_stage(job).await?;
        let execution = self.execute_stage(job).await?;
        self.store_stage(job, &execution).await?;
        Ok(())
    }

    /// Build the job's isolated execution environment, stamped with the
    /// run-wide revision. The captured result is discarded on success; only
    /// its backed-up streams outlive the stage.
    async fn build_stage(&self, job: &Job) -> std::result::Result<(), StageError> {
        let tokens = docker::build_command(&self.settings.runner, job.name(), &self.revision);
        let result = run_command(&tokens, job.path()).await;

        self.backup_streams(job, "build", &result)?;

        result.outcome().map_err(|err| StageError::Build {
            job: job.name().to_string(),
            source: anyhow!("command `{}`: {err}", result.command_line()),
        })?;

        info!(job = %job.name(), "image built");
        Ok(())
    }

    /// Execute the built environment against the configured month/year.
    async fn execute_stage(&self, job: &Job) -> std::result::Result<ProcessResult, StageError> {
        let tokens = docker::run_collector_command(
            &self.settings.runner,
            job.name(),
            &self.settings.output_folder,
            self.settings.month,
            self.settings.year,
        );
        let result = run_command(&tokens, job.path()).await;

        self.backup_streams(job, "exec", &result)?;

        result.outcome().map_err(|err| StageError::Exec {
            job: job.name().to_string(),
            month: self.settings.month,
            year: self.settings.year,
            source: anyhow!("command `{}`: {err}", result.command_line()),
        })?;

        info!(job = %job.name(), "data collector executed");
        Ok(result)
    }

    /// Decode the execute stage's stdout and hand the result to the
    /// persistence gateway. Decode failures and persistence failures are
    /// both Store-stage errors.
    async fn store_stage(
        &self,
        job: &Job,
        execution: &ProcessResult,
    ) -> std::result::Result<(), StageError> {
        let store_err = |source: anyhow::Error| StageError::Store {
            job: job.name().to_string(),
            month: self.settings.month,
            year: self.settings.year,
            source,
        };

        let result = decode_crawl_result(
            execution,
            job.name(),
            self.settings.month,
            self.settings.year,
        )
        .map_err(store_err)?;

        self.storage.store(result).await.map_err(store_err)?;

        info!(job = %job.name(), "store completed");
        Ok(())
    }

    /// Back up both captured streams of a stage, empty streams excluded.
    ///
    /// Both writes are attempted even if the first fails, so a stderr
    /// artifact is not lost to a stdout I/O error; the first failure is then
    /// reported for this job.
    fn backup_streams(
        &self,
        job: &Job,
        stage: &str,
        result: &ProcessResult,
    ) -> std::result::Result<(), StageError> {
        let streams = [
            (format!("{stage}.stdout"), &result.stdout),
            (format!("{stage}.stderr"), &result.stderr),
        ];

        let mut first_failure = None;
        for (label, content) in streams {
            if let Err(source) = self.backups.write(job.name(), &label, content) {
                first_failure.get_or_insert(StageError::Backup {
                    job: job.name().to_string(),
                    label,
                    source,
                });
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
