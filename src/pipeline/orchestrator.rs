// src/pipeline/orchestrator.rs

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::backup::BackupWriter;
use crate::config::model::Settings;
use crate::errors::StageError;
use crate::pipeline::job::{Job, JobPipeline};
use crate::storage::StorageClient;

/// Fans the job list out to concurrent [`JobPipeline`] tasks and waits for
/// all of them.
///
/// Admission is gated by a semaphore of `[runner].max_parallel` permits, so
/// the number of simultaneously running external processes stays bounded no
/// matter how long the job list grows.
///
/// The orchestrator aggregates nothing: each job's success or failure is
/// observable only through the log (one error line per failed job) and its
/// backup artifacts. It returns `Ok(())` regardless of per-job outcomes;
/// only being unable to even start a job's task is an error here.
pub struct Orchestrator {
    settings: Arc<Settings>,
    pipeline: Arc<JobPipeline>,
}

impl Orchestrator {
    pub fn new(
        settings: Arc<Settings>,
        storage: Arc<dyn StorageClient>,
        revision: String,
    ) -> Self {
        let backups = BackupWriter::new(
            settings.output_folder.clone(),
            settings.month,
            settings.year,
        );
        let pipeline = Arc::new(JobPipeline::new(
            settings.clone(),
            storage,
            backups,
            revision,
        ));
        Self { settings, pipeline }
    }

    /// Run every configured job to completion.
    pub async fn run(&self) -> Result<()> {
        let jobs = self
            .settings
            .jobs
            .iter()
            .map(|path| Job::from_path(path.clone()))
            .collect::<Result<Vec<_>>>()?;

        info!(
            jobs = jobs.len(),
            max_parallel = self.settings.runner.max_parallel,
            "starting job pipelines"
        );

        let semaphore = Arc::new(Semaphore::new(self.settings.runner.max_parallel));
        let mut tasks = JoinSet::new();

        for job in jobs {
            let semaphore = semaphore.clone();
            let pipeline = self.pipeline.clone();

            tasks.spawn(async move {
                // The semaphore lives for the whole run and is never closed.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("job semaphore closed");
                let outcome = pipeline.run(&job).await;
                (job.name().to_string(), outcome)
            });
        }

        let mut backup_failures = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((job, Err(err))) => {
                    log_stage_error(&job, &err);
                    if err.is_backup() {
                        backup_failures += 1;
                    }
                }
                Err(join_err) => {
                    error!(error = %join_err, "job task aborted unexpectedly");
                }
            }
        }

        if backup_failures > 0 {
            error!(
                count = backup_failures,
                root = %self.settings.output_folder.display(),
                "backup artifacts could not be written; audit trail is incomplete for this run"
            );
        }

        info!("all job pipelines finished");
        Ok(())
    }
}

/// The single error line a failed job leaves in the run log.
fn log_stage_error(job: &str, err: &StageError) {
    error!(job = %job, "{err}");
}
