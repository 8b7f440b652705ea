// src/config/validate.rs

use anyhow::{Result, anyhow};

use crate::config::model::Settings;

/// Run basic semantic validation against loaded settings.
///
/// This checks:
/// - there is at least one job
/// - `month` is in `1..=12` and `year` is plausible
/// - `[runner]` values are usable (`tool` non-empty, `max_parallel >= 1`)
/// - `[database]` and `[blob]` endpoints are present
///
/// It does **not** check that job paths exist; a missing path surfaces as a
/// build failure for that job only, keeping failure isolation per job.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    ensure_has_jobs(settings)?;
    validate_target_date(settings)?;
    validate_runner(settings)?;
    validate_backends(settings)?;
    Ok(())
}

fn ensure_has_jobs(settings: &Settings) -> Result<()> {
    if settings.jobs.is_empty() {
        return Err(anyhow!("config must contain at least one job path"));
    }
    for job in settings.jobs.iter() {
        if job.file_name().is_none() {
            return Err(anyhow!(
                "job path {:?} has no basename to use as a job name",
                job
            ));
        }
    }
    Ok(())
}

fn validate_target_date(settings: &Settings) -> Result<()> {
    if !(1..=12).contains(&settings.month) {
        return Err(anyhow!(
            "month must be between 1 and 12 (got {})",
            settings.month
        ));
    }
    if settings.year < 2000 {
        return Err(anyhow!(
            "year {} is before any collected data exists",
            settings.year
        ));
    }
    Ok(())
}

fn validate_runner(settings: &Settings) -> Result<()> {
    if settings.runner.tool.trim().is_empty() {
        return Err(anyhow!("[runner].tool must not be empty"));
    }
    if settings.runner.volume.trim().is_empty() {
        return Err(anyhow!("[runner].volume must not be empty"));
    }
    if settings.runner.max_parallel == 0 {
        return Err(anyhow!("[runner].max_parallel must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_backends(settings: &Settings) -> Result<()> {
    if settings.database.url.trim().is_empty() {
        return Err(anyhow!("[database].url must not be empty"));
    }
    if settings.blob.endpoint.trim().is_empty() {
        return Err(anyhow!("[blob].endpoint must not be empty"));
    }
    if settings.blob.container.trim().is_empty() {
        return Err(anyhow!("[blob].container must not be empty"));
    }
    Ok(())
}
