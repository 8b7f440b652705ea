// src/lib.rs

pub mod backup;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod storage;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_from_path;
use crate::config::model::Settings;
use crate::config::validate::validate_settings;
use crate::pipeline::Orchestrator;
use crate::storage::{Client, StorageClient};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - output-root creation
/// - build-identifier (git revision) resolution
/// - persistence client construction
/// - the concurrent job orchestrator
///
/// Everything up to launching the pipelines is a fatal setup error; once
/// the pipelines run, per-job failures are logged but never turn into a
/// non-zero exit of the whole run.
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = Arc::new(load_settings(&args.config, &args)?);

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    fs::create_dir_all(&settings.output_folder).with_context(|| {
        format!(
            "creating output folder at {:?}",
            settings.output_folder
        )
    })?;

    let revision = exec::runner::git_head_revision(&env::current_dir()?).await?;
    info!(revision = %revision, "resolved build identifier");

    let storage: Arc<dyn StorageClient> =
        Arc::new(Client::connect(&settings.database, &settings.blob).await?);

    let orchestrator = Orchestrator::new(settings, storage, revision);
    orchestrator.run().await?;

    info!("finished");
    Ok(())
}

/// Load settings from the config file, apply CLI overrides, canonicalize
/// the output root, then validate the combined result.
fn load_settings(config_path: &std::path::Path, args: &CliArgs) -> Result<Settings> {
    let mut settings = load_from_path(config_path)?;

    if let Some(month) = args.month {
        settings.month = month;
    }
    if let Some(year) = args.year {
        settings.year = year;
    }
    if let Some(ref jobs) = args.jobs {
        settings.jobs = jobs.iter().map(PathBuf::from).collect();
    }

    validate_settings(&settings)?;

    // Absolute output root: the path is forwarded into job containers and
    // must not depend on their working directories.
    settings.output_folder = absolutize(&settings.output_folder)?;

    Ok(settings)
}

fn absolutize(path: &std::path::Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()
            .context("resolving current directory for the output folder")?
            .join(path))
    }
}

/// Simple dry-run output: print the resolved run plan without executing.
fn print_dry_run(settings: &Settings) {
    println!("coletor dry-run");
    println!("  target = {}-{}", settings.month, settings.year);
    println!("  output_folder = {}", settings.output_folder.display());
    println!(
        "  runner = {} (volume {}, max_parallel {})",
        settings.runner.tool, settings.runner.volume, settings.runner.max_parallel
    );
    println!();

    println!("jobs ({}):", settings.jobs.len());
    for job in settings.jobs.iter() {
        println!("  - {}", job.display());
    }
}
