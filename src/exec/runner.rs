// src/exec/runner.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Exit status recorded when a process was terminated by a signal and never
/// reported an exit code.
pub const STATUS_SIGNALED: i32 = -1;

/// Exit status recorded when the process could not be started at all.
pub const STATUS_NOT_STARTED: i32 = -2;

/// Captured outcome of running one external command.
///
/// Created once per pipeline stage and immutable afterwards. On the execute
/// stage it is folded into the persisted envelope as provenance; on the
/// build stage only its streams are kept (as backup artifacts).
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Raw bytes captured from stdout.
    pub stdout: Vec<u8>,
    /// Raw bytes captured from stderr.
    pub stderr: Vec<u8>,
    /// The exact command-line tokens executed, program first.
    pub cmd: Vec<String>,
    /// Working directory the command ran in.
    pub dir: PathBuf,
    /// Exit status: 0 success, positive = process exit code, negative =
    /// [`STATUS_SIGNALED`] / [`STATUS_NOT_STARTED`] sentinels.
    pub status: i32,
    /// Optional copy of the environment visible to the process.
    pub env: Option<Vec<String>>,

    /// OS-level reason when the process never started. Not part of the
    /// persisted provenance; kept for error reporting only.
    spawn_error: Option<String>,
}

/// Why a command did not complete with status 0.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("could not start process: {0}")]
    Spawn(String),

    #[error("process exited with status {0}")]
    Exit(i32),

    #[error("process terminated by a signal without an exit status")]
    Signaled,
}

impl ProcessResult {
    /// The command line as a single printable string (for logs).
    pub fn command_line(&self) -> String {
        self.cmd.join(" ")
    }

    /// Map the recorded status back to a success/error value.
    ///
    /// `Ok(())` exactly when the process ran to completion with status 0.
    pub fn outcome(&self) -> std::result::Result<(), CommandError> {
        match self.status {
            0 => Ok(()),
            STATUS_NOT_STARTED => Err(CommandError::Spawn(
                self.spawn_error
                    .clone()
                    .unwrap_or_else(|| "unknown spawn failure".to_string()),
            )),
            STATUS_SIGNALED => Err(CommandError::Signaled),
            code => Err(CommandError::Exit(code)),
        }
    }
}

/// Run one external command to completion, capturing stdout and stderr.
///
/// This never returns an `Err`: failures are folded into the returned
/// [`ProcessResult`]'s sentinel status so callers can always back up
/// whatever output exists before deciding what a failure means. Use
/// [`ProcessResult::outcome`] to classify the result.
///
/// The calling task blocks until the process exits; no timeout is enforced
/// here (the orchestrator's semaphore bounds how many of these run at once).
pub async fn run_command(tokens: &[String], dir: &Path) -> ProcessResult {
    let mut result = ProcessResult {
        stdout: Vec::new(),
        stderr: Vec::new(),
        cmd: tokens.to_vec(),
        dir: dir.to_path_buf(),
        status: STATUS_NOT_STARTED,
        env: None,
        spawn_error: None,
    };

    let Some((program, args)) = tokens.split_first() else {
        result.spawn_error = Some("empty command line".to_string());
        return result;
    };

    debug!(cmd = %tokens.join(" "), dir = %dir.display(), "running command");

    match Command::new(program).args(args).current_dir(dir).output().await {
        Ok(output) => {
            result.stdout = output.stdout;
            result.stderr = output.stderr;
            result.status = output.status.code().unwrap_or(STATUS_SIGNALED);
        }
        Err(err) => {
            result.spawn_error = Some(err.to_string());
        }
    }

    result
}

/// Resolve the build identifier stamped into every image of a run: the most
/// recent git revision of the repository at `dir`.
pub async fn git_head_revision(dir: &Path) -> Result<String> {
    let tokens: Vec<String> = ["git", "rev-list", "-1", "HEAD"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let result = run_command(&tokens, dir).await;
    result
        .outcome()
        .map_err(|err| anyhow!("{err}: {}", String::from_utf8_lossy(&result.stderr)))
        .context("resolving git HEAD revision")?;

    let revision = String::from_utf8_lossy(&result.stdout).trim().to_string();
    if revision.is_empty() {
        return Err(anyhow!("git returned an empty revision"));
    }
    Ok(revision)
}
