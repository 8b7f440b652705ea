// src/backup/writer.rs

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

/// Writes captured stage output to timestamped, write-once artifact files.
///
/// Artifact paths are deterministic:
/// `<root>/<job>(<month>-<year>)-<label>-<timestamp>`, where the timestamp
/// carries nanosecond precision so concurrent stages of the same job can
/// never collide on a path.
///
/// One writer is shared by all concurrent job pipelines; distinct job names
/// and labels keep independent writers from conflicting.
#[derive(Debug, Clone)]
pub struct BackupWriter {
    root: PathBuf,
    month: u32,
    year: i32,
}

impl BackupWriter {
    pub fn new(root: impl Into<PathBuf>, month: u32, year: i32) -> Self {
        Self {
            root: root.into(),
            month,
            year,
        }
    }

    /// Root directory artifacts are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist one stage's captured stream.
    ///
    /// A stage that produced no output leaves no artifact: an empty buffer
    /// returns `Ok(None)` without touching the filesystem. Otherwise exactly
    /// one new file is created containing `content` verbatim, and its path
    /// is returned.
    ///
    /// An I/O failure here is an error for the calling job only; the caller
    /// decides whether to escalate it.
    pub fn write(&self, job: &str, label: &str, content: &[u8]) -> Result<Option<PathBuf>> {
        if content.is_empty() {
            return Ok(None);
        }

        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.9f");
        let name = format!(
            "{}({}-{})-{}-{}",
            job, self.month, self.year, label, timestamp
        );
        let path = self.root.join(name);

        let mut file = File::create(&path)
            .with_context(|| format!("creating backup file at {:?}", path))?;
        file.write_all(content)
            .with_context(|| format!("writing backup file at {:?}", path))?;

        debug!(job = %job, label = %label, path = %path.display(), "backup artifact written");
        Ok(Some(path))
    }
}
