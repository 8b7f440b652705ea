// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// This is a direct mapping of the expected file:
///
/// ```toml
/// output_folder = "out"
/// jobs = ["coletores/trt13", "coletores/mppe"]
/// month = 2
/// year = 2019
///
/// [runner]
/// tool = "docker"
/// volume = "dadosjusbr"
/// env_file = ".env"
/// max_parallel = 4
///
/// [database]
/// url = "postgres://coletor@localhost/coletor"
///
/// [blob]
/// endpoint = "https://objects.example.org"
/// container = "coletor-backups"
/// access_key = "..."
/// ```
///
/// The `[runner]` section is optional and has reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder for backup artifacts and per-job output directories.
    pub output_folder: PathBuf,

    /// Paths of the jobs to run. The basename of each path doubles as the
    /// job name and the container image tag.
    #[serde(default)]
    pub jobs: Vec<PathBuf>,

    /// Target month of the collection run (1-12).
    pub month: u32,

    /// Target year of the collection run.
    pub year: i32,

    /// Process-execution options from `[runner]`.
    #[serde(default)]
    pub runner: RunnerSection,

    /// Database backend from `[database]`.
    pub database: DatabaseSection,

    /// Blob storage backend from `[blob]`.
    pub blob: BlobSection,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// The container tool used to build and run jobs.
    ///
    /// Normally `"docker"`; tests substitute a stub script here.
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Name of the volume mounted at `/output` inside each job container.
    #[serde(default = "default_volume")]
    pub volume: String,

    /// Env file forwarded to each job container via `--env-file`.
    #[serde(default = "default_env_file")]
    pub env_file: String,

    /// Maximum number of job pipelines running at the same time.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

fn default_tool() -> String {
    "docker".to_string()
}

fn default_volume() -> String {
    "dadosjusbr".to_string()
}

fn default_env_file() -> String {
    ".env".to_string()
}

fn default_max_parallel() -> usize {
    4
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            volume: default_volume(),
            env_file: default_env_file(),
            max_parallel: default_max_parallel(),
        }
    }
}

/// `[database]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    /// Postgres connection URL.
    pub url: String,
}

/// `[blob]` section.
///
/// Credentials and endpoint for the object store that archives produced
/// files. Validated at startup so a misconfigured backend fails before any
/// job runs.
#[derive(Debug, Clone, Deserialize)]
pub struct BlobSection {
    pub endpoint: String,
    pub container: String,
    #[serde(default)]
    pub access_key: String,
}
