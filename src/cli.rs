// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::loader::default_config_path;

/// Command-line arguments for `coletor`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "coletor",
    version,
    about = "Build, run and persist a batch of containerised data collectors.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Coletor.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Target month (1-12). Overrides the value in the config file.
    #[arg(long, value_name = "MONTH")]
    pub month: Option<u32>,

    /// Target year. Overrides the value in the config file.
    #[arg(long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Comma-separated list of job paths to run, overriding the config file.
    #[arg(long, value_name = "PATHS", value_delimiter = ',')]
    pub jobs: Option<Vec<String>>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `COLETOR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the job plan, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
