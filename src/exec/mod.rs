// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running external commands with
//! `tokio::process::Command`, capturing their output for backup and
//! provenance purposes.
//!
//! - [`runner`] owns [`runner::ProcessResult`] and the synchronous-style
//!   `run_command` that drives one process to completion.
//! - [`docker`] builds the argument vectors for the container tool's
//!   `build` and `run` invocations.

pub mod docker;
pub mod runner;

pub use runner::{CommandError, ProcessResult, run_command};
