// src/exec/docker.rs

//! Argument-vector construction for the container tool.
//!
//! Commands are built as discrete token lists, never by formatting a single
//! string and re-splitting it, so paths with whitespace survive intact. The
//! tool program itself comes from `[runner].tool` so tests can point it at a
//! stub script instead of docker.

use std::path::Path;

use crate::config::model::RunnerSection;

/// Tokens for building a job's image:
///
/// `<tool> build --build-arg REVISION=<revision> -t <image> .`
///
/// Executed with the job's source path as working directory.
pub fn build_command(runner: &RunnerSection, image: &str, revision: &str) -> Vec<String> {
    vec![
        runner.tool.clone(),
        "build".to_string(),
        "--build-arg".to_string(),
        format!("REVISION={revision}"),
        "-t".to_string(),
        image.to_string(),
        ".".to_string(),
    ]
}

/// Tokens for executing a job's built image:
///
/// `<tool> run -v <volume>:/output --rm -e OUTPUT_FOLDER=<root>/<image>
/// --env-file=<env-file> <image> --month=<M> --year=<Y>`
///
/// The `OUTPUT_FOLDER` override scopes the job's produced files to its own
/// subdirectory of the shared output root.
pub fn run_collector_command(
    runner: &RunnerSection,
    image: &str,
    output_root: &Path,
    month: u32,
    year: i32,
) -> Vec<String> {
    vec![
        runner.tool.clone(),
        "run".to_string(),
        "-v".to_string(),
        format!("{}:/output", runner.volume),
        "--rm".to_string(),
        "-e".to_string(),
        format!("OUTPUT_FOLDER={}/{}", output_root.display(), image),
        format!("--env-file={}", runner.env_file),
        image.to_string(),
        format!("--month={month}"),
        format!("--year={year}"),
    ]
}
