// src/pipeline/mod.rs

//! Per-job Build → Execute → Store pipeline and the concurrent orchestrator
//! that fans it out over the configured job list.
//!
//! - [`job`] owns [`job::Job`] and [`job::JobPipeline`], the strictly
//!   sequential three-stage state machine for one job.
//! - [`orchestrator`] launches one pipeline task per job, bounded by a
//!   semaphore, and waits for all of them.

pub mod job;
pub mod orchestrator;

pub use job::{Job, JobPipeline};
pub use orchestrator::Orchestrator;
