// src/config/mod.rs

//! Configuration loading and validation for coletor.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like job list and date ranges (`validate.rs`).
//!
//! The loaded [`Settings`] value is immutable and passed explicitly to the
//! orchestrator and each job pipeline; there is no process-global config.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{BlobSection, DatabaseSection, RunnerSection, Settings};
pub use validate::validate_settings;
