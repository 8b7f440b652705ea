// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::model::Settings;
use crate::config::validate::validate_settings;

/// Load a configuration file from a given path and return the raw `Settings`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (date ranges, job list, etc.). Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let settings: Settings = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(settings)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - an empty job list,
///   - out-of-range month,
///   - zero `max_parallel`,
///   - missing backend endpoints.
///
/// CLI overrides (`--month`, `--year`, `--jobs`) are applied by the caller
/// *before* validation, so overridden values go through the same checks.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let settings = load_from_path(&path)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `Coletor.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `COLETOR_CONFIG`).
/// - Look for multiple default locations.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Coletor.toml")
}
