//! `readerstats-config` — runtime configuration for readerstats.
//!
//! Provides:
//! - Typed config schema (storage, views, backend, presence, logging)
//! - YAML read/write with backup rotation
//! - `${ENV_VAR}` substitution and `READERSTATS_*` overrides
//! - Default value application
//! - Validation with warnings and errors
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, apply_env_overrides_with, collect_referenced_vars,
    contains_env_var_reference, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::{collect_redacted_paths, redact};
pub use schema::ReaderStatsConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load a config file and run it through env substitution, env overrides,
/// defaults, and validation.
///
/// This is the main entry point for loading a config at runtime. Validation
/// warnings are logged; validation errors fail the load.
pub async fn load_and_prepare(path: &Path) -> Result<ReaderStatsConfig> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: ReaderStatsConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config)?;
    let config = apply_all_defaults(config);
    check(&config)?;
    Ok(config)
}

/// Log the validation report and fail if it holds errors.
fn check(config: &ReaderStatsConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }
    Ok(())
}
