//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names match; `$${VAR}` escapes to a
//!   literal `${VAR}`.
//! - `READERSTATS_*` variables that override individual settings after the
//!   file has been read.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{
    BackendConfig, LoggingConfig, ReaderStatsConfig, StorageConfig, ViewsConfig,
};

/// `${VAR}`, optionally preceded by an escaping `$`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var regex"));

pub const ENV_BACKEND_URL: &str = "READERSTATS_BACKEND_URL";
pub const ENV_API_KEY: &str = "READERSTATS_API_KEY";
pub const ENV_LOG_LEVEL: &str = "READERSTATS_LOG_LEVEL";
pub const ENV_DEDUP_WINDOW: &str = "READERSTATS_DEDUP_WINDOW_MINUTES";
pub const ENV_STORAGE_PATH: &str = "READERSTATS_STORAGE_PATH";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree using the
/// process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Check whether a string contains any unescaped env var references.
pub fn contains_env_var_reference(s: &str) -> bool {
    ENV_VAR_PATTERN
        .captures_iter(s)
        .any(|caps| caps[1].is_empty())
}

/// Collect all env var names referenced in a config value tree.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars_recursive(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars_recursive(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for caps in ENV_VAR_PATTERN.captures_iter(s) {
                if caps[1].is_empty() {
                    out.push(caps[2].to_string());
                }
            }
        }
        Value::Array(arr) => arr.iter().for_each(|v| collect_vars_recursive(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars_recursive(v, out)),
        _ => {}
    }
}

/// Apply `READERSTATS_*` overrides from the process environment.
pub fn apply_env_overrides(config: ReaderStatsConfig) -> Result<ReaderStatsConfig> {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply `READERSTATS_*` overrides from a provided map. Empty values are ignored.
pub fn apply_env_overrides_with(
    mut config: ReaderStatsConfig,
    env: &HashMap<String, String>,
) -> Result<ReaderStatsConfig> {
    let get = |name: &str| env.get(name).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(url) = get(ENV_BACKEND_URL) {
        config.backend.get_or_insert_with(BackendConfig::default).url = Some(url);
    }
    if let Some(key) = get(ENV_API_KEY) {
        config.backend.get_or_insert_with(BackendConfig::default).api_key = Some(key);
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level);
    }
    if let Some(path) = get(ENV_STORAGE_PATH) {
        config.storage.get_or_insert_with(StorageConfig::default).path = Some(path);
    }
    if let Some(raw) = get(ENV_DEDUP_WINDOW) {
        let minutes: u64 = raw.trim().parse().with_context(|| {
            format!("{ENV_DEDUP_WINDOW} must be a whole number of minutes, got '{raw}'")
        })?;
        config
            .views
            .get_or_insert_with(ViewsConfig::default)
            .dedup_window_minutes = Some(minutes);
    }
    Ok(config)
}
