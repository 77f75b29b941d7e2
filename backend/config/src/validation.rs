//! Config validation: schema checks with user-friendly error messages.

use crate::schema::ReaderStatsConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ReaderStatsConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_views(config, &mut report);
    validate_backend(config, &mut report);
    validate_storage(config, &mut report);
    validate_presence(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_views(config: &ReaderStatsConfig, report: &mut ValidationReport) {
    let Some(views) = &config.views else { return };
    match views.dedup_window_minutes {
        Some(0) => report.warn(
            "views.dedupWindowMinutes",
            "A zero window records every page load",
        ),
        Some(m) if m > 24 * 60 => report.warn(
            "views.dedupWindowMinutes",
            format!("{m} minutes is longer than a day; repeat visits will be undercounted"),
        ),
        _ => {}
    }
}

fn validate_backend(config: &ReaderStatsConfig, report: &mut ValidationReport) {
    let Some(backend) = &config.backend else { return };
    if let Some(url) = backend.url.as_deref().filter(|u| !u.trim().is_empty()) {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            report.error("backend.url", format!("'{url}' must start with http:// or https://"));
        }
        if backend.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
            report.warn("backend.apiKey", "No API key; the backend will likely reject requests");
        }
    }
}

fn validate_storage(config: &ReaderStatsConfig, report: &mut ValidationReport) {
    let Some(storage) = &config.storage else { return };
    if let Some(prefix) = &storage.key_prefix {
        if prefix.is_empty() {
            report.warn("storage.keyPrefix", "Empty key prefix; keys may collide with other apps");
        }
    }
    if storage.path.as_deref().map(|p| p.trim().is_empty()).unwrap_or(false) {
        report.error("storage.path", "Storage path cannot be empty");
    }
}

fn validate_presence(config: &ReaderStatsConfig, report: &mut ValidationReport) {
    let Some(presence) = &config.presence else { return };
    if presence.channel_prefix.as_deref() == Some("") {
        report.error("presence.channelPrefix", "Channel prefix cannot be empty");
    }
}

fn validate_logging(config: &ReaderStatsConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        let known = ["trace", "debug", "info", "warn", "error", "off"];
        if !known.contains(&level.to_ascii_lowercase().as_str()) && !level.contains('=') {
            report.warn(
                "logging.level",
                format!("Unknown log level '{level}'; expected one of {}", known.join(", ")),
            );
        }
    }
}
