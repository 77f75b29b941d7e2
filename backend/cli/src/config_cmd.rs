//! `readerstats config`: show the effective config with secrets masked.

use std::path::Path;

use anyhow::{Context, Result};

use readerstats_config::{ReaderStatsConfig, collect_redacted_paths, redact, validate};

use crate::output::{dim, note_warn};

pub fn run(config: &ReaderStatsConfig, path: &Path) -> Result<()> {
    println!("{}", dim(&format!("# {}", path.display())));
    print!("{}", render(config)?);

    let report = validate(config);
    for w in &report.warnings {
        note_warn(&format!("{}: {}", w.path, w.message));
    }
    Ok(())
}

/// YAML of the config with every secret masked.
pub fn render(config: &ReaderStatsConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    let masked = redact(&value);
    let mut out = serde_yaml::to_string(&masked).context("Failed to render config as YAML")?;
    let hidden = collect_redacted_paths(&value);
    if !hidden.is_empty() {
        out.push_str(&format!("# masked: {}\n", hidden.join(", ")));
    }
    Ok(out)
}
