use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use micro_viz::VisualizerConfig;
use tracing::debug;

/// Starts from `preset` and applies the top-level keys of the TOML file at
/// `path`, if any.
pub fn load(preset: &str, path: Option<&Path>) -> Result<VisualizerConfig> {
    let base = VisualizerConfig::preset(preset)?;
    let Some(path) = path else {
        return Ok(base);
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = overlay(&base, &text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    debug!(preset, path = %path.display(), "config loaded");
    Ok(config)
}

/// A key present in `text` replaces the whole preset value, so a
/// `selection` or `energy_gate` table is never half-merged.
pub fn overlay(base: &VisualizerConfig, text: &str) -> Result<VisualizerConfig> {
    let overrides: toml::Table = toml::from_str(text)?;
    let toml::Value::Table(mut merged) = toml::Value::try_from(base)? else {
        bail!("config did not serialize to a table");
    };
    merged.extend(overrides);
    Ok(toml::Value::Table(merged).try_into()?)
}
