use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Print `value` as JSON or YAML; returns false for human output so the
/// caller renders its own text
pub fn emit<T: Serialize>(format: &OutputFormat, value: &T) -> Result<bool> {
    match format {
        OutputFormat::Human => Ok(false),
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(value).context("Failed to encode JSON")?;
            println!("{}", text);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let text = serde_yaml::to_string(value).context("Failed to encode YAML")?;
            print!("{}", text);
            Ok(true)
        }
    }
}
