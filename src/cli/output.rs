use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print `value` in this format, using `human` for the human-readable form.
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, human: impl FnOnce() -> String) -> Result<()> {
        let text = match self {
            OutputFormat::Human => human(),
            OutputFormat::Json => serde_json::to_string_pretty(value).context("Failed to encode JSON")?,
            OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to encode YAML")?,
        };
        println!("{}", text.trim_end());
        Ok(())
    }
}
