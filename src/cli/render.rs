//! The `render` command.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;

use crate::templating::View;

/// Render a template with data from a file.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Alias of the template to render
    alias: String,

    /// Template data: a .json, .yaml/.yml or .toml file holding a map
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Write the output to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn execute(self, view: &View) -> Result<()> {
        let data = match &self.data {
            Some(path) => load_data(path)?,
            None => Value::Null,
        };

        let rendered = view.render(&self.alias, &data)?;

        match &self.output {
            Some(path) => std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output to {}", path.display()))?,
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&rendered).context("Failed to write output")?;
                stdout.flush().context("Failed to write output")?;
            }
        }

        tracing::debug!("Rendered '{}' ({} bytes)", self.alias, rendered.len());
        Ok(())
    }
}

/// Read template data, choosing the format by file extension.
fn load_data(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let value: Value = match extension.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON data: {}", path.display()))?,
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML data: {}", path.display()))?,
        "toml" => toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML data: {}", path.display()))?,
        _ => bail!(
            "Unsupported data file '{}': expected a .json, .yaml, .yml or .toml extension",
            path.display()
        ),
    };

    Ok(value)
}
