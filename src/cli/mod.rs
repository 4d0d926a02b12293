//! Command-line interface for viewreg.
//!
//! The binary builds a [`View`] from `viewreg.toml` (or `--config FILE`) plus
//! any `--dir` options, then runs one command against it.
//!
//! # Commands
//!
//! - `render <ALIAS>` - render a template with data from a JSON, YAML or TOML file
//! - `list` - list the registered aliases
//! - `check` - register everything, reload once, and report templates that fail
//!
//! # Global Options
//!
//! - `--config FILE` - configuration file (default: `./viewreg.toml` when present)
//! - `--dir DIR` - register a directory with an empty alias prefix (repeatable)
//! - `--ext EXT` - extension filter for `--dir` directories (repeatable)
//! - `--no-recursive` - do not descend into subdirectories of `--dir` directories
//! - `--verbose` / `--quiet` - more or less log output on stderr
//!
//! # Example
//!
//! ```bash
//! viewreg --dir templates --ext .tmpl list
//! viewreg --dir templates render mail/welcome.tmpl --data user.json
//! viewreg --config site/viewreg.toml check
//! ```

mod check;
mod list;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::{DirectoryConfig, ViewConfig};
use crate::templating::{View, resolve_path};

/// Log filter used when neither `RUST_LOG` nor `--verbose` is given.
const DEFAULT_LOG_FILTER: &str = "error";

#[derive(Parser, Debug)]
#[command(
    name = "viewreg",
    about = "Register, render and hot-reload Tera templates from disk",
    version,
    long_about = "viewreg loads template files into aliases, renders them with structured data, \
                  and checks that every registered template still loads and compiles."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./viewreg.toml when present)
    #[arg(short, long, global = true, env = "VIEWREG_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Register a directory with an empty alias prefix
    #[arg(long = "dir", global = true, value_name = "DIR")]
    dirs: Vec<PathBuf>,

    /// Only register files with this extension from --dir directories
    #[arg(long = "ext", global = true, value_name = "EXT")]
    extensions: Vec<String>,

    /// Do not descend into subdirectories of --dir directories
    #[arg(long, global = true)]
    no_recursive: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template to stdout or a file
    Render(render::RenderCommand),

    /// List registered template aliases
    List(list::ListCommand),

    /// Reload every template and report the ones that fail
    Check(check::CheckCommand),
}

impl Cli {
    /// Install the tracing subscriber for this invocation.
    ///
    /// `--verbose` and `--quiet` take precedence over `RUST_LOG`.
    pub fn init_logging(&self) {
        let filter = if self.verbose {
            EnvFilter::new("viewreg=debug")
        } else if self.quiet {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init();
    }

    /// Build the view and run the selected command.
    pub fn execute(self) -> Result<()> {
        let view = self.build_view()?;

        match self.command {
            Commands::Render(cmd) => cmd.execute(&view),
            Commands::List(cmd) => cmd.execute(&view),
            Commands::Check(cmd) => cmd.execute(&view),
        }
    }

    /// The effective configuration: the config file plus `--dir` options.
    pub fn load_config(&self) -> Result<ViewConfig> {
        let mut config = ViewConfig::load_or_default(self.config.as_deref())?;

        // --dir paths are relative to the working directory, not the config file
        for dir in &self.dirs {
            config.push_directory(DirectoryConfig {
                prefix: String::new(),
                path: resolve_path(dir)?,
                extensions: self.extensions.clone(),
                recursive: !self.no_recursive,
            });
        }

        Ok(config)
    }

    fn build_view(&self) -> Result<View> {
        let config = self.load_config()?;
        if config.is_empty() {
            tracing::warn!("Nothing to register: no viewreg.toml found and no --dir given");
        }

        let view = config.builder().build();
        config.apply(&view)?;
        tracing::debug!("Registered {} templates", view.aliases().len());
        Ok(view)
    }
}
