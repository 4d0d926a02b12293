//! Registry configuration (`viewreg.toml`).
//!
//! A configuration file lists what to register into a [`View`]: whole directories
//! with an alias prefix and extension filter, and individual templates under
//! explicit aliases. It is read by the `viewreg` binary and can be used the same
//! way by applications embedding the registry.
//!
//! # Format
//!
//! ```toml
//! # Escape variables in .html/.htm/.xml templates (default: true)
//! autoescape = true
//!
//! # Registered first, in declaration order
//! [[directories]]
//! prefix = "mail"           # alias prefix (default: "")
//! path = "templates/mail"   # relative to this file
//! extensions = [".tmpl"]    # empty or omitted: every file
//! recursive = true          # default: true
//!
//! # Registered after all directories, in alias order
//! [templates]
//! layout = "shared/layout.html"
//! ```
//!
//! Relative paths are resolved against the directory containing the
//! configuration file, so the same file works from any working directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::ViewError;
use crate::templating::{View, ViewBuilder};

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "viewreg.toml";

/// What to register into a view, and how the view is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Autoescape `.html`, `.htm` and `.xml` templates
    #[serde(default = "default_true")]
    pub autoescape: bool,

    /// Directories to register, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<DirectoryConfig>,

    /// Individual templates, alias → path
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub templates: BTreeMap<String, PathBuf>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// One `[[directories]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub prefix: String,

    pub path: PathBuf,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,

    #[serde(default = "default_true")]
    pub recursive: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            autoescape: true,
            directories: Vec::new(),
            templates: BTreeMap::new(),
            base_dir: None,
        }
    }
}

impl ViewConfig {
    /// Load a configuration file.
    ///
    /// Relative paths inside it resolve against the file's directory.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| ViewError::Config {
                message: e.message().to_string(),
            })
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!(
            "Loaded {} ({} directories, {} templates)",
            path.display(),
            config.directories.len(),
            config.templates.len()
        );
        Ok(config)
    }

    /// Load the file at `path`, or `viewreg.toml` from the current directory.
    ///
    /// An explicitly named file must exist. Without one, a missing
    /// `viewreg.toml` yields the default (empty) configuration.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        let default_path = Path::new(CONFIG_FILE_NAME);
        if default_path.is_file() {
            Self::load_from(default_path)
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok(Self::default())
        }
    }

    /// Add a directory entry after those already configured.
    pub fn push_directory(&mut self, directory: DirectoryConfig) {
        self.directories.push(directory);
    }

    /// Whether nothing is configured for registration.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.templates.is_empty()
    }

    /// Resolve a configured path against the configuration file's directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// A view builder with this configuration's settings applied.
    pub fn builder(&self) -> ViewBuilder {
        let builder = View::builder();
        if self.autoescape {
            builder
        } else {
            builder.autoescape_off()
        }
    }

    /// Register everything configured into `view`.
    ///
    /// Directories come first in declaration order, then single templates in
    /// alias order. Stops at the first failure.
    pub fn apply(&self, view: &View) -> Result<()> {
        for directory in &self.directories {
            let path = self.resolve(&directory.path);
            view.add_dir(&directory.prefix, &path, &directory.extensions, directory.recursive)
                .with_context(|| format!("Failed to register directory {}", path.display()))?;
        }

        for (alias, path) in &self.templates {
            let path = self.resolve(path);
            view.add_template(alias, &path)
                .with_context(|| format!("Failed to register template '{alias}'"))?;
        }

        Ok(())
    }
}
