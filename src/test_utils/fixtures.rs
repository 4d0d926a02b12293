//! Test fixtures: template trees on disk and configuration files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory of template files.
///
/// Paths passed to its methods are relative to the root and use `/`.
/// The directory is deleted when the tree is dropped.
pub struct TemplateTree {
    temp_dir: TempDir,
}

impl TemplateTree {
    /// Create an empty tree.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        Ok(Self {
            temp_dir: TempDir::new().context("Failed to create template tree")?,
        })
    }

    /// Create a tree containing `files` as `(relative path, content)` pairs.
    pub fn with_files(files: &[(&str, &str)]) -> Result<Self> {
        let tree = Self::new()?;
        for (rel, content) in files {
            tree.write(rel, content)?;
        }
        Ok(tree)
    }

    /// Root directory of the tree.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a file in the tree (which may not exist).
    pub fn file(&self, rel: &str) -> PathBuf {
        self.path().join(rel)
    }

    /// Create or overwrite a file, creating parent directories as needed.
    pub fn write(&self, rel: &str, content: &str) -> Result<PathBuf> {
        let path = self.file(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Delete a file.
    pub fn remove(&self, rel: &str) -> Result<()> {
        let path = self.file(rel);
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))
    }

    /// Create an empty subdirectory.
    pub fn mkdir(&self, rel: &str) -> Result<PathBuf> {
        let path = self.file(rel);
        fs::create_dir_all(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(path)
    }
}

/// A `viewreg.toml` file's content.
#[derive(Clone, Debug)]
pub struct ConfigFixture {
    pub content: String,
}

impl ConfigFixture {
    /// Registers `templates/` recursively, `.tmpl` and `.html` files only.
    pub fn templates_dir() -> Self {
        Self {
            content: r#"
[[directories]]
path = "templates"
extensions = [".tmpl", ".html"]
"#
            .trim()
            .to_string(),
        }
    }

    /// Adds a single `layout` template on top of [`templates_dir`](Self::templates_dir).
    pub fn with_layout() -> Self {
        let mut fixture = Self::templates_dir();
        fixture.content.push_str("\n\n[templates]\nlayout = \"shared/layout.html\"\n");
        fixture
    }

    /// Write the fixture as `viewreg.toml` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(crate::config::CONFIG_FILE_NAME);
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write config fixture {}", path.display()))?;
        Ok(path)
    }
}
