//! Reading template sources from disk.
//!
//! This covers the file-system side of registration and refresh:
//! - [`DirectoryProvider`]: single-level directory listings, swappable for tests
//!   or virtual trees
//! - [`resolve_path`]: turning user paths into the absolute paths the alias index stores
//! - [`load_source`]: stat, read, preprocess and decode one template file

use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use super::alias::dotted_extension;
use super::preprocess::Preprocessor;
use crate::core::ViewError;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name of the entry, without any directory components
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Whether the entry is a regular file
    pub is_file: bool,
}

impl DirEntry {
    /// A regular file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            is_file: true,
        }
    }

    /// A directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            is_file: false,
        }
    }
}

/// Lists the immediate children of a directory.
///
/// Entries that are neither directories nor regular files (sockets, symlinks
/// when the provider does not follow them, ...) are reported with both flags
/// unset and skipped by the registry.
pub trait DirectoryProvider: Send + Sync {
    /// List the entries of `dir`. The order is the order of registration.
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;
}

/// Default [`DirectoryProvider`] backed by `walkdir`.
///
/// Listings are sorted by file name so registration order (and therefore
/// "last write wins" between aliases) is deterministic. Symbolic links are not
/// followed, matching the single-file registration's refusal of non-regular files.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkDirProvider {
    follow_links: bool,
}

impl WalkDirProvider {
    /// Create a provider that does not follow symbolic links.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            follow_links: false,
        }
    }

    /// Treat symbolic links as the entries they point to.
    #[must_use]
    pub const fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }
}

impl DirectoryProvider for WalkDirProvider {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        if !std::fs::metadata(dir)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", dir.display()),
            ));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_links)
            .sort_by_file_name();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            let Some(name) = entry.file_name().to_str() else {
                tracing::warn!("Skipping {}: file name is not UTF-8", entry.path().display());
                continue;
            };
            let file_type = entry.file_type();
            entries.push(DirEntry {
                name: name.to_string(),
                is_dir: file_type.is_dir(),
                is_file: file_type.is_file(),
            });
        }
        Ok(entries)
    }
}

/// Resolve a path to an absolute, lexically normalized path.
///
/// Symbolic links are not resolved, so the alias index records the path the
/// caller named. `.` components are dropped and `..` removes the previous
/// normal component.
pub fn resolve_path(path: &Path) -> Result<PathBuf, ViewError> {
    let absolute = std::path::absolute(path).map_err(|e| ViewError::io(path, e))?;
    Ok(normalize_path(&absolute))
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Read one template source, applying the preprocessor when present.
///
/// Fails with `NotFound` when the path is missing, `NotRegularFile` for
/// directories and special files, `Io` when stat or read fails otherwise, and
/// `Encoding` when the preprocessed bytes are not UTF-8.
pub fn load_source(path: &Path, hook: Option<&dyn Preprocessor>) -> Result<String, ViewError> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ViewError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ViewError::io(path, e),
    })?;

    if !metadata.is_file() {
        return Err(ViewError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }

    let mut bytes = std::fs::read(path).map_err(|e| ViewError::io(path, e))?;

    if let Some(hook) = hook {
        let extension = dotted_extension(path);
        bytes = hook.process(&extension, bytes);
        tracing::trace!("Preprocessed {} ({} bytes)", path.display(), bytes.len());
    }

    String::from_utf8(bytes).map_err(|source| ViewError::Encoding {
        path: path.to_path_buf(),
        source,
    })
}
