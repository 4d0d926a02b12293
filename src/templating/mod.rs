//! File-backed Tera template registry with atomic hot-reload.
//!
//! This module provides [`View`], a registry that loads template files into one
//! addressable namespace of aliases, renders them concurrently, and rebuilds the
//! whole set from disk on demand.
//!
//! # Overview
//!
//! A view owns two pieces of state:
//! - the **alias index**: alias → absolute source path, the record of what should
//!   be loaded
//! - the **compiled set**: the current [`Generation`], an immutable Tera instance
//!   holding every template that loaded successfully
//!
//! Every alias in the compiled set is in the index. The reverse does not hold:
//! an alias whose file vanished stays tracked so a later refresh can pick it up
//! again.
//!
//! # Registration
//!
//! [`View::add_template`] reads one file, passes it through the optional
//! [`Preprocessor`], compiles it and publishes a new generation that contains it.
//! [`View::add_dir`] walks a directory (optionally recursively) and registers
//! each matching file under `prefix/relative/path`. Both stop at the first error
//! and leave the view exactly as it was for the failing alias.
//!
//! # Rendering
//!
//! [`View::render`] accepts any `serde::Serialize` value as template data. A
//! render pins the generation that is current when it starts and uses it for the
//! whole call, including `{% include %}` and `{% extends %}` lookups, so it never
//! mixes templates from two generations.
//!
//! # Refresh
//!
//! [`View::refresh`] re-reads every tracked path and compiles a fresh generation
//! in isolation. Templates that are missing, unreadable or no longer compile are
//! reported as dropped instead of failing the refresh; they stay in the alias
//! index. The new generation is published in one step once every alias has been
//! attempted.
//!
//! # Concurrency
//!
//! - Renders only take a read lock long enough to clone an `Arc<Generation>`.
//! - Registration and refresh are serialized by a writer mutex, then publish
//!   under a short write lock.
//! - File I/O and compilation never happen while the state lock is held.
//!
//! # Examples
//!
//! ```rust,no_run
//! use serde_json::json;
//! use viewreg::templating::View;
//!
//! # fn main() -> Result<(), viewreg::core::ViewError> {
//! let view = View::default();
//! view.add_dir("", "templates", [".tmpl"], true)?;
//!
//! let out = view.render("a.tmpl", &json!({ "Name": "Amy" }))?;
//! assert_eq!(out, b"Hello Amy");
//!
//! // templates/a.tmpl is deleted on disk
//! let dropped = view.refresh();
//! assert_eq!(dropped, vec!["a.tmpl".to_string()]);
//! # Ok(())
//! # }
//! ```

mod alias;
mod compiler;
mod generation;
mod helpers;
mod loader;
mod preprocess;
mod refresh;
mod view;


pub use alias::{ExtensionFilter, join_alias, normalize_alias, suggest_aliases};
pub use generation::Generation;
pub use helpers::Helpers;
pub use loader::{DirEntry, DirectoryProvider, WalkDirProvider, load_source, resolve_path};
pub use preprocess::Preprocessor;
pub use refresh::{DroppedTemplate, RefreshReport};
pub use view::{View, ViewBuilder};
