//! viewreg - a file-backed template registry with atomic hot-reload
//!
//! viewreg loads template files from disk into one namespace of aliases, renders
//! them concurrently against `serde` data, and rebuilds the whole set from disk on
//! demand without ever exposing a half-built set to readers. Templates use the
//! [Tera](https://keats.github.io/tera/) syntax, so one template may `include` or
//! `extends` another by alias.
//!
//! # Architecture Overview
//!
//! - An **alias index** records alias → absolute source path for everything
//!   that was registered
//! - A **compiled set** (a [`templating::Generation`]) holds every template that
//!   currently loads and compiles
//! - Registration publishes a new compiled set per template; refresh compiles a
//!   complete replacement and publishes it in one step
//! - A refresh never fails as a whole: templates that can no longer be loaded are
//!   reported as dropped and stay in the alias index
//!
//! # Core Modules
//!
//! - [`templating`] - the registry ([`templating::View`]) and its building blocks
//! - [`core`] - error types and user-facing error formatting
//! - [`config`] - `viewreg.toml` describing directories and templates to register
//! - [`cli`] - the `viewreg` command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use viewreg::templating::View;
//!
//! # fn main() -> anyhow::Result<()> {
//! let view = View::default();
//! view.add_dir("mail", "templates/mail", [".tmpl"], true)?;
//! view.add_template("layout.html", "templates/layout.html")?;
//!
//! let body = view.render("mail/welcome.tmpl", &json!({ "Name": "Amy" }))?;
//! println!("{}", String::from_utf8_lossy(&body));
//!
//! for alias in view.refresh() {
//!     eprintln!("template {alias} is no longer available");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File (viewreg.toml)
//!
//! ```toml
//! autoescape = true
//!
//! [[directories]]
//! prefix = ""
//! path = "templates"
//! extensions = [".tmpl", ".html"]
//! recursive = true
//!
//! [templates]
//! layout = "shared/layout.html"
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod templating;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
