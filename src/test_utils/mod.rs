//! Test utilities for viewreg
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! - [`init_test_logging`] routes `tracing` output through the test harness
//! - [`TemplateTree`] is a temporary directory of template files that can be
//!   edited, deleted and restored between refreshes
//!
//! # Example
//!
//! ```rust,no_run
//! use viewreg::templating::View;
//! use viewreg::test_utils::TemplateTree;
//!
//! let tree = TemplateTree::with_files(&[("a.tmpl", "Hello {{ Name }}")]).unwrap();
//! let view = View::default();
//! view.add_dir("", tree.path(), [".tmpl"], true).unwrap();
//!
//! tree.remove("a.tmpl").unwrap();
//! assert_eq!(view.refresh(), vec!["a.tmpl".to_string()]);
//! ```

pub mod fixtures;

pub use fixtures::{ConfigFixture, TemplateTree};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honored, and without it nothing is logged.
///
/// ```bash
/// RUST_LOG=viewreg=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    });
}
