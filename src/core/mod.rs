//! Core types for viewreg
//!
//! This module holds the error model shared by the library and the CLI:
//! - [`ViewError`] - Enumerated failure modes of registry operations
//! - [`ErrorKind`] - Fieldless discriminant for matching on error categories
//! - [`ErrorContext`] - User-friendly wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any [`anyhow::Error`] for CLI display

pub mod error;

pub use error::{ErrorContext, ErrorKind, ViewError, user_friendly_error};
