//! Integration test suite for viewreg
//!
//! End-to-end tests against real template trees on disk, plus the `viewreg`
//! binary driven through `assert_cmd`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! RUST_LOG=viewreg=debug cargo test --test integration -- --nocapture
//! ```
//!
//! # Test Organization
//!
//! - **registration**: single templates, directories, aliases and failures
//! - **refresh**: reload from disk, dropped and restored templates
//! - **concurrency**: renders, registration and refresh racing each other
//! - **cli**: the `render`, `list` and `check` commands

mod cli;
mod concurrency;
mod refresh;
mod registration;
