//! Integration test suite for legacy-import
//!
//! End-to-end tests that drive the `legacy-import` binary against batch files
//! written to temporary directories.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **check**: validation results and error reporting
//! - **plan**: creation order in text and JSON
//! - **simulate**: in-memory import reports
//! - **config**: configuration file handling

mod check;
mod common;
mod config;
mod plan;
mod simulate;
