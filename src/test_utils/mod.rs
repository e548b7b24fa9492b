//! Test utilities for legacy-import
//!
//! Helpers shared by unit tests, the `tests/` suites and doc examples:
//! - [`init_test_logging`] to see tracing output while a test runs
//! - [`fixtures`] for sample batches and batch files on disk
//!
//! # Example
//!
//! ```rust,no_run
//! use legacy_import::test_utils::{BatchFile, fixtures};
//!
//! let file = BatchFile::new(&fixtures::site_batch()).unwrap();
//! assert!(file.path().exists());
//! ```

pub mod fixtures;

pub use fixtures::BatchFile;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` when given, otherwise
/// `RUST_LOG` when set, otherwise stays silent.
///
/// ```bash
/// RUST_LOG=legacy_import=debug cargo test
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
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
