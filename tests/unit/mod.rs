//! Unit test suite for legacy-import
//!
//! Library-level tests that exercise several modules together without going
//! through the binary.
//!
//! ```bash
//! cargo test --test unit
//! ```

mod import_run;
mod key_cache;
mod ordering;
