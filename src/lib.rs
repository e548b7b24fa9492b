//! legacy-import - dependency ordering for content imports
//!
//! Import batches come from spreadsheet-style input: one row per entity to
//! create. Rows refer to each other through caller-assigned *legacy IDs* ("this
//! page's parent is legacy item 42", "this page's hero image is legacy item 7").
//! Before anything is created the batch has to be validated and reordered so
//! every referenced item is created before the items that reference it. While it
//! is created, references have to be swapped for the identifiers the content
//! store handed out, and any external resource (a legacy ID, a media file, a
//! folder path) has to map to exactly one created entity.
//!
//! # Architecture Overview
//!
//! ```text
//! raw records ──► BatchPreparer ──► ImportItems
//!                     │ (phase 1: extract legacy references)
//!                     ▼
//!         HierarchyResolver::validate_and_sort
//!           GraphValidator → DependencyGraph → TopologicalSorter
//!                     │
//!                     ▼
//!     execute_plan (waves, bounded concurrency)
//!       │ create parent-first, register legacy ID → entity ID
//!       ▼ (phase 2: resolve deferred references from the cache)
//!     ImportReport
//! ```
//!
//! # Core Modules
//!
//! - [`resolver`] - validation, dependency graph and Kahn ordering
//! - [`cache`] - case-insensitive at-most-once caches and the per-run context
//! - [`properties`] - resolver kinds, parameter handling, deferred resolution
//! - [`models`] - [`ImportItem`](models::ImportItem) and property values
//!
//! ## Supporting Modules
//!
//! - [`batch`] - raw records to items
//! - [`execution`] - creating a sorted batch through an [`EntityCreator`](execution::EntityCreator)
//! - [`config`] - `config.toml` loading
//! - [`core`] - error types and user-facing error formatting
//! - [`cli`] - the `legacy-import` command line
//! - [`constants`] - shared defaults
//!
//! # Example
//!
//! ```
//! use legacy_import::models::ImportItem;
//! use legacy_import::resolver::HierarchyResolver;
//!
//! let items = vec![
//!     ImportItem::new("Page").with_legacy_id("x").with_dependency("y"),
//!     ImportItem::new("Image").with_legacy_id("y"),
//! ];
//! let ordered = HierarchyResolver::validate_and_sort(items)?;
//! assert_eq!(ordered[0].name, "Image");
//! # Ok::<(), legacy_import::core::ImportError>(())
//! ```

// Core functionality
pub mod cache;
pub mod core;
pub mod models;
pub mod properties;
pub mod resolver;

// Batch handling
pub mod batch;
pub mod execution;

// Surface
pub mod cli;
pub mod config;
pub mod constants;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
