//! Global constants used throughout the import engine.
//!
//! Column names, separators, and parallelism defaults live here so the
//! preparation, resolution, and execution layers agree on them.

/// Reserved column holding an item's legacy identifier.
pub const DEFAULT_LEGACY_ID_COLUMN: &str = "legacyId";

/// Reserved column holding the legacy identifier of an item's parent.
pub const DEFAULT_LEGACY_PARENT_ID_COLUMN: &str = "legacyParentId";

/// Reserved column holding an item's display name.
pub const DEFAULT_NAME_COLUMN: &str = "name";

/// Resolver alias applied to columns whose header names no resolver.
pub const DEFAULT_RESOLVER_ALIAS: &str = "text";

/// Separator between multiple legacy references in one cell, and between
/// resolved identifiers in a deferred property's final value.
pub const DEFAULT_REFERENCE_SEPARATOR: &str = ",";

/// Separator between a column name and its resolver alias in a header.
pub const COLUMN_ALIAS_SEPARATOR: char = '|';

/// Separator between a resolver alias and its inline parameter.
pub const ALIAS_PARAMETER_SEPARATOR: char = ':';

/// Separator between a cell value and its value-level parameter.
pub const VALUE_PARAMETER_SEPARATOR: char = '|';

/// Default chrono format for the `date` resolver.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Minimum number of parallel creations regardless of CPU count.
pub const MIN_PARALLELISM: usize = 10;

/// Multiplier applied to CPU core count for default parallelism.
pub const PARALLELISM_CORE_MULTIPLIER: usize = 2;

/// Default executor concurrency: `max(MIN_PARALLELISM, cores * PARALLELISM_CORE_MULTIPLIER)`.
#[must_use]
pub fn default_parallelism() -> usize {
    let cores = std::thread::available_parallelism().map(std::num::NonZero::get).unwrap_or(4);
    std::cmp::max(MIN_PARALLELISM, cores * PARALLELISM_CORE_MULTIPLIER)
}
