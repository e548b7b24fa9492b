//! Error handling for the import engine
//!
//! This module provides the error taxonomy and user-facing error reporting for
//! batch imports. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers can react to each batch failure precisely
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`ImportError`] - Enumerated error types for every failure the engine reports
//! - [`ErrorContext`] - Wrapper that adds suggestions and details for display
//!
//! # Error Categories
//!
//! - **Batch structure** (fatal to the whole batch, never retried):
//!   [`ImportError::DuplicateLegacyId`], [`ImportError::DanglingReference`],
//!   [`ImportError::CycleDetected`]
//! - **Column and property declarations**: [`ImportError::UnknownResolver`],
//!   [`ImportError::InvalidColumnSpec`], [`ImportError::InvalidPropertyValue`]
//! - **Configuration and input files**: [`ImportError::ConfigError`],
//!   [`ImportError::BatchParseError`], [`ImportError::IoError`],
//!   [`ImportError::TomlError`], [`ImportError::JsonError`]
//!
//! Cache deduplication ("key already present") is deliberately absent: it is a
//! successful outcome reported through a `bool`, never an error.
//!
//! # Examples
//!
//! ```rust,no_run
//! use legacy_import::core::{ImportError, user_friendly_error};
//!
//! let error = ImportError::DuplicateLegacyId {
//!     legacy_id: "42".to_string(),
//!     items: vec!["Home".to_string(), "About".to_string()],
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Which kind of reference an item made to another legacy ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceRelation {
    /// The item's `legacy_parent_id`.
    Parent,
    /// An entry of the item's extracted property dependencies.
    Dependency,
}

impl fmt::Display for ReferenceRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent => f.write_str("parent"),
            Self::Dependency => f.write_str("dependency"),
        }
    }
}

/// The main error type for import operations
///
/// The first three variants are batch-level failures produced by
/// [`HierarchyResolver::validate_and_sort`](crate::resolver::HierarchyResolver::validate_and_sort).
/// When one of them is returned no ordering is produced and the caller must not
/// create any entity from the batch.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Two or more items declare the same legacy ID (compared case-insensitively)
    #[error("Duplicate legacy ID '{legacy_id}' declared by {} items: {}", .items.len(), quote_all(.items))]
    DuplicateLegacyId {
        /// The legacy ID as written by the first item declaring it
        legacy_id: String,
        /// Display names of every colliding item, in batch order
        items: Vec<String>,
    },

    /// An item references a legacy ID that no item in the batch declares
    #[error(
        "Item '{item}'{} references missing {relation} legacy ID '{reference}'",
        .legacy_id.as_deref().map(|id| format!(" (legacy ID '{id}')")).unwrap_or_default()
    )]
    DanglingReference {
        /// Display name of the referencing item
        item: String,
        /// The referencing item's own legacy ID, if it has one
        legacy_id: Option<String>,
        /// The legacy ID that could not be found
        reference: String,
        /// Whether the reference was a parent link or a property dependency
        relation: ReferenceRelation,
    },

    /// The parent and property-dependency edges contain a cycle
    ///
    /// `path` lists legacy IDs where each entry depends on the next, closing on
    /// the first entry. `participants` lists every legacy ID left unordered.
    #[error("Circular dependency detected: {} (unordered items: {})", .path.join(" → "), .participants.join(", "))]
    CycleDetected {
        /// Cycle path; the last element repeats the first
        path: Vec<String>,
        /// All legacy IDs that could not be ordered
        participants: Vec<String>,
    },

    /// A column header names a resolver alias that is not registered
    #[error("Unknown resolver alias '{alias}'")]
    UnknownResolver {
        /// The alias as written in the header
        alias: String,
        /// Closest registered alias, if any is similar enough
        suggestion: Option<String>,
    },

    /// A column header does not follow `column|alias[:parameter]`
    #[error("Invalid column header '{column}': {reason}")]
    InvalidColumnSpec {
        /// The raw header text
        column: String,
        /// Why it was rejected
        reason: String,
    },

    /// An immediate resolver could not convert a cell value
    #[error("Invalid value '{value}' for column '{column}': {reason}")]
    InvalidPropertyValue {
        /// Column (property) name
        column: String,
        /// Raw cell value
        value: String,
        /// Why the conversion failed
        reason: String,
    },

    /// Configuration content is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// A batch file could not be interpreted as records
    #[error("Invalid batch file {file}: {reason}")]
    BatchParseError {
        /// Path of the batch file
        file: String,
        /// Why it was rejected
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl ImportError {
    /// Returns `true` for the batch-structure failures that abort a whole batch.
    #[must_use]
    pub const fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateLegacyId { .. }
                | Self::DanglingReference { .. }
                | Self::CycleDetected { .. }
        )
    }
}

fn quote_all(items: &[String]) -> String {
    items.iter().map(|item| format!("'{item}'")).collect::<Vec<_>>().join(", ")
}

/// Error context wrapper that provides user-friendly error information
///
/// Pairs an [`ImportError`] with an optional suggestion and explanatory
/// details, and renders them with terminal colors.
///
/// ```rust,no_run
/// use legacy_import::core::{ErrorContext, ImportError};
///
/// let context = ErrorContext::new(ImportError::ConfigError { message: "bad alias".into() })
///     .with_suggestion("Fix the [aliases] table")
///     .with_details("Aliases must map to built-in resolver names");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying import error
    pub error: ImportError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ImportError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error (shown in green).
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error (shown in yellow).
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`ImportError`] (anywhere in the context chain),
/// [`std::io::Error`], and [`toml::de::Error`]; anything else is wrapped as
/// [`ImportError::Other`] with the full context chain as its message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let outer = format!("{error:#}");

    // A bare ImportError keeps its variant; one wrapped in context keeps the
    // full context chain as its message but still gets the variant's guidance.
    if error.chain().count() == 1 {
        match error.downcast::<ImportError>() {
            Ok(import_error) => return create_error_context(import_error),
            Err(other) => return non_import_context(&other, outer),
        }
    }

    if let Some(import_error) = error.chain().find_map(|cause| cause.downcast_ref::<ImportError>())
    {
        let (suggestion, details) = guidance(import_error);
        return ErrorContext {
            error: ImportError::Other {
                message: outer,
            },
            suggestion,
            details,
        };
    }

    non_import_context(&error, outer)
}

fn non_import_context(error: &anyhow::Error, outer: String) -> ErrorContext {
    if let Some(io_error) = error.chain().find_map(|cause| cause.downcast_ref::<std::io::Error>()) {
        match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(ImportError::Other {
                    message: outer,
                })
                .with_suggestion("Check that the file exists and the path is correct");
            }
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(ImportError::Other {
                    message: outer,
                })
                .with_suggestion("Check the file permissions or run as a user that can read it");
            }
            _ => {}
        }
    }

    if error.chain().any(|cause| cause.downcast_ref::<toml::de::Error>().is_some()) {
        return ErrorContext::new(ImportError::ConfigError {
            message: outer,
        })
        .with_suggestion("Check the TOML syntax of the configuration file")
        .with_details("Configuration keys: default_resolver, reference_separator, max_parallel, [columns], [aliases]");
    }

    ErrorContext::new(ImportError::Other {
        message: outer,
    })
}

fn create_error_context(error: ImportError) -> ErrorContext {
    let (suggestion, details) = guidance(&error);
    ErrorContext {
        error,
        suggestion,
        details,
    }
}

/// Suggestion and details shown for each [`ImportError`] variant.
fn guidance(error: &ImportError) -> (Option<String>, Option<String>) {
    match error {
        ImportError::DuplicateLegacyId { legacy_id, .. } => (
            Some(format!(
                "Give each row a unique legacy ID; '{legacy_id}' is used more than once (IDs are compared case-insensitively)"
            )),
            None,
        ),
        ImportError::DanglingReference { reference, relation, .. } => (
            Some(format!(
                "Add a row with legacy ID '{reference}' to this batch or clear the {relation} reference"
            )),
            Some("Legacy references may only point at rows in the same batch".to_string()),
        ),
        ImportError::CycleDetected { .. } => (
            Some("Break the cycle by removing one parent or picker reference in the listed rows".to_string()),
            Some("Every referenced row must be created before the row that references it".to_string()),
        ),
        ImportError::UnknownResolver { suggestion, .. } => (
            Some(suggestion.as_ref().map_or_else(
                || "Use a built-in resolver alias or register one under [aliases] in the config".to_string(),
                |alias| format!("Did you mean '{alias}'?"),
            )),
            None,
        ),
        ImportError::InvalidColumnSpec { .. } => (
            Some("Write column headers as 'column', 'column|alias' or 'column|alias:parameter'".to_string()),
            None,
        ),
        ImportError::ConfigError { .. } => (
            Some("Check the configuration file passed with --config or LEGACY_IMPORT_CONFIG".to_string()),
            None,
        ),
        ImportError::BatchParseError { .. } => (
            Some("A batch file must be a JSON array of objects mapping column headers to scalar values".to_string()),
            None,
        ),
        _ => (None, None),
    }
}
