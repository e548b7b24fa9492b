//! Import configuration.
//!
//! Every setting has a default, so an import runs without any configuration
//! file at all. A file, when present, is TOML:
//!
//! ```toml
//! default_resolver = "text"
//! reference_separator = ","
//! max_parallel = 8
//!
//! [columns]
//! legacy_id = "legacyId"
//! legacy_parent_id = "legacyParentId"
//! name = "name"
//!
//! [aliases]
//! contentPicker = "legacyContentPicker"
//! yesno = "boolean"
//! ```
//!
//! # Location Priority
//!
//! 1. The `--config <path>` command line flag
//! 2. The `LEGACY_IMPORT_CONFIG` environment variable
//! 3. `~/.legacy-import/config.toml`, if it exists
//! 4. Built-in defaults
//!
//! An explicitly named file (flag or environment variable) must exist; the
//! home directory file is optional.

mod parser;

pub use parser::{parse_config, parse_config_str};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_LEGACY_ID_COLUMN, DEFAULT_LEGACY_PARENT_ID_COLUMN, DEFAULT_NAME_COLUMN, DEFAULT_REFERENCE_SEPARATOR,
    DEFAULT_RESOLVER_ALIAS, VALUE_PARAMETER_SEPARATOR, default_parallelism,
};
use crate::core::ImportError;
use crate::properties::{DependencyExtractor, ResolverRegistry};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "LEGACY_IMPORT_CONFIG";

/// Names of the reserved columns, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Column holding the item's legacy ID.
    pub legacy_id: String,
    /// Column holding the parent's legacy ID.
    pub legacy_parent_id: String,
    /// Column holding the item's name.
    pub name: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            legacy_id: DEFAULT_LEGACY_ID_COLUMN.to_string(),
            legacy_parent_id: DEFAULT_LEGACY_PARENT_ID_COLUMN.to_string(),
            name: DEFAULT_NAME_COLUMN.to_string(),
        }
    }
}

impl ColumnConfig {
    /// Whether `column` is one of the reserved columns.
    #[must_use]
    pub fn is_reserved(&self, column: &str) -> bool {
        let column = column.trim();
        [&self.legacy_id, &self.legacy_parent_id, &self.name]
            .into_iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(column))
    }
}

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Alias used for columns whose header names no resolver.
    pub default_resolver: String,

    /// Separator between legacy references in a deferred cell.
    pub reference_separator: String,

    /// Upper bound on concurrent creations. Defaults to
    /// [`default_parallelism`] when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,

    /// Reserved column names.
    pub columns: ColumnConfig,

    /// Extra alias -> built-in alias mappings.
    pub aliases: IndexMap<String, String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_resolver: DEFAULT_RESOLVER_ALIAS.to_string(),
            reference_separator: DEFAULT_REFERENCE_SEPARATOR.to_string(),
            max_parallel: None,
            columns: ColumnConfig::default(),
            aliases: IndexMap::new(),
        }
    }
}

impl ImportConfig {
    /// Load configuration following the location priority.
    ///
    /// `explicit` is the path given on the command line, if any.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => match std::env::var(CONFIG_ENV_VAR) {
                Ok(value) if !value.trim().is_empty() => Some(PathBuf::from(value)),
                _ => Self::default_path().filter(|path| path.exists()),
            },
        };

        let config = match path {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                let config: Self = parse_config(&path)?;
                config.validate().with_context(|| format!("Invalid configuration in {}", path.display()))?;
                config
            }
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        Ok(config)
    }

    /// `~/.legacy-import/config.toml`, when the home directory is known.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".legacy-import").join("config.toml"))
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.max_parallel == Some(0) {
            return Err(ImportError::ConfigError {
                message: "max_parallel must be at least 1".to_string(),
            });
        }

        let columns = [
            ("legacy_id", &self.columns.legacy_id),
            ("legacy_parent_id", &self.columns.legacy_parent_id),
            ("name", &self.columns.name),
        ];
        for (key, value) in columns {
            if value.trim().is_empty() {
                return Err(ImportError::ConfigError {
                    message: format!("columns.{key} must not be empty"),
                });
            }
        }

        // Picker cells are split on the value parameter separator before the
        // references are, so the two must never overlap.
        if self.reference_separator.contains(VALUE_PARAMETER_SEPARATOR) {
            return Err(ImportError::ConfigError {
                message: format!(
                    "reference_separator must not contain '{VALUE_PARAMETER_SEPARATOR}' (got {:?})",
                    self.reference_separator
                ),
            });
        }

        self.registry()?.resolve(&self.default_resolver, None)?;
        Ok(())
    }

    /// Build the resolver registry from the built-ins and `[aliases]`.
    pub fn registry(&self) -> Result<ResolverRegistry, ImportError> {
        ResolverRegistry::with_aliases(&self.aliases)
    }

    /// Extractor splitting on the configured reference separator.
    #[must_use]
    pub fn extractor(&self) -> DependencyExtractor {
        DependencyExtractor::new(self.reference_separator.clone())
    }

    /// Effective concurrency bound.
    #[must_use]
    pub fn max_parallel(&self) -> usize {
        self.max_parallel.unwrap_or_else(default_parallelism)
    }
}
