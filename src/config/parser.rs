//! TOML loading for configuration files.
//!
//! Read and parse failures carry the file path as context so the top-level
//! error report can say which file was at fault:
//!
//! ```text
//! Failed to parse config file: /home/me/.legacy-import/config.toml
//! Caused by:
//!     invalid type: integer `3`, expected a string for key `columns.name`
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Read `path` and deserialize it as TOML into `T`.
///
/// # Examples
///
/// ```rust,no_run
/// use legacy_import::config::{ImportConfig, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: ImportConfig = parse_config(Path::new("import.toml"))?;
/// println!("Default resolver: {}", config.default_resolver);
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Deserialize TOML text into `T`.
pub fn parse_config_str<T>(content: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    Ok(toml::from_str(content)?)
}
