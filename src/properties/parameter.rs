//! Inline parameters for property resolvers.
//!
//! A parameter can be attached in two places:
//!
//! - the column header: `column|alias:parameter` (alias-level)
//! - the cell value: `value|parameter` (value-level, only for kinds that accept
//!   parameters)
//!
//! When both are present the value-level parameter wins.

use serde::{Deserialize, Serialize};

use crate::constants::{ALIAS_PARAMETER_SEPARATOR, COLUMN_ALIAS_SEPARATOR, VALUE_PARAMETER_SEPARATOR};
use crate::core::ImportError;

/// A parsed column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Property name the column fills.
    pub column: String,
    /// Resolver alias, if the header names one.
    pub alias: Option<String>,
    /// Alias-level parameter, if any.
    pub alias_parameter: Option<String>,
}

impl ColumnSpec {
    /// Parse `column`, `column|alias` or `column|alias:parameter`.
    ///
    /// Only the first `|` separates the column from the alias and only the
    /// first `:` after it separates the alias from the parameter, so a
    /// parameter may itself contain `:` (as chrono formats do).
    pub fn parse(header: &str) -> Result<Self, ImportError> {
        let (column, rest) = match header.split_once(COLUMN_ALIAS_SEPARATOR) {
            Some((column, rest)) => (column.trim(), Some(rest)),
            None => (header.trim(), None),
        };

        if column.is_empty() {
            return Err(ImportError::InvalidColumnSpec {
                column: header.to_string(),
                reason: "column name is empty".to_string(),
            });
        }

        let Some(rest) = rest else {
            return Ok(Self {
                column: column.to_string(),
                alias: None,
                alias_parameter: None,
            });
        };

        let (alias, parameter) = match rest.split_once(ALIAS_PARAMETER_SEPARATOR) {
            Some((alias, parameter)) => (alias.trim(), non_blank(parameter)),
            None => (rest.trim(), None),
        };

        if alias.is_empty() {
            return Err(ImportError::InvalidColumnSpec {
                column: header.to_string(),
                reason: format!("resolver alias after '{COLUMN_ALIAS_SEPARATOR}' is empty"),
            });
        }

        Ok(Self {
            column: column.to_string(),
            alias: Some(alias.to_string()),
            alias_parameter: parameter,
        })
    }
}

/// A raw cell value with its value-level parameter split off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterizedValue {
    /// The value proper.
    pub value: String,
    /// Parameter from `value|parameter`, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ParameterizedValue {
    /// A value without a parameter.
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            parameter: None,
        }
    }

    /// Split `raw` on its last `|` when `accepts_parameter` is set.
    ///
    /// A blank parameter (`"7|"`) counts as absent.
    #[must_use]
    pub fn split(raw: &str, accepts_parameter: bool) -> Self {
        if !accepts_parameter {
            return Self::plain(raw);
        }

        match raw.rsplit_once(VALUE_PARAMETER_SEPARATOR) {
            Some((value, parameter)) => Self {
                value: value.to_string(),
                parameter: non_blank(parameter),
            },
            None => Self::plain(raw),
        }
    }

    /// Value-level parameter if present, otherwise the alias-level one.
    #[must_use]
    pub fn effective_parameter<'a>(&'a self, alias_parameter: Option<&'a str>) -> Option<&'a str> {
        self.parameter.as_deref().or(alias_parameter)
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_column() {
        let spec = ColumnSpec::parse(" title ").unwrap();
        assert_eq!(spec.column, "title");
        assert_eq!(spec.alias, None);
        assert_eq!(spec.alias_parameter, None);
    }

    #[test]
    fn test_parse_alias_and_parameter() {
        let spec = ColumnSpec::parse("published|date:%d/%m/%Y %H:%M").unwrap();
        assert_eq!(spec.column, "published");
        assert_eq!(spec.alias.as_deref(), Some("date"));
        assert_eq!(spec.alias_parameter.as_deref(), Some("%d/%m/%Y %H:%M"));
    }

    #[test]
    fn test_parse_blank_parameter_is_none() {
        let spec = ColumnSpec::parse("hero|legacyPicker: ").unwrap();
        assert_eq!(spec.alias.as_deref(), Some("legacyPicker"));
        assert_eq!(spec.alias_parameter, None);
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(matches!(ColumnSpec::parse("|text"), Err(ImportError::InvalidColumnSpec { .. })));
        assert!(matches!(ColumnSpec::parse("title|"), Err(ImportError::InvalidColumnSpec { .. })));
        assert!(matches!(ColumnSpec::parse("title| :x"), Err(ImportError::InvalidColumnSpec { .. })));
    }

    #[test]
    fn test_split_uses_last_separator() {
        let value = ParameterizedValue::split("a|b|single", true);
        assert_eq!(value.value, "a|b");
        assert_eq!(value.parameter.as_deref(), Some("single"));

        let blank = ParameterizedValue::split("7|", true);
        assert_eq!(blank.value, "7");
        assert_eq!(blank.parameter, None);
    }

    #[test]
    fn test_value_parameter_wins() {
        let value = ParameterizedValue::split("1,2|single", true);
        assert_eq!(value.effective_parameter(Some("all")), Some("single"));

        let plain = ParameterizedValue::plain("1,2");
        assert_eq!(plain.effective_parameter(Some("all")), Some("all"));
        assert_eq!(plain.effective_parameter(None), None);
    }
}
