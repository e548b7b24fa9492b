//! Conversions for immediate resolver kinds.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Number, Value};

use super::{ParameterizedValue, Resolver, ResolverKind};
use crate::constants::DEFAULT_DATE_FORMAT;
use crate::core::ImportError;

/// Date-time layouts tried, in order, when a date column has no format parameter.
const FALLBACK_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Output layout for dates.
const ISO_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S";

impl Resolver {
    /// Convert a cell for an immediate kind.
    ///
    /// Calling this on a deferred kind is a programming error and yields
    /// [`ImportError::Other`].
    pub fn resolve_immediate(&self, column: &str, raw: &ParameterizedValue) -> Result<Value, ImportError> {
        let parameter = self.effective_parameter(raw);
        let value = raw.value.as_str();
        let invalid = |reason: String| ImportError::InvalidPropertyValue {
            column: column.to_string(),
            value: value.to_string(),
            reason,
        };

        match self.kind {
            ResolverKind::Text => Ok(Value::String(value.to_string())),
            ResolverKind::Boolean => parse_bool(value).map(Value::Bool).ok_or_else(|| {
                invalid("expected one of true/false, yes/no, y/n, on/off, 1/0".to_string())
            }),
            ResolverKind::Integer => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                trimmed.parse::<i64>().map(Value::from).map_err(|e| invalid(e.to_string()))
            }
            ResolverKind::Decimal => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                let number = trimmed.parse::<f64>().map_err(|e| invalid(e.to_string()))?;
                Number::from_f64(number)
                    .map(Value::Number)
                    .ok_or_else(|| invalid("not a finite number".to_string()))
            }
            ResolverKind::Date => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                parse_date(trimmed, parameter)
                    .map(|date| Value::String(date.format(ISO_DATE_TIME).to_string()))
                    .ok_or_else(|| {
                        invalid(format!("does not match date format '{}'", parameter.unwrap_or(DEFAULT_DATE_FORMAT)))
                    })
            }
            ResolverKind::List => {
                let separator = parameter.unwrap_or(",");
                let entries = value
                    .split(separator)
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(|entry| Value::String(entry.to_string()))
                    .collect();
                Ok(Value::Array(entries))
            }
            ResolverKind::LegacyPicker => Err(ImportError::Other {
                message: format!("resolver '{}' for column '{column}' is deferred", self.kind),
            }),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

fn parse_date(value: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    match format {
        Some(format) => NaiveDateTime::parse_from_str(value, format)
            .ok()
            .or_else(|| NaiveDate::parse_from_str(value, format).ok().map(|d| d.and_time(NaiveTime::MIN))),
        None => FALLBACK_DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, DEFAULT_DATE_FORMAT).ok().map(|d| d.and_time(NaiveTime::MIN))
            }),
    }
}
