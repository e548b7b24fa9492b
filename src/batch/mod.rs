//! Turning raw records into [`ImportItem`]s.
//!
//! A raw record is one row: an ordered map from column header to cell text.
//! Reserved columns (see [`ColumnConfig`](crate::config::ColumnConfig)) fill the
//! item's name, legacy ID and parent legacy ID. Every other header is parsed as
//! `column|alias[:parameter]` and its cells are converted by the named resolver:
//!
//! - immediate kinds become [`PropertyValue::Resolved`] right away
//! - deferred kinds become [`PropertyValue::Deferred`], and the legacy IDs they
//!   reference are merged into [`ImportItem::dependencies`]
//!
//! A header that is malformed or names an unknown alias fails the whole batch.
//! A single cell that cannot be converted only drops that property and is
//! reported as a [`RowIssue`].
//!
//! Batch files are JSON arrays of objects. Scalar cells are stringified and
//! `null` becomes an empty cell.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::config::{ColumnConfig, ImportConfig};
use crate::core::ImportError;
use crate::models::{DeferredValue, ImportItem, PropertyValue};
use crate::properties::{ColumnSpec, DependencyExtractor, Mode, Resolver, ResolverRegistry};

/// One row: column header -> cell text, in column order.
pub type RawRecord = IndexMap<String, String>;

/// A cell that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// 1-based record number.
    pub row: usize,
    /// Property column.
    pub column: String,
    /// What went wrong.
    pub message: String,
}

/// Items ready for ordering, plus the cells that were dropped.
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    /// One item per record, in record order.
    pub items: Vec<ImportItem>,
    /// Non-fatal conversion problems.
    pub issues: Vec<RowIssue>,
}

#[derive(Debug, Clone)]
enum Column {
    LegacyId,
    LegacyParentId,
    Name,
    Property { name: String, resolver: Resolver },
}

/// Converts raw records with a fixed configuration.
#[derive(Debug, Clone)]
pub struct BatchPreparer {
    columns: ColumnConfig,
    registry: ResolverRegistry,
    extractor: DependencyExtractor,
    default_resolver: String,
}

impl BatchPreparer {
    /// A preparer built from `config`.
    pub fn new(config: &ImportConfig) -> Result<Self, ImportError> {
        Ok(Self {
            columns: config.columns.clone(),
            registry: config.registry()?,
            extractor: config.extractor(),
            default_resolver: config.default_resolver.clone(),
        })
    }

    /// The extractor used for deferred columns.
    #[must_use]
    pub fn extractor(&self) -> &DependencyExtractor {
        &self.extractor
    }

    /// Convert `records` into items.
    pub fn prepare(&self, records: &[RawRecord]) -> Result<PreparedBatch, ImportError> {
        let mut columns: HashMap<&str, Column> = HashMap::new();
        for header in records.iter().flat_map(IndexMap::keys) {
            if !columns.contains_key(header.as_str()) {
                columns.insert(header.as_str(), self.classify(header)?);
            }
        }

        let mut batch = PreparedBatch::default();
        for (index, record) in records.iter().enumerate() {
            let row = index + 1;
            let mut item = ImportItem::default().with_row(row);

            for (header, cell) in record {
                let Some(column) = columns.get(header.as_str()) else {
                    continue;
                };
                match column {
                    Column::LegacyId => item.legacy_id = non_blank(cell),
                    Column::LegacyParentId => item.legacy_parent_id = non_blank(cell),
                    Column::Name => item.name = cell.trim().to_string(),
                    Column::Property {
                        name,
                        resolver,
                    } => self.convert(&mut item, &mut batch.issues, name, resolver, cell),
                }
            }

            batch.items.push(item);
        }

        tracing::debug!(
            "Prepared {} items from {} records ({} dropped cells)",
            batch.items.len(),
            records.len(),
            batch.issues.len()
        );
        Ok(batch)
    }

    fn classify(&self, header: &str) -> Result<Column, ImportError> {
        let spec = ColumnSpec::parse(header)?;
        let column = spec.column.as_str();

        if column.eq_ignore_ascii_case(self.columns.legacy_id.trim()) {
            return Ok(Column::LegacyId);
        }
        if column.eq_ignore_ascii_case(self.columns.legacy_parent_id.trim()) {
            return Ok(Column::LegacyParentId);
        }
        if column.eq_ignore_ascii_case(self.columns.name.trim()) {
            return Ok(Column::Name);
        }

        let resolver = match spec.alias.as_deref() {
            Some(alias) => self.registry.resolve(alias, spec.alias_parameter)?,
            None => self.registry.resolve(&self.default_resolver, None)?,
        };
        tracing::trace!("Column '{}' resolves with {}", spec.column, resolver);

        Ok(Column::Property {
            name: spec.column,
            resolver,
        })
    }

    fn convert(&self, item: &mut ImportItem, issues: &mut Vec<RowIssue>, name: &str, resolver: &Resolver, cell: &str) {
        let raw = resolver.wrap(cell);

        match resolver.mode() {
            Mode::Immediate => match resolver.resolve_immediate(name, &raw) {
                Ok(value) => {
                    item.properties.insert(name.to_string(), PropertyValue::resolved(value));
                }
                Err(e) => {
                    let row = item.row.unwrap_or_default();
                    tracing::warn!("Row {}: dropping '{}': {}", row, name, e);
                    issues.push(RowIssue {
                        row,
                        column: name.to_string(),
                        message: e.to_string(),
                    });
                }
            },
            Mode::Deferred => {
                item.dependencies.extend(resolver.extract_dependencies(&raw, &self.extractor));
                item.properties.insert(
                    name.to_string(),
                    PropertyValue::Deferred(DeferredValue {
                        resolver: resolver.clone(),
                        raw,
                    }),
                );
            }
        }
    }
}

/// Parse a JSON batch: an array of objects mapping column headers to scalars.
pub fn parse_records(file: &str, content: &str) -> Result<Vec<RawRecord>, ImportError> {
    let invalid = |reason: String| ImportError::BatchParseError {
        file: file.to_string(),
        reason,
    };

    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
    let serde_json::Value::Array(rows) = value else {
        return Err(invalid("expected a JSON array of records".to_string()));
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let serde_json::Value::Object(fields) = row else {
                return Err(invalid(format!("record {} is not an object", index + 1)));
            };
            fields
                .into_iter()
                .map(|(column, cell)| {
                    let text = match cell {
                        serde_json::Value::Null => String::new(),
                        serde_json::Value::String(text) => text,
                        serde_json::Value::Bool(flag) => flag.to_string(),
                        serde_json::Value::Number(number) => number.to_string(),
                        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                            return Err(invalid(format!(
                                "record {}, column '{}': cells must be strings, numbers, booleans or null",
                                index + 1,
                                column
                            )));
                        }
                    };
                    Ok((column, text))
                })
                .collect()
        })
        .collect()
}

/// Read and parse a JSON batch file.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>, ImportError> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&path.display().to_string(), &content)
}

fn non_blank(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
