//! Sample batches.

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::batch::RawRecord;

/// A small site: a page hierarchy, a cross-linked image and two pages without
/// legacy IDs. Rows are deliberately out of creation order.
#[must_use]
pub fn site_batch() -> Value {
    json!([
        {"legacyId": "40", "legacyParentId": "10", "name": "Careers", "hero|legacyMediaPicker:single": "50"},
        {"name": "Banner", "title": "Welcome"},
        {"legacyId": "10", "name": "Home", "visible|bool": "yes"},
        {"legacyId": "30", "legacyParentId": "20", "name": "Team", "related|legacyContentPicker": "10, 40"},
        {"legacyId": "20", "legacyParentId": "10", "name": "About", "published|date": "2024-03-01"},
        {"legacyId": "50", "name": "Logo"},
        {"name": "Footer", "order|int": 9}
    ])
}

/// Two items that are each other's parent.
#[must_use]
pub fn cyclic_batch() -> Value {
    json!([
        {"legacyId": "A", "legacyParentId": "B", "name": "Alpha"},
        {"legacyId": "B", "legacyParentId": "A", "name": "Beta"}
    ])
}

/// Convert a JSON batch to raw records (all cells as strings).
#[must_use]
pub fn records(batch: &Value) -> Vec<RawRecord> {
    batch
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(Value::as_object)
                .map(|row| {
                    row.iter()
                        .map(|(column, cell)| {
                            let text = match cell {
                                Value::String(text) => text.clone(),
                                Value::Null => String::new(),
                                other => other.to_string(),
                            };
                            (column.clone(), text)
                        })
                        .collect()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// A batch written to a temporary directory, removed on drop.
pub struct BatchFile {
    dir: TempDir,
    path: PathBuf,
}

impl BatchFile {
    /// Write `batch` as `batch.json`.
    pub fn new(batch: &Value) -> std::io::Result<Self> {
        Self::with_contents(&serde_json::to_string_pretty(batch)?)
    }

    /// Write `contents` verbatim as `batch.json`.
    pub fn with_contents(contents: &str) -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("batch.json");
        std::fs::write(&path, contents)?;
        Ok(Self {
            dir,
            path,
        })
    }

    /// Path of the batch file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a sibling file (such as a config) and return its path.
    pub fn write_sibling(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
