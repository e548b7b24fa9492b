//! Shared data models for import batches.
//!
//! An [`ImportItem`] is one row's intent to create an entity. It carries its own
//! legacy ID, its parent's legacy ID, its property values, and the legacy IDs its
//! deferred properties depend on. Items are produced by
//! [`BatchPreparer`](crate::batch::BatchPreparer) (or built directly by callers)
//! and ordered by [`HierarchyResolver`](crate::resolver::HierarchyResolver).

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::cache::normalize_key;
use crate::core::ReferenceRelation;
use crate::properties::{ParameterizedValue, Resolver};

/// A property value that is either final or waiting on other items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum PropertyValue {
    /// Final value.
    Resolved {
        /// The value to store.
        value: serde_json::Value,
    },
    /// Value that references other batch items by legacy ID.
    Deferred(DeferredValue),
}

impl PropertyValue {
    /// A final value.
    #[must_use]
    pub fn resolved(value: impl Into<serde_json::Value>) -> Self {
        Self::Resolved {
            value: value.into(),
        }
    }

    /// Whether the value still needs deferred resolution.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

/// The inputs a deferred resolver needs in phase 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredValue {
    /// Resolver kind and alias-level parameter.
    pub resolver: Resolver,
    /// Raw cell value with its value-level parameter split off.
    pub raw: ParameterizedValue,
}

/// One row's resolved intent to create an entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportItem {
    /// Display name used in diagnostics and passed to the creator.
    #[serde(default)]
    pub name: String,
    /// 1-based source row, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Caller-assigned identifier, unique (case-insensitively) in the batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    /// Legacy ID of the parent, when the parent is created in the same batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_parent_id: Option<String>,
    /// Property values in column order.
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,
    /// Legacy IDs the deferred properties depend on.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub dependencies: IndexSet<String>,
}

impl ImportItem {
    /// An item with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the legacy ID.
    #[must_use]
    pub fn with_legacy_id(mut self, legacy_id: impl Into<String>) -> Self {
        self.legacy_id = Some(legacy_id.into());
        self
    }

    /// Set the parent's legacy ID.
    #[must_use]
    pub fn with_parent(mut self, legacy_parent_id: impl Into<String>) -> Self {
        self.legacy_parent_id = Some(legacy_parent_id.into());
        self
    }

    /// Add a dependency on another item's legacy ID.
    #[must_use]
    pub fn with_dependency(mut self, legacy_id: impl Into<String>) -> Self {
        self.dependencies.insert(legacy_id.into());
        self
    }

    /// Set a property value.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Set the source row.
    #[must_use]
    pub const fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Normalized legacy ID, if the item has a non-blank one.
    #[must_use]
    pub fn legacy_key(&self) -> Option<String> {
        self.legacy_id.as_deref().and_then(normalize_key)
    }

    /// Normalized parent legacy ID, if non-blank.
    #[must_use]
    pub fn parent_key(&self) -> Option<String> {
        self.legacy_parent_id.as_deref().and_then(normalize_key)
    }

    /// Whether the item has a non-blank legacy ID.
    #[must_use]
    pub fn has_legacy_id(&self) -> bool {
        self.legacy_key().is_some()
    }

    /// Every non-blank reference the item makes: the parent first, then each
    /// dependency in insertion order.
    pub fn references(&self) -> impl Iterator<Item = (ReferenceRelation, &str)> {
        let parent = self.legacy_parent_id.as_deref().map(|id| (ReferenceRelation::Parent, id));
        let dependencies = self.dependencies.iter().map(|id| (ReferenceRelation::Dependency, id.as_str()));
        parent.into_iter().chain(dependencies).filter(|(_, id)| !id.trim().is_empty())
    }

    /// Whether the item references any other item.
    #[must_use]
    pub fn has_references(&self) -> bool {
        self.references().next().is_some()
    }

    /// Name for diagnostics: the name, else the legacy ID, else the row.
    #[must_use]
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        if let Some(legacy_id) = self.legacy_id.as_deref().filter(|id| !id.trim().is_empty()) {
            return format!("legacy {}", legacy_id.trim());
        }
        match self.row {
            Some(row) => format!("row {row}"),
            None => "<unnamed>".to_string(),
        }
    }

    /// Names of properties still awaiting deferred resolution.
    pub fn deferred_properties(&self) -> impl Iterator<Item = (&str, &DeferredValue)> {
        self.properties.iter().filter_map(|(name, value)| match value {
            PropertyValue::Deferred(deferred) => Some((name.as_str(), deferred)),
            PropertyValue::Resolved { .. } => None,
        })
    }
}
