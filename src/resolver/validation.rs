//! Batch validation run before any ordering.
//!
//! Two checks, in order, each stopping at the first failure:
//!
//! 1. **Duplicate legacy IDs** - items sharing a legacy ID (case-insensitively).
//!    Items without a legacy ID are ignored here.
//! 2. **Dangling references** - every non-blank parent or dependency reference,
//!    from any item (with or without its own legacy ID), must name a legacy ID
//!    declared in the batch.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::core::ImportError;
use crate::models::ImportItem;

/// Structural validation for a batch of [`ImportItem`]s.
pub struct GraphValidator;

impl GraphValidator {
    /// Run both checks.
    pub fn validate(items: &[ImportItem]) -> Result<(), ImportError> {
        Self::check_duplicates(items)?;
        Self::check_references(items)?;
        tracing::debug!("Validated {} items", items.len());
        Ok(())
    }

    /// Fail on the first legacy ID (in order of first appearance) declared by
    /// more than one item, naming every colliding item.
    pub fn check_duplicates(items: &[ImportItem]) -> Result<(), ImportError> {
        let mut groups: IndexMap<String, Vec<&ImportItem>> = IndexMap::new();
        for item in items {
            if let Some(key) = item.legacy_key() {
                groups.entry(key).or_default().push(item);
            }
        }

        match groups.values().find(|group| group.len() > 1) {
            Some(group) => Err(ImportError::DuplicateLegacyId {
                legacy_id: group[0].legacy_id.as_deref().unwrap_or_default().trim().to_string(),
                items: group.iter().map(|item| item.display_name()).collect(),
            }),
            None => Ok(()),
        }
    }

    /// Fail on the first reference to a legacy ID that no item declares.
    pub fn check_references(items: &[ImportItem]) -> Result<(), ImportError> {
        let known: HashSet<String> = items.iter().filter_map(ImportItem::legacy_key).collect();

        for item in items {
            for (relation, reference) in item.references() {
                let present = crate::cache::normalize_key(reference).is_some_and(|key| known.contains(&key));
                if !present {
                    return Err(ImportError::DanglingReference {
                        item: item.display_name(),
                        legacy_id: item.legacy_id.as_deref().map(str::trim).filter(|id| !id.is_empty()).map(str::to_string),
                        reference: reference.trim().to_string(),
                        relation,
                    });
                }
            }
        }

        Ok(())
    }
}
