//! Phase 2 of deferred resolution: substituting created identifiers.
//!
//! By the time an item is resolved here, every item it references has had its
//! turn in the sorted order and, if creation succeeded, has been registered in
//! the legacy-ID cache. A reference that is still missing (its creation failed
//! or was skipped) is dropped from the value and reported in
//! [`DeferredOutcome::missing`]; the rest of the value still resolves.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{DependencyExtractor, Mode, ParameterizedValue, Resolver};
use crate::cache::KeyCache;

/// Result of resolving one deferred property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeferredOutcome {
    /// Final property value: the resolved identifiers joined with the
    /// reference separator (empty when none resolved).
    pub value: Value,
    /// Identifiers substituted, in reference order.
    pub resolved: Vec<Uuid>,
    /// Legacy IDs that were not in the cache and were omitted.
    pub missing: Vec<String>,
}

impl DeferredOutcome {
    /// Whether every reference resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl Resolver {
    /// Resolve a deferred value against the legacy-ID cache.
    ///
    /// Immediate resolvers have no references; their raw value passes through
    /// unchanged.
    #[must_use]
    pub fn resolve_deferred(
        &self,
        raw: &ParameterizedValue,
        legacy_ids: &KeyCache,
        extractor: &DependencyExtractor,
    ) -> DeferredOutcome {
        if self.mode() != Mode::Deferred {
            return DeferredOutcome {
                value: Value::String(raw.value.clone()),
                resolved: Vec::new(),
                missing: Vec::new(),
            };
        }

        let mut resolved = Vec::new();
        let mut missing = Vec::new();

        for reference in extractor.extract(self, raw) {
            match legacy_ids.get(&reference) {
                Some(id) => resolved.push(id),
                None => {
                    tracing::warn!("Legacy ID '{}' has no created entity; omitting reference", reference);
                    missing.push(reference);
                }
            }
        }

        let value = resolved.iter().map(Uuid::to_string).collect::<Vec<_>>().join(extractor.separator());

        DeferredOutcome {
            value: Value::String(value),
            resolved,
            missing,
        }
    }
}
