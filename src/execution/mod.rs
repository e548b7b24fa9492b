//! Creating the entities of a sorted batch.
//!
//! The batch is split into waves by [`creation_waves`]: an item lands one wave
//! after the latest wave of anything it references. Items in the same wave are
//! independent of one another and are created concurrently, bounded by
//! [`ExecuteOptions::max_parallel`]. A wave starts only after the previous one
//! has finished, so by the time an item is created:
//!
//! - its parent has been created and registered (or has failed, in which case
//!   the item is skipped)
//! - every legacy ID its deferred properties reference has been registered, or
//!   is reported as missing on the item's outcome
//!
//! Failures are recorded and never retried.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use uuid::Uuid;

use crate::cache::{ImportRunContext, normalize_key};
use crate::constants::default_parallelism;
use crate::models::{ImportItem, PropertyValue};
use crate::properties::DependencyExtractor;

/// Everything the content store needs to create one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Entity name.
    pub name: String,
    /// Legacy ID, for the store's own bookkeeping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    /// Identifier of the already-created parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    /// Final property values.
    pub properties: IndexMap<String, serde_json::Value>,
}

/// The content store that entities are created in.
pub trait EntityCreator: Sync {
    /// Create one entity and return its identifier.
    fn create(&self, request: CreateRequest) -> impl Future<Output = anyhow::Result<Uuid>> + Send;
}

/// Tuning for [`execute_plan`].
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Maximum concurrent creations within a wave.
    pub max_parallel: usize,
    /// Splits and joins deferred references.
    pub extractor: DependencyExtractor,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            max_parallel: default_parallelism(),
            extractor: DependencyExtractor::default(),
        }
    }
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ItemStatus {
    /// Created with this identifier.
    Created {
        /// The new entity's identifier.
        id: Uuid,
    },
    /// The creator returned an error.
    Failed {
        /// The creator's error message.
        error: String,
    },
    /// Not attempted.
    Skipped {
        /// Why.
        reason: String,
    },
}

/// Result for one item of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    /// Source row, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Item name.
    pub name: String,
    /// Item legacy ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    /// Wave the item was scheduled in.
    pub wave: usize,
    /// Outcome.
    #[serde(flatten)]
    pub status: ItemStatus,
    /// Deferred references that were not available and were left out.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_references: Vec<String>,
}

/// Summary of an [`execute_plan`] run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Run identifier from the [`ImportRunContext`].
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last wave finished.
    pub finished_at: DateTime<Utc>,
    /// Number of waves executed.
    pub waves: usize,
    /// One outcome per item, in plan order.
    pub outcomes: Vec<ItemOutcome>,
}

impl ImportReport {
    /// Number of items created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|status| matches!(status, ItemStatus::Created { .. }))
    }

    /// Number of items whose creation failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, ItemStatus::Failed { .. }))
    }

    /// Number of items not attempted.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, ItemStatus::Skipped { .. }))
    }

    /// Whether every item was created with all of its references.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| matches!(outcome.status, ItemStatus::Created { .. }) && outcome.missing_references.is_empty())
    }

    fn count(&self, predicate: impl Fn(&ItemStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|outcome| predicate(&outcome.status)).count()
    }
}

/// Group a sorted batch into waves of mutually independent items.
///
/// Returns batch indices per wave. An item's wave is one past the highest wave
/// of any item it references, or 0 when it references nothing in the batch.
/// References to items that have not appeared yet are ignored, so the input
/// should already be in creation order.
#[must_use]
pub fn creation_waves(items: &[ImportItem]) -> Vec<Vec<usize>> {
    let mut wave_of: HashMap<String, usize> = HashMap::new();
    let mut waves: Vec<Vec<usize>> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let wave = item
            .references()
            .filter_map(|(_, reference)| normalize_key(reference))
            .filter_map(|key| wave_of.get(&key).map(|wave| wave + 1))
            .max()
            .unwrap_or(0);

        if let Some(key) = item.legacy_key() {
            wave_of.entry(key).or_insert(wave);
        }
        if waves.len() <= wave {
            waves.resize_with(wave + 1, Vec::new);
        }
        waves[wave].push(index);
    }

    waves
}

/// Create every item of a sorted batch through `creator`.
///
/// `items` must be in creation order, as returned by
/// [`HierarchyResolver::validate_and_sort`](crate::resolver::HierarchyResolver::validate_and_sort).
/// Each created item with a legacy ID is registered in `ctx` before the next
/// wave starts.
pub async fn execute_plan<C: EntityCreator>(
    ctx: &ImportRunContext,
    items: &[ImportItem],
    creator: &C,
    options: &ExecuteOptions,
) -> ImportReport {
    let waves = creation_waves(items);
    let concurrency = options.max_parallel.max(1);
    tracing::info!(
        "Creating {} items in {} waves (up to {} at a time)",
        items.len(),
        waves.len(),
        concurrency
    );

    let mut outcomes: Vec<(usize, ItemOutcome)> = Vec::with_capacity(items.len());

    for (wave, indices) in waves.iter().enumerate() {
        tracing::debug!("Wave {}: {} items", wave, indices.len());

        let results: Vec<(usize, ItemOutcome)> = stream::iter(indices.iter().copied())
            .map(|index| async move {
                let outcome = create_item(ctx, &items[index], wave, creator, &options.extractor).await;
                (index, outcome)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        outcomes.extend(results);
    }

    outcomes.sort_by_key(|(index, _)| *index);
    let report = ImportReport {
        run_id: ctx.run_id(),
        started_at: ctx.started_at(),
        finished_at: Utc::now(),
        waves: waves.len(),
        outcomes: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
    };

    tracing::info!(
        "Import run {} finished: {} created, {} failed, {} skipped",
        report.run_id,
        report.created(),
        report.failed(),
        report.skipped()
    );
    report
}

async fn create_item<C: EntityCreator>(
    ctx: &ImportRunContext,
    item: &ImportItem,
    wave: usize,
    creator: &C,
    extractor: &DependencyExtractor,
) -> ItemOutcome {
    let mut outcome = ItemOutcome {
        row: item.row,
        name: item.display_name(),
        legacy_id: item.legacy_id.clone(),
        wave,
        status: ItemStatus::Skipped {
            reason: String::new(),
        },
        missing_references: Vec::new(),
    };

    let parent_id = match item.legacy_parent_id.as_deref().filter(|id| !id.trim().is_empty()) {
        Some(parent) => match ctx.legacy_ids().get(parent) {
            Some(id) => Some(id),
            None => {
                tracing::warn!("Skipping '{}': parent '{}' was not created", outcome.name, parent.trim());
                outcome.status = ItemStatus::Skipped {
                    reason: format!("parent legacy ID '{}' was not created", parent.trim()),
                };
                return outcome;
            }
        },
        None => None,
    };

    let mut missing: IndexSet<String> = IndexSet::new();
    let properties = item
        .properties
        .iter()
        .map(|(name, value)| {
            let value = match value {
                PropertyValue::Resolved {
                    value,
                } => value.clone(),
                PropertyValue::Deferred(deferred) => {
                    let resolved = deferred.resolver.resolve_deferred(&deferred.raw, ctx.legacy_ids(), extractor);
                    missing.extend(resolved.missing);
                    resolved.value
                }
            };
            (name.clone(), value)
        })
        .collect();

    let request = CreateRequest {
        name: item.name.clone(),
        legacy_id: item.legacy_id.clone(),
        parent_id,
        properties,
    };
    outcome.missing_references = missing.into_iter().collect();

    outcome.status = match creator.create(request).await {
        Ok(id) => {
            if let Some(legacy_id) = item.legacy_id.as_deref()
                && !ctx.register_entity(legacy_id, id)
            {
                tracing::warn!("Legacy ID '{}' was already registered; keeping the first entity", legacy_id);
            }
            ItemStatus::Created {
                id,
            }
        }
        Err(e) => {
            tracing::warn!("Failed to create '{}': {:#}", outcome.name, e);
            ItemStatus::Failed {
                error: format!("{e:#}"),
            }
        }
    };

    outcome
}

/// An in-memory [`EntityCreator`] that mints random identifiers.
///
/// Used to rehearse an import without a content store. Legacy IDs passed to
/// [`DryRunCreator::failing`] make creation fail, to preview how failures
/// propagate through the plan.
#[derive(Debug, Default)]
pub struct DryRunCreator {
    created: DashMap<Uuid, CreateRequest>,
    failing: IndexSet<String>,
}

impl DryRunCreator {
    /// A creator that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A creator that fails for the given legacy IDs.
    #[must_use]
    pub fn failing<I, S>(legacy_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            created: DashMap::new(),
            failing: legacy_ids.into_iter().filter_map(|id| normalize_key(id.as_ref())).collect(),
        }
    }

    /// The request that produced `id`.
    #[must_use]
    pub fn request(&self, id: Uuid) -> Option<CreateRequest> {
        self.created.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of entities created.
    #[must_use]
    pub fn count(&self) -> usize {
        self.created.len()
    }
}

impl EntityCreator for DryRunCreator {
    async fn create(&self, request: CreateRequest) -> anyhow::Result<Uuid> {
        if let Some(key) = request.legacy_id.as_deref().and_then(normalize_key)
            && self.failing.contains(&key)
        {
            anyhow::bail!("simulated failure for legacy ID '{}'", key);
        }

        let id = Uuid::new_v4();
        self.created.insert(id, request);
        Ok(id)
    }
}
