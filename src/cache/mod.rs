//! Per-run memoization state for imports.
//!
//! An [`ImportRunContext`] owns the three [`KeyCache`] instances an import job
//! shares across all of its workers:
//!
//! - **legacy** - legacy ID -> created entity ID. Populated by the caller right
//!   after each entity is created; read by deferred property resolution.
//! - **media** - media source (URL or file path) -> created media ID, so a file
//!   referenced from many rows is uploaded once.
//! - **folder** - normalized folder path -> folder ID, so each folder in a path
//!   is looked up or created once.
//!
//! The context is built once per import job and passed by reference to every
//! component that needs it. [`ImportRunContext::reset`] takes `&mut self`, so
//! the borrow checker guarantees no resolution is in flight while the caches
//! are cleared for the next run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use legacy_import::cache::ImportRunContext;
//! use uuid::Uuid;
//!
//! let ctx = ImportRunContext::new();
//! let page = Uuid::new_v4();
//! assert!(ctx.register_entity("42", page));
//! assert_eq!(ctx.legacy_ids().get("42"), Some(page));
//! ```

pub mod key_cache;

pub use key_cache::{KeyCache, normalize_key};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The three caches for one import job, plus the job's identity.
#[derive(Debug)]
pub struct ImportRunContext {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    legacy_ids: KeyCache,
    media: KeyCache,
    folders: KeyCache,
}

impl ImportRunContext {
    /// Start a new import run with empty caches.
    #[must_use]
    pub fn new() -> Self {
        let ctx = Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            legacy_ids: KeyCache::new("legacy"),
            media: KeyCache::new("media"),
            folders: KeyCache::new("folder"),
        };
        tracing::debug!("Started import run {}", ctx.run_id);
        ctx
    }

    /// Clear every cache and start a new run.
    pub fn reset(&mut self) {
        self.legacy_ids.clear();
        self.media.clear();
        self.folders.clear();
        self.run_id = Uuid::new_v4();
        self.started_at = Utc::now();
        tracing::debug!("Reset caches for import run {}", self.run_id);
    }

    /// Identifier of the current run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// When the current run started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Legacy ID -> entity ID cache.
    #[must_use]
    pub const fn legacy_ids(&self) -> &KeyCache {
        &self.legacy_ids
    }

    /// Media source -> media ID cache.
    #[must_use]
    pub const fn media(&self) -> &KeyCache {
        &self.media
    }

    /// Folder path -> folder ID cache.
    #[must_use]
    pub const fn folders(&self) -> &KeyCache {
        &self.folders
    }

    /// Record that the item with `legacy_id` was created as `entity_id`.
    ///
    /// Returns `false` if the legacy ID was already registered (or is blank);
    /// the existing mapping is kept.
    pub fn register_entity(&self, legacy_id: &str, entity_id: Uuid) -> bool {
        let inserted = self.legacy_ids.add(legacy_id, entity_id);
        if inserted {
            tracing::debug!("Registered legacy ID '{}' as {}", legacy_id.trim(), entity_id);
        }
        inserted
    }

    /// Return the media ID for `source`, calling `create` only if this run has
    /// not produced one for the same source yet.
    ///
    /// `create` runs under a cache shard lock and must be cheap and
    /// non-blocking; see [`KeyCache::get_or_try_insert_with`].
    ///
    /// Returns `Ok(None)` for a blank source.
    pub fn ensure_media<E>(
        &self,
        source: &str,
        create: impl FnOnce(&str) -> Result<Uuid, E>,
    ) -> Result<Option<Uuid>, E> {
        let outcome = self.media.get_or_try_insert_with(source, create)?;
        if let Some((id, true)) = outcome {
            tracing::debug!("Created media {} for '{}'", id, source.trim());
        }
        Ok(outcome.map(|(id, _)| id))
    }

    /// Resolve a folder path to a folder ID, creating missing folders once.
    ///
    /// The path is split on `/` and `\`; empty segments are ignored. Every
    /// prefix (`a`, `a/b`, `a/b/c`) is cached separately, and `create` receives
    /// the parent folder's ID (`None` at the root) and the segment name. As with
    /// [`ensure_media`](Self::ensure_media), `create` runs under a shard lock.
    ///
    /// Returns `Ok(None)` when the path has no segments.
    pub fn ensure_folder_path<E>(
        &self,
        path: &str,
        mut create: impl FnMut(Option<Uuid>, &str) -> Result<Uuid, E>,
    ) -> Result<Option<Uuid>, E> {
        let segments: Vec<&str> = path
            .split(['/', '\\'])
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();

        let mut parent: Option<Uuid> = None;
        let mut prefix = String::new();

        for segment in segments {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);

            let outcome = self
                .folders
                .get_or_try_insert_with(&prefix, |_| create(parent, segment))?;
            if let Some((id, created)) = outcome {
                if created {
                    tracing::debug!("Created folder '{}' as {}", prefix, id);
                }
                parent = Some(id);
            }
        }

        Ok(parent)
    }
}

impl Default for ImportRunContext {
    fn default() -> Self {
        Self::new()
    }
}
