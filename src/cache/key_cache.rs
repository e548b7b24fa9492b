//! Case-insensitive, concurrent memoization table.
//!
//! A [`KeyCache`] maps a normalized external key (a legacy ID, a media URL or
//! path, a folder path) to the identifier of the entity created for it. Keys are
//! normalized by trimming surrounding whitespace and lower-casing, so `" Foo "`,
//! `"foo"` and `"FOO"` address the same entry.
//!
//! The first writer wins: [`KeyCache::add`] inserts only when the key is absent
//! and reports the outcome as a `bool`. A `false` return is the expected result
//! of deduplication, not a failure.
//!
//! All operations go through [`DashMap`]'s entry API, so concurrent `add`/`get`
//! calls from resolution workers never lose updates or observe torn state.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::fmt;
use uuid::Uuid;

/// Normalize a cache key: trim, then case-fold.
///
/// Returns `None` for empty or whitespace-only keys, which no cache accepts.
#[must_use]
pub fn normalize_key(key: &str) -> Option<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Thread-safe `normalized key -> identifier` table with insert-if-absent semantics.
pub struct KeyCache<V = Uuid> {
    /// Label used in log output ("legacy", "media", "folder").
    name: &'static str,
    entries: DashMap<String, V>,
}

impl<V: Clone> KeyCache<V> {
    /// Create an empty cache with a label for log output.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: DashMap::new(),
        }
    }

    /// The label this cache was created with.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Register `id` under `key` unless the normalized key is already present.
    ///
    /// Returns `true` when the entry was inserted. Returns `false`, leaving any
    /// existing mapping untouched, when the key was already present or is blank.
    pub fn add(&self, key: &str, id: V) -> bool {
        let Some(normalized) = normalize_key(key) else {
            tracing::debug!("{} cache: rejected blank key", self.name);
            return false;
        };

        match self.entries.entry(normalized) {
            Entry::Occupied(_) => {
                tracing::debug!("{} cache: '{}' already registered, keeping first entry", self.name, key.trim());
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    /// Look up the identifier registered for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let normalized = normalize_key(key)?;
        self.entries.get(&normalized).map(|entry| entry.value().clone())
    }

    /// Whether an identifier is registered for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        normalize_key(key).is_some_and(|normalized| self.entries.contains_key(&normalized))
    }

    /// Return the identifier for `key`, creating and registering it on first use.
    ///
    /// `create` runs at most once per normalized key across all threads: the
    /// entry's shard stays locked while it runs, so a concurrent caller for the
    /// same key waits and then observes the stored identifier. `create` must not
    /// call back into this cache.
    ///
    /// The shard lock also blocks unrelated keys that hash to the same shard, and
    /// the calling thread cannot yield while `create` runs. Keep `create` cheap
    /// and non-blocking (mint an ID, enqueue work); do slow uploads outside the
    /// cache and [`add`](Self::add) the result afterwards.
    ///
    /// Returns `Ok(None)` for a blank key without calling `create`. On success the
    /// `bool` is `true` when this call created the entry. A failed `create`
    /// leaves the key absent so a later call may try again.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &str,
        create: impl FnOnce(&str) -> Result<V, E>,
    ) -> Result<Option<(V, bool)>, E> {
        let Some(normalized) = normalize_key(key) else {
            return Ok(None);
        };

        match self.entries.entry(normalized) {
            Entry::Occupied(entry) => Ok(Some((entry.get().clone(), false))),
            Entry::Vacant(slot) => {
                let id = create(key.trim())?;
                slot.insert(id.clone());
                Ok(Some((id, true)))
            }
        }
    }

    /// Remove every entry.
    ///
    /// Only call between import runs, when no resolution is in flight.
    pub fn clear(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        tracing::debug!("{} cache: cleared {} entries", self.name, dropped);
    }

    /// Number of registered keys.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> fmt::Debug for KeyCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyCache")
            .field("name", &self.name)
            .field("count", &self.entries.len())
            .finish()
    }
}
