//! Forward index (FI): canonical series key -> series metadata.
//!
//! Owns series metadata and assigns dense, monotonically increasing
//! identifiers on first insertion. Mirrors the reference daemon's dual
//! structure: a hash table for canonical-key lookup, plus a dense
//! `by_id` array for O(1) id resolution.

use crate::config::IndexConfig;
use crate::htable::{fnv1a, HashTable};
use crate::key::{canonical_key, LabelSet};
use crate::storage::StorageHandle;

/// Metadata for one series.
#[derive(Debug, Clone)]
pub struct SeriesMetadata {
    /// Dense series identifier.
    pub id: u32,
    /// Metric name (already suffix-expanded, e.g. `foo_total`).
    pub name: String,
    /// Canonically sorted label set.
    pub labels: LabelSet,
    /// Handle into the storage subsystem.
    pub storage: StorageHandle,
}

struct KeyEntry {
    key: Vec<u8>,
    id: u32,
}

/// The forward index.
pub struct ForwardIndex {
    table: HashTable<KeyEntry>,
    by_id: Vec<SeriesMetadata>,
}

impl ForwardIndex {
    /// Creates an empty forward index sized per `config`.
    #[must_use]
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            table: HashTable::new(config.metric_table_size),
            by_id: Vec::new(),
        }
    }

    /// Number of distinct series registered so far; also the next id that
    /// will be assigned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True if no series has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Looks up a series by name and label set, without inserting.
    #[must_use]
    pub fn find(&self, name: &str, labels: &LabelSet) -> Option<&SeriesMetadata> {
        let key = canonical_key(name, labels);
        let hash = fnv1a(&key);
        self.table
            .find(hash, |e| e.key == key)
            .map(|e| &self.by_id[e.id as usize])
    }

    /// Resolves a series by its dense id. `O(1)`.
    #[must_use]
    pub fn get_by_id(&self, id: u32) -> Option<&SeriesMetadata> {
        self.by_id.get(id as usize)
    }

    /// Finds the existing series for `(name, labels)`, or registers a new
    /// one with a freshly allocated dense id and a storage handle obtained
    /// from `alloc_storage`. Returns the resulting metadata.
    ///
    /// `alloc_storage` is invoked at most once, only on the insert path,
    /// so that a lookup hit never allocates ring-buffer storage.
    pub fn getsert<F>(&mut self, name: &str, labels: &LabelSet, alloc_storage: F) -> SeriesMetadata
    where
        F: FnOnce() -> StorageHandle,
    {
        let key = canonical_key(name, labels);
        let hash = fnv1a(&key);

        if let Some(entry) = self.table.find(hash, |e| e.key == key) {
            return self.by_id[entry.id as usize].clone();
        }

        let id = self.by_id.len() as u32;
        let metadata = SeriesMetadata {
            id,
            name: name.to_string(),
            labels: labels.clone(),
            storage: alloc_storage(),
        };
        self.table
            .insert(hash, KeyEntry { key, id }, |_, _| false);
        self.by_id.push(metadata.clone());
        metadata
    }

    /// Snapshot of every registered series, ordered by id.
    #[must_use]
    pub fn list_series(&self) -> Vec<SeriesMetadata> {
        self.by_id.clone()
    }
}
