//! The process-wide resolved-asset cache.

use crate::key::{CacheKey, RecordKey};
use loadstone_abstraction::{CategoryOutput, ResourceCategory};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::{debug, info};

/// One category's storage, split by key kind: string keys live in a
/// value-keyed map, record keys in an identity-keyed map.
#[derive(Default)]
struct Shelf {
    by_text: HashMap<String, CategoryOutput>,
    by_record: HashMap<RecordKey, CategoryOutput>,
}

impl Shelf {
    fn get(&self, key: &CacheKey) -> Option<&CategoryOutput> {
        match key {
            CacheKey::Text(text) => self.by_text.get(text),
            CacheKey::Record(record) => self.by_record.get(record),
        }
    }

    fn insert(&mut self, key: CacheKey, value: CategoryOutput) {
        match key {
            CacheKey::Text(text) => {
                self.by_text.insert(text, value);
            }
            CacheKey::Record(record) => {
                self.by_record.insert(record, value);
            }
        }
    }

    fn len(&self) -> usize {
        self.by_text.len() + self.by_record.len()
    }
}

/// Cache statistics for observability.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Total number of cache hits.
    pub total_hits: u64,
    /// Total number of cache misses.
    pub total_misses: u64,
    /// Total number of writes.
    pub total_writes: u64,
    /// Current number of entries across all six categories.
    pub entries: usize,
}

/// Six independent per-category caches with process lifetime.
///
/// Entries are retained until [`AssetCache::reset_all`]; there is no
/// eviction or expiry. Concurrent sessions may race on writes for the same
/// key; last write wins, which is acceptable because resolved values for
/// identical keys are expected to be value-equivalent.
pub struct AssetCache {
    shelves: RwLock<[Shelf; ResourceCategory::COUNT]>,
    stats: RwLock<CacheStats>,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCache {
    /// A new, empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shelves: RwLock::new(std::array::from_fn(|_| Shelf::default())),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Look up a cached value for one category. Cloning the stored
    /// [`CategoryOutput`] is cheap: the resolved files inside are shared
    /// behind `Arc`.
    #[must_use]
    pub fn get(&self, category: ResourceCategory, key: &CacheKey) -> Option<CategoryOutput> {
        let shelves = self.shelves.read().expect("cache lock poisoned");
        let found = shelves[category.index()].get(key).cloned();
        drop(shelves);

        let mut stats = self.stats.write().expect("stats lock poisoned");
        if found.is_some() {
            stats.total_hits += 1;
        } else {
            stats.total_misses += 1;
        }
        drop(stats);

        debug!(category = %category, hit = found.is_some(), "cache lookup");
        found
    }

    /// Store a resolved value for one category.
    pub fn insert(&self, category: ResourceCategory, key: CacheKey, value: CategoryOutput) {
        let mut shelves = self.shelves.write().expect("cache lock poisoned");
        shelves[category.index()].insert(key, value);
        let entries = shelves.iter().map(Shelf::len).sum();
        drop(shelves);

        let mut stats = self.stats.write().expect("stats lock poisoned");
        stats.total_writes += 1;
        stats.entries = entries;
        drop(stats);

        debug!(category = %category, "cached resolved value");
    }

    /// Discard every entry in all six categories.
    pub fn reset_all(&self) {
        let mut shelves = self.shelves.write().expect("cache lock poisoned");
        *shelves = std::array::from_fn(|_| Shelf::default());
        drop(shelves);

        let mut stats = self.stats.write().expect("stats lock poisoned");
        stats.entries = 0;
        drop(stats);

        info!("reset all category caches");
    }

    /// Number of entries currently stored for one category.
    #[must_use]
    pub fn len(&self, category: ResourceCategory) -> usize {
        let shelves = self.shelves.read().expect("cache lock poisoned");
        shelves[category.index()].len()
    }

    /// Whether a category has no entries.
    #[must_use]
    pub fn is_empty(&self, category: ResourceCategory) -> bool {
        self.len(category) == 0
    }

    /// A snapshot of the current statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.read().expect("stats lock poisoned").clone()
    }
}

/// The shared process-wide cache. Sessions default to this instance; tests
/// and embedders can construct their own [`AssetCache`] instead.
pub fn shared() -> Arc<AssetCache> {
    static SHARED: OnceLock<Arc<AssetCache>> = OnceLock::new();
    Arc::clone(SHARED.get_or_init(|| Arc::new(AssetCache::new())))
}

/// Reset every category of the shared process-wide cache.
pub fn reset_shared() {
    shared().reset_all();
}
