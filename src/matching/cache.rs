//! Sharded LRU cache of normalized column values
//!
//! Keys are hashed onto independent shards, each behind its own mutex, so
//! concurrent workers touching different columns rarely contend.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;

/// `(table, column)`
pub type ColumnKey = (String, String);

/// Normalized non-absent values of a column with their row indices
pub type NormalizedColumn = Vec<(usize, String)>;

type Shard = LruCache<ColumnKey, Arc<NormalizedColumn>>;

pub struct ColumnCache {
    shards: Vec<Mutex<Shard>>,
}

impl ColumnCache {
    /// Create a cache holding roughly `capacity` columns over `shards` partitions.
    pub fn new(capacity: usize, shards: usize) -> Self {
        let shards = shards.max(1);
        let per_shard = NonZeroUsize::new(capacity.div_ceil(shards)).unwrap_or(NonZeroUsize::MIN);
        Self {
            shards: (0..shards)
                .map(|_| Mutex::new(LruCache::new(per_shard)))
                .collect(),
        }
    }

    fn shard(&self, key: &ColumnKey) -> MutexGuard<'_, Shard> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let idx = (hasher.finish() % self.shards.len() as u64) as usize;
        self.shards[idx]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &ColumnKey) -> Option<Arc<NormalizedColumn>> {
        self.shard(key).get(key).cloned()
    }

    pub fn insert(&self, key: ColumnKey, value: Arc<NormalizedColumn>) {
        self.shard(&key).put(key, value);
    }

    /// Cached value for `key`, computing and storing it on a miss. The
    /// computation runs outside the shard lock.
    pub fn get_or_insert_with(
        &self,
        key: ColumnKey,
        compute: impl FnOnce() -> NormalizedColumn,
    ) -> Arc<NormalizedColumn> {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let value = Arc::new(compute());
        self.insert(key, Arc::clone(&value));
        value
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ColumnCache {
    fn default() -> Self {
        Self::new(10_000, 8)
    }
}
