//! Copy-on-write cache of last-computed mappings.

use parking_lot::RwLock;
use replication::TokenRangeMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Last computed mapping per keyspace.
///
/// Writers substitute a fully-built `Arc` under the lock; readers see
/// either the old or the new mapping, never a partial one. There is no
/// field-level locking because mappings are immutable once built.
#[derive(Default)]
pub struct MappingCache {
    inner: RwLock<HashMap<String, Arc<TokenRangeMap>>>,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, keyspace: &str) -> Option<Arc<TokenRangeMap>> {
        self.inner.read().get(keyspace).cloned()
    }

    pub fn store(&self, keyspace: &str, mapping: Arc<TokenRangeMap>) {
        self.inner.write().insert(keyspace.to_string(), mapping);
    }

    /// Drop the cached mapping for `keyspace`, forcing the next reader
    /// through a fresh computation.
    pub fn invalidate(&self, keyspace: &str) {
        self.inner.write().remove(keyspace);
    }
}
