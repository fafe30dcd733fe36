use crate::{CacheEntry, CacheStats};
use archmetrics_core::{ArchitectureDefinition, ArchitectureKey, ArchitectureSource, Result};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// In-memory TTL cache of loaded architecture definitions.
///
/// Expired entries are evicted lazily by the `get` that finds them. Writes to
/// the same key are last-writer-wins.
pub struct ArchitectureCache {
    entries: DashMap<ArchitectureKey, CacheEntry<Arc<ArchitectureDefinition>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ArchitectureCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &ArchitectureKey) -> Option<Arc<ArchitectureDefinition>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                let value = entry.value.clone();
                drop(entry);
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "architecture cache hit");
                return Some(value);
            }
            drop(entry);
            // A concurrent `set` may have replaced the entry since the check.
            self.entries.remove_if(key, |_, entry| entry.is_expired());
            debug!(key = %key, "architecture cache entry expired");
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn set(&self, key: ArchitectureKey, value: Arc<ArchitectureDefinition>) {
        self.entries.insert(key, CacheEntry::new(value, self.ttl));
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.len(),
        }
    }

    /// Drops every entry and resets the counters, returning the stats as
    /// they were just before.
    pub fn clear(&self) -> CacheStats {
        let before = self.stats();
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        info!(entries = before.size, "architecture cache cleared");
        before
    }

    /// Read-through lookup: on a miss, loads from `source` and stores the result.
    /// Load failures are returned and nothing is cached.
    pub async fn get_or_load(
        &self,
        key: &ArchitectureKey,
        source: &dyn ArchitectureSource,
    ) -> Result<Arc<ArchitectureDefinition>> {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        info!(key = %key, "architecture cache miss, loading");
        let loaded = Arc::new(source.load(key).await?);
        self.set(key.clone(), loaded.clone());
        Ok(loaded)
    }
}
