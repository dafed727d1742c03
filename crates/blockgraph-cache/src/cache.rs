//! In-memory send cache backed by a sharded concurrent map.

use crate::error::{CacheError, Result};
use crate::{ObjectReference, SendConversionCache};
use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Cache key: one host object in one target project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Host application id.
    pub application_id: String,
    /// Target project id.
    pub project_id: String,
}

impl CacheKey {
    /// Create a key.
    pub fn new(application_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            project_id: project_id.into(),
        }
    }
}

/// Sizing of the concurrent map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Expected number of entries.
    pub initial_capacity: usize,
    /// Number of lock shards; a power of two greater than one.
    pub shard_amount: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            shard_amount: 32,
        }
    }
}

impl CacheConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected number of entries.
    pub fn with_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Set the shard count.
    pub fn with_shards(mut self, shard_amount: usize) -> Self {
        self.shard_amount = shard_amount;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.shard_amount > 1 && self.shard_amount.is_power_of_two() {
            Ok(())
        } else {
            Err(CacheError::InvalidShardAmount(self.shard_amount))
        }
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Current number of entries.
    pub entries: usize,
}

/// Process-wide send cache.
#[derive(Debug)]
pub struct InMemorySendConversionCache {
    entries: DashMap<CacheKey, ObjectReference>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for InMemorySendConversionCache {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl InMemorySendConversionCache {
    /// Create an empty cache with default sizing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache with explicit sizing.
    pub fn with_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: DashMap::with_capacity_and_shard_amount(
                config.initial_capacity,
                config.shard_amount,
            ),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Number of cached references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

impl SendConversionCache for InMemorySendConversionCache {
    fn store_send_result(&self, project_id: &str, references: IndexMap<String, ObjectReference>) {
        debug!(project_id, count = references.len(), "storing send result");
        for (application_id, reference) in references {
            self.entries
                .insert(CacheKey::new(application_id, project_id), reference);
        }
    }

    fn append_send_result(
        &self,
        project_id: &str,
        application_id: &str,
        reference: ObjectReference,
    ) {
        self.entries
            .insert(CacheKey::new(application_id, project_id), reference);
    }

    fn evict_objects(&self, application_ids: &[String]) {
        if application_ids.is_empty() {
            return;
        }
        let evicted: HashSet<&str> = application_ids.iter().map(String::as_str).collect();
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !evicted.contains(key.application_id.as_str()));
        debug!(
            requested = application_ids.len(),
            removed = before.saturating_sub(self.entries.len()),
            "evicted changed objects"
        );
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn try_get_value(&self, project_id: &str, application_id: &str) -> Option<ObjectReference> {
        let found = self
            .entries
            .get(&CacheKey::new(application_id, project_id))
            .map(|entry| entry.value().clone());
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn refs(pairs: &[(&str, &str)]) -> IndexMap<String, ObjectReference> {
        pairs
            .iter()
            .map(|(app, obj)| {
                (
                    app.to_string(),
                    ObjectReference::new(*obj).with_application_id(*app),
                )
            })
            .collect()
    }

    #[test]
    fn test_store_then_evict_misses() {
        let cache = InMemorySendConversionCache::new();
        cache.store_send_result("p1", refs(&[("X", "hash-x"), ("Y", "hash-y")]));
        assert!(cache.try_get_value("p1", "X").is_some());

        cache.evict_objects(&["X".to_string()]);

        assert!(cache.try_get_value("p1", "X").is_none());
        assert_eq!(
            cache.try_get_value("p1", "Y").map(|r| r.referenced_id),
            Some("hash-y".to_string())
        );
    }

    #[test]
    fn test_projects_are_namespaced() {
        let cache = InMemorySendConversionCache::new();
        cache.append_send_result("p1", "X", ObjectReference::new("in-p1"));
        cache.append_send_result("p2", "X", ObjectReference::new("in-p2"));

        assert_eq!(cache.try_get_value("p1", "X").unwrap().referenced_id, "in-p1");
        assert_eq!(cache.try_get_value("p2", "X").unwrap().referenced_id, "in-p2");
        assert!(cache.try_get_value("p3", "X").is_none());

        // Eviction is by object, across projects.
        cache.evict_objects(&["X".to_string()]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats_count_hits_and_misses() {
        let cache = InMemorySendConversionCache::new();
        cache.append_send_result("p", "a", ObjectReference::new("r"));
        cache.try_get_value("p", "a");
        cache.try_get_value("p", "b");
        cache.try_get_value("p", "b");
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 2,
                entries: 1
            }
        );
    }

    #[test]
    fn test_invalid_shard_amount() {
        let config = CacheConfig::new().with_shards(3);
        assert_eq!(
            InMemorySendConversionCache::with_config(&config).unwrap_err(),
            CacheError::InvalidShardAmount(3)
        );
        let config = CacheConfig::new().with_shards(8);
        assert!(InMemorySendConversionCache::with_config(&config).is_ok());
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let cache = Arc::new(InMemorySendConversionCache::new());

        std::thread::scope(|scope| {
            for project in 0..4 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    let project_id = format!("p{project}");
                    for i in 0..250 {
                        let app = format!("obj{i}");
                        let reference = ObjectReference::new(format!("{project_id}/{app}"));
                        cache.append_send_result(&project_id, &app, reference);
                        assert!(cache.try_get_value(&project_id, &app).is_some());
                    }
                });
            }
        });

        assert_eq!(cache.len(), 1000);
        assert_eq!(cache.try_get_value("p2", "obj17").unwrap().referenced_id, "p2/obj17");
    }

    #[test]
    fn test_object_reference_wire_shape() {
        let reference = ObjectReference::new("abc").with_application_id("app");
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json, serde_json::json!({ "referencedId": "abc", "applicationId": "app" }));
    }
}
