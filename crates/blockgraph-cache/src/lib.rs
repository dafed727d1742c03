//! Cache of converted send results.
//!
//! When a model is sent repeatedly, atomic objects that did not change since
//! the last send do not need to be converted again: their previously
//! uploaded [`ObjectReference`] can be reused. Entries are keyed by
//! `(application_id, project_id)` because the same host object sent to two
//! projects is uploaded twice.
//!
//! The cache is only as correct as its invalidation. Whoever watches the host
//! document must call [`SendConversionCache::evict_objects`] for every object
//! that changes, before the next send reads from the cache.

mod cache;
mod error;

pub use cache::{CacheConfig, CacheKey, CacheStats, InMemorySendConversionCache};
pub use error::{CacheError, Result};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reference to an object already uploaded to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    /// Id of the uploaded object.
    pub referenced_id: String,
    /// Host application id the object was converted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    /// Ids of child objects and their depth below the referenced object.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub closure: IndexMap<String, u32>,
}

impl ObjectReference {
    /// Reference without a closure.
    pub fn new(referenced_id: impl Into<String>) -> Self {
        Self {
            referenced_id: referenced_id.into(),
            application_id: None,
            closure: IndexMap::new(),
        }
    }

    /// Set the source application id.
    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }
}

/// Shared store of send results.
///
/// Implementations must be safe to use from concurrent send operations.
pub trait SendConversionCache: Send + Sync {
    /// Record every reference produced by one send to `project_id`.
    fn store_send_result(&self, project_id: &str, references: IndexMap<String, ObjectReference>);

    /// Record a single reference.
    fn append_send_result(
        &self,
        project_id: &str,
        application_id: &str,
        reference: ObjectReference,
    );

    /// Drop every entry of the given application ids, in all projects.
    fn evict_objects(&self, application_ids: &[String]);

    /// Drop everything.
    fn clear(&self);

    /// Look up the reference of `application_id` in `project_id`.
    fn try_get_value(&self, project_id: &str, application_id: &str) -> Option<ObjectReference>;
}
