//! Send planning against the conversion cache.

use crate::host::InstanceHost;
use blockgraph_cache::{ObjectReference, SendConversionCache};
use tracing::debug;

/// Atomic objects of a send, split by cache state.
#[derive(Debug)]
pub struct SendPlan<'a, O> {
    /// Objects whose previous conversion can be reused.
    pub cached: Vec<(&'a O, ObjectReference)>,
    /// Objects that must be converted.
    pub to_convert: Vec<&'a O>,
}

impl<'a, O> SendPlan<'a, O> {
    /// Share of objects served from the cache.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.cached.len() + self.to_convert.len();
        if total == 0 {
            0.0
        } else {
            self.cached.len() as f64 / total as f64
        }
    }
}

/// Split `objects` into cache hits for `project_id` and objects to convert.
///
/// Objects without an application id cannot be looked up and are always
/// converted.
pub fn partition_by_cache<'a, H: InstanceHost>(
    host: &H,
    objects: &'a [H::Object],
    cache: &dyn SendConversionCache,
    project_id: &str,
) -> SendPlan<'a, H::Object> {
    let mut plan = SendPlan {
        cached: Vec::new(),
        to_convert: Vec::new(),
    };

    for object in objects {
        let hit = host
            .object_id(object)
            .and_then(|id| cache.try_get_value(project_id, &id));
        match hit {
            Some(reference) => plan.cached.push((object, reference)),
            None => plan.to_convert.push(object),
        }
    }

    debug!(
        project_id,
        cached = plan.cached.len(),
        to_convert = plan.to_convert.len(),
        "planned send"
    );
    plan
}
