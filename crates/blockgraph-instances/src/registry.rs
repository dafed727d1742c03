//! Arena of proxies collected while unpacking.

use blockgraph_core::{
    ConversionReport, InstanceDefinitionProxy, InstanceError, InstanceProxy, Transform,
    UnpackResult, Units,
};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

/// Outcome of registering one occurrence of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First occurrence; members must be walked.
    New,
    /// Seen before at a shallower depth; members must be walked again to
    /// carry the increase down.
    Promoted {
        /// Increase of the recorded depth.
        depth_difference: u32,
    },
    /// Seen before at this depth or deeper.
    Known,
}

impl Registration {
    /// Whether the definition's members need a (re)walk.
    pub fn needs_walk(&self) -> bool {
        !matches!(self, Registration::Known)
    }
}

/// Indexed store of atomic objects, placements and definitions.
///
/// Entries keep their discovery order; their position in the arena is their
/// index.
#[derive(Debug)]
pub struct ProxyRegistry<O> {
    atomic_objects: Vec<O>,
    atomic_ids: IndexSet<String>,
    instances: IndexMap<String, InstanceProxy>,
    definitions: IndexMap<String, InstanceDefinitionProxy>,
    issues: Vec<ConversionReport>,
}

impl<O> Default for ProxyRegistry<O> {
    fn default() -> Self {
        Self {
            atomic_objects: Vec::new(),
            atomic_ids: IndexSet::new(),
            instances: IndexMap::new(),
            definitions: IndexMap::new(),
            issues: Vec::new(),
        }
    }
}

impl<O> ProxyRegistry<O> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an atomic object once.
    pub fn add_atomic(&mut self, id: String, object: O) -> bool {
        if self.atomic_ids.insert(id) {
            self.atomic_objects.push(object);
            true
        } else {
            false
        }
    }

    /// Record one occurrence of a placement at `depth`.
    ///
    /// The recorded depth only ever grows.
    pub fn register_instance(
        &mut self,
        id: &str,
        definition_id: &str,
        transform: Transform,
        units: Units,
        depth: u32,
    ) -> usize {
        let entry = self.instances.entry(id.to_string());
        let index = entry.index();
        entry
            .and_modify(|proxy| proxy.max_depth = proxy.max_depth.max(depth))
            .or_insert_with(|| {
                InstanceProxy::new(id, definition_id, transform, units).at_depth(depth)
            });
        index
    }

    /// Record one occurrence of a definition at `depth`.
    pub fn register_definition(
        &mut self,
        id: &str,
        name: Option<&str>,
        depth: u32,
    ) -> Registration {
        if let Some(existing) = self.definitions.get_mut(id) {
            if depth <= existing.max_depth {
                return Registration::Known;
            }
            let depth_difference = depth - existing.max_depth;
            debug!(
                definition = id,
                from = existing.max_depth,
                to = depth,
                depth_difference,
                "promoting definition depth"
            );
            existing.max_depth = depth;
            return Registration::Promoted { depth_difference };
        }

        let mut proxy = InstanceDefinitionProxy::new(id).at_depth(depth);
        proxy.name = name.map(str::to_string);
        self.definitions.insert(id.to_string(), proxy);
        Registration::New
    }

    /// Add a member id to a registered definition.
    pub fn add_member(&mut self, definition_id: &str, member_id: &str) {
        if let Some(definition) = self.definitions.get_mut(definition_id) {
            definition.add_object(member_id);
        }
    }

    /// Record a skipped object.
    pub fn report(&mut self, source_id: Option<String>, error: InstanceError) {
        self.issues.push(ConversionReport::failure(source_id, error));
    }

    /// Recorded depth of a definition.
    pub fn definition_depth(&self, id: &str) -> Option<u32> {
        self.definitions.get(id).map(|d| d.max_depth)
    }

    /// Number of registered placements.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of registered definitions.
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Close the registry.
    ///
    /// Every placement takes the depth of the definition it places, so all
    /// placements of one definition agree.
    pub fn finish(mut self) -> UnpackResult<O> {
        for proxy in self.instances.values_mut() {
            if let Some(definition) = self.definitions.get(&proxy.definition_id) {
                proxy.max_depth = proxy.max_depth.max(definition.max_depth);
            }
        }

        UnpackResult {
            atomic_objects: self.atomic_objects,
            instance_proxies: self.instances,
            instance_definition_proxies: self.definitions.into_values().collect(),
            issues: self.issues,
        }
    }
}
