//! Operation results: unpacked selections, bake outcomes and flattened maps.

use crate::errors::InstanceError;
use crate::proxy::{InstanceDefinitionProxy, InstanceProxy};
use crate::transform::{collapse, Transform};
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Output of unpacking a host selection.
#[derive(Debug, Clone)]
pub struct UnpackResult<T> {
    /// Host-native leaf objects, not yet converted. Instance references are
    /// never listed here.
    pub atomic_objects: Vec<T>,
    /// Placements keyed by application id.
    pub instance_proxies: IndexMap<String, InstanceProxy>,
    /// Definitions in discovery order.
    pub instance_definition_proxies: Vec<InstanceDefinitionProxy>,
    /// Objects that were skipped, with the reason.
    pub issues: Vec<ConversionReport>,
}

impl<T> Default for UnpackResult<T> {
    fn default() -> Self {
        Self {
            atomic_objects: Vec::new(),
            instance_proxies: IndexMap::new(),
            instance_definition_proxies: Vec::new(),
            issues: Vec::new(),
        }
    }
}

impl<T> UnpackResult<T> {
    /// Look up a definition by application id.
    pub fn definition(&self, id: &str) -> Option<&InstanceDefinitionProxy> {
        self.instance_definition_proxies
            .iter()
            .find(|d| d.application_id == id)
    }

    /// Whether nothing instanced was found.
    pub fn is_flat(&self) -> bool {
        self.instance_proxies.is_empty() && self.instance_definition_proxies.is_empty()
    }
}

/// Outcome of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The item was converted or realized.
    Success,
    /// The item failed; see the report's error.
    Error,
}

/// Per-item success or failure record.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Outcome.
    pub status: Status,
    /// Application id of the source item, when it has one.
    pub source_id: Option<String>,
    /// Host id of the created object on success.
    pub result_id: Option<String>,
    /// Human readable kind of the created object.
    pub result_type: Option<String>,
    /// Cause of the failure.
    pub error: Option<InstanceError>,
}

impl ConversionReport {
    /// Successful realization of `source_id` as host object `result_id`.
    pub fn success(
        source_id: impl Into<String>,
        result_id: impl Into<String>,
        result_type: impl Into<String>,
    ) -> Self {
        Self {
            status: Status::Success,
            source_id: Some(source_id.into()),
            result_id: Some(result_id.into()),
            result_type: Some(result_type.into()),
            error: None,
        }
    }

    /// Failure of `source_id`.
    pub fn failure(source_id: Option<String>, error: InstanceError) -> Self {
        Self {
            status: Status::Error,
            source_id,
            result_id: None,
            result_type: None,
            error: Some(error),
        }
    }

    /// Whether the item succeeded.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Output of baking a received instance graph into a host document.
#[derive(Debug, Clone, Default)]
pub struct BakeResult {
    /// Host ids of objects created by the bake and still present.
    pub created_ids: Vec<String>,
    /// Host ids of previously baked objects absorbed into new definitions.
    pub consumed_ids: Vec<String>,
    /// One record per processed component.
    pub conversion_results: Vec<ConversionReport>,
}

impl BakeResult {
    /// Number of failed components.
    pub fn error_count(&self) -> usize {
        self.conversion_results
            .iter()
            .filter(|r| !r.is_success())
            .count()
    }

    /// Errors of the failed components.
    pub fn errors(&self) -> impl Iterator<Item = &InstanceError> {
        self.conversion_results.iter().filter_map(|r| r.error.as_ref())
    }
}

/// A received node handed to the flattener.
#[derive(Debug, Clone)]
pub enum ReceivedNode<T> {
    /// A placement record.
    Instance(InstanceProxy),
    /// A converted leaf object.
    Atomic(T),
}

/// A received node together with the collection path it was found under.
#[derive(Debug, Clone)]
pub struct TraversalItem<T> {
    /// Names of the enclosing collections, outermost first.
    pub layer_path: Vec<String>,
    /// The node itself.
    pub node: ReceivedNode<T>,
}

impl<T> TraversalItem<T> {
    /// An atomic object under `layer_path`.
    pub fn atomic(layer_path: Vec<String>, object: T) -> Self {
        Self {
            layer_path,
            node: ReceivedNode::Atomic(object),
        }
    }

    /// A placement under `layer_path`.
    pub fn instance(layer_path: Vec<String>, proxy: InstanceProxy) -> Self {
        Self {
            layer_path,
            node: ReceivedNode::Instance(proxy),
        }
    }
}

/// Transform chain, innermost placement first. Most chains are shallow.
pub type TransformChain = SmallVec<[Transform; 4]>;

/// One reachable instantiation path of an atomic object.
#[derive(Debug, Clone)]
pub struct LocalToGlobalMap<'a, T> {
    /// Collection path of the atomic object.
    pub layer_path: &'a [String],
    /// The atomic object.
    pub atomic: &'a T,
    /// Placement transforms along this path, innermost first.
    pub matrices: TransformChain,
}

impl<'a, T> LocalToGlobalMap<'a, T> {
    /// Absolute transform of the object along this path.
    ///
    /// See [`collapse`] for the multiplication order.
    pub fn absolute_transform(&self) -> Transform {
        collapse(&self.matrices)
    }

    /// Whether the object sits at the scene root.
    pub fn is_absolute(&self) -> bool {
        self.matrices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use smallvec::smallvec;

    #[test]
    fn test_bake_result_error_count() {
        let result = BakeResult {
            created_ids: vec!["h1".into()],
            consumed_ids: vec![],
            conversion_results: vec![
                ConversionReport::success("i1", "h1", "Instance"),
                ConversionReport::failure(
                    Some("i2".into()),
                    InstanceError::missing_definition("i2", "d9"),
                ),
            ],
        };
        assert_eq!(result.error_count(), 1);
        assert!(matches!(
            result.errors().next(),
            Some(InstanceError::MissingDefinition { .. })
        ));
    }

    #[test]
    fn test_map_absolute_transform() {
        let path = vec!["Layer".to_string()];
        let object = 7u32;
        let map = LocalToGlobalMap {
            layer_path: &path,
            atomic: &object,
            matrices: smallvec![
                Transform::from_translation(DVec3::X),
                Transform::from_translation(DVec3::Y),
            ],
        };
        assert!(!map.is_absolute());
        let t = map.absolute_transform().translation();
        assert!((t - DVec3::new(1.0, 1.0, 0.0)).length() < 1e-12);
    }
}
