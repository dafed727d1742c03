//! Exchange of atomic geometry between documents.

use crate::document::{LayerId, ObjectId, ObjectKind, SceneDocument};
use crate::geometry::Geometry;
use blockgraph_core::LocalToGlobalMap;
use blockgraph_instances::HasApplicationId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A converted atomic object as it travels between documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedGeometry {
    /// Id of the object in the sending document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    /// Geometry in the coordinates of its owner.
    pub geometry: Geometry,
}

impl HasApplicationId for ReceivedGeometry {
    fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }
}

impl SceneDocument {
    /// Convert an atomic object for sending, in its owner's coordinates.
    pub fn export_geometry(&self, id: ObjectId) -> Option<ReceivedGeometry> {
        match &self.object(id)?.kind {
            ObjectKind::Geometry(geometry) => Some(ReceivedGeometry {
                application_id: Some(id.to_string()),
                geometry: geometry.clone(),
            }),
            _ => None,
        }
    }

    /// Add a received object at the scene root, unchanged.
    pub fn add_received(&mut self, received: &ReceivedGeometry) -> ObjectId {
        self.add_geometry(received.geometry.clone())
    }

    /// Place flattened objects in world coordinates under `base_layer`.
    ///
    /// Each map becomes one new scene object: its geometry moved by the map's
    /// absolute transform, on the layer `base_layer / layer_path...`.
    pub fn place_flattened(
        &mut self,
        maps: &[LocalToGlobalMap<'_, ReceivedGeometry>],
        base_layer: &str,
    ) -> Vec<ObjectId> {
        let placed: Vec<ObjectId> = maps
            .iter()
            .map(|map| {
                let geometry = map.atomic.geometry.transformed(&map.absolute_transform());
                let layer = self.layer_under(base_layer, map.layer_path);
                self.insert_geometry(geometry, layer)
            })
            .collect();
        debug!(placed = placed.len(), base_layer, "placed flattened objects");
        placed
    }

    /// Find or create `base_layer / path...`.
    pub(crate) fn layer_under(&mut self, base_layer: &str, path: &[String]) -> Option<LayerId> {
        let full: Vec<&str> = std::iter::once(base_layer)
            .chain(path.iter().map(String::as_str))
            .collect();
        self.ensure_layer_path(&full)
    }
}
