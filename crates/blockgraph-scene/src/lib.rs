//! An in-memory block document for the instance engines.
//!
//! [`SceneDocument`] stores geometry, block definitions, placements and a
//! layer tree, and implements [`InstanceHost`](blockgraph_instances::InstanceHost)
//! so it can be unpacked, baked into and purged. [`WorldTraverser`] walks the
//! document natively in world coordinates, which gives flattening results
//! something to be compared against.

pub mod document;
pub mod error;
pub mod geometry;
pub mod host;
pub mod received;
pub mod traverse;

pub use document::{
    BlockDefinition, DefinitionId, Layer, LayerId, ObjectId, ObjectKind, Owner, SceneDocument,
    SceneObject,
};
pub use error::{Result, SceneError};
pub use geometry::{BoundingBox, Geometry, TriangleMesh};
pub use received::ReceivedGeometry;
pub use traverse::{WorldObject, WorldTraverser};
