//! Leaf geometry stored in a document.

use blockgraph_core::Transform;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Geometry of an atomic object, in the coordinates of its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Geometry {
    /// A single point.
    Point {
        /// Location.
        position: DVec3,
    },
    /// An open or closed polyline.
    Polyline {
        /// Vertices in order.
        points: Vec<DVec3>,
    },
    /// A triangle mesh.
    Mesh(TriangleMesh),
}

impl Geometry {
    /// A point.
    pub fn point(position: DVec3) -> Self {
        Geometry::Point { position }
    }

    /// A polyline through `points`.
    pub fn polyline(points: Vec<DVec3>) -> Self {
        Geometry::Polyline { points }
    }

    /// Name of the geometry kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::Polyline { .. } => "Polyline",
            Geometry::Mesh(_) => "Mesh",
        }
    }

    /// Every vertex of the geometry.
    pub fn vertices(&self) -> &[DVec3] {
        match self {
            Geometry::Point { position } => std::slice::from_ref(position),
            Geometry::Polyline { points } => points,
            Geometry::Mesh(mesh) => &mesh.positions,
        }
    }

    /// Copy with every vertex mapped through `transform`.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let map = |points: &[DVec3]| -> Vec<DVec3> {
            points.iter().map(|p| transform.transform_point(*p)).collect()
        };
        match self {
            Geometry::Point { position } => Geometry::Point {
                position: transform.transform_point(*position),
            },
            Geometry::Polyline { points } => Geometry::Polyline {
                points: map(points),
            },
            Geometry::Mesh(mesh) => Geometry::Mesh(TriangleMesh {
                positions: map(&mesh.positions),
                indices: mesh.indices.clone(),
            }),
        }
    }

    /// Axis-aligned bounds.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices())
    }

    /// Whether both geometries have the same kind and vertices within `epsilon`.
    pub fn approx_eq(&self, other: &Geometry, epsilon: f64) -> bool {
        self.kind() == other.kind()
            && self.vertices().len() == other.vertices().len()
            && self
                .vertices()
                .iter()
                .zip(other.vertices())
                .all(|(a, b)| a.abs_diff_eq(*b, epsilon))
    }
}

/// A triangle mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub positions: Vec<DVec3>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create a mesh.
    pub fn new(positions: Vec<DVec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl BoundingBox {
    /// Create from a set of points.
    pub fn from_points(points: &[DVec3]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::default();
        };
        rest.iter().fold(
            Self {
                min: *first,
                max: *first,
            },
            |mut bounds, p| {
                bounds.expand_point(*p);
                bounds
            },
        )
    }

    /// Center of the box.
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) / 2.0
    }

    /// Expand to include another box.
    pub fn expand(&mut self, other: &BoundingBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Expand to include a point.
    pub fn expand_point(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}
