//! Native world-space traversal of a document.

use crate::document::{ObjectId, ObjectKind, SceneDocument};
use crate::geometry::Geometry;
use blockgraph_core::Transform;

/// A geometry object reached through one chain of placements.
#[derive(Debug, Clone)]
pub struct WorldObject<'a> {
    /// The geometry object.
    pub id: ObjectId,
    /// Geometry in its owner's coordinates.
    pub geometry: &'a Geometry,
    /// Product of the placement transforms on the way down.
    pub transform: Transform,
    /// Placements on the way down, outermost first.
    pub placements: Vec<ObjectId>,
}

impl<'a> WorldObject<'a> {
    /// Geometry in world coordinates.
    pub fn world_geometry(&self) -> Geometry {
        self.geometry.transformed(&self.transform)
    }
}

/// Depth-first iterator over every geometry object in world coordinates.
pub struct WorldTraverser<'a> {
    document: &'a SceneDocument,
    stack: Vec<(ObjectId, Transform, Vec<ObjectId>)>,
}

impl<'a> WorldTraverser<'a> {
    pub(crate) fn new(document: &'a SceneDocument) -> Self {
        let roots: Vec<ObjectId> = document.roots().map(|o| o.id).collect();
        let stack = roots
            .into_iter()
            .rev()
            .map(|id| (id, Transform::IDENTITY, Vec::new()))
            .collect();
        Self { document, stack }
    }
}

impl<'a> Iterator for WorldTraverser<'a> {
    type Item = WorldObject<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, parent, placements)) = self.stack.pop() {
            let Some(object) = self.document.object(id) else {
                continue;
            };
            match &object.kind {
                ObjectKind::Geometry(geometry) => {
                    return Some(WorldObject {
                        id,
                        geometry,
                        transform: parent,
                        placements,
                    });
                }
                ObjectKind::Instance {
                    definition,
                    transform,
                } => {
                    let Some(definition) = self.document.definition(*definition) else {
                        continue;
                    };
                    let world = parent * *transform;
                    let mut path = placements;
                    path.push(id);
                    // Push members in reverse so they come out in order.
                    for member in definition.members.iter().rev() {
                        self.stack.push((*member, world, path.clone()));
                    }
                }
                ObjectKind::Unsupported(_) => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::document::SceneDocument;
    use crate::geometry::Geometry;
    use blockgraph_core::{Transform, Units};
    use glam::DVec3;

    #[test]
    fn test_nested_world_positions() {
        let mut doc = SceneDocument::new(Units::Meters);
        let rim = doc.add_geometry(Geometry::point(DVec3::ZERO));
        let wheel = doc.define_block("Wheel", "", &[rim]).unwrap();
        let w1 = doc
            .place_block(wheel, Transform::from_translation(DVec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        let w2 = doc
            .place_block(wheel, Transform::from_translation(DVec3::new(-1.0, 0.0, 0.0)))
            .unwrap();
        let car = doc.define_block("Car", "", &[w1, w2]).unwrap();
        let c = doc
            .place_block(car, Transform::from_translation(DVec3::new(0.0, 10.0, 0.0)))
            .unwrap();
        doc.add_geometry(Geometry::point(DVec3::Z));

        let world: Vec<_> = doc.world_geometry().collect();

        assert_eq!(world.len(), 3);
        assert_eq!(world[0].placements, vec![c, w1]);
        assert_eq!(
            world[0].world_geometry(),
            Geometry::point(DVec3::new(1.0, 10.0, 0.0))
        );
        assert_eq!(
            world[1].world_geometry(),
            Geometry::point(DVec3::new(-1.0, 10.0, 0.0))
        );
        assert!(world[2].placements.is_empty());
    }
}
