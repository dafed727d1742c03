//! SceneDocument: an in-memory block document.
//!
//! Every object is owned either by the scene root or by exactly one block
//! definition. Definitions are built from objects already in the scene,
//! which moves them out of the scene, so definition nesting is always
//! acyclic.

use crate::error::{Result, SceneError};
use crate::geometry::Geometry;
use crate::traverse::WorldTraverser;
use blockgraph_core::{Transform, Units};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use tracing::debug;

macro_rules! handle_type {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Parse a handle produced by `Display`.
            pub fn parse(handle: &str) -> Result<Self> {
                handle
                    .strip_prefix($prefix)
                    .and_then(|n| n.parse().ok())
                    .map($name)
                    .ok_or_else(|| SceneError::MalformedHandle(handle.to_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

/// Id of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Id of a block definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(pub u64);

/// Index of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub usize);

handle_type!(ObjectId, "obj-");
handle_type!(DefinitionId, "def-");
handle_type!(LayerId, "layer-");

/// Owner of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Placed directly in the scene, in world coordinates.
    Scene,
    /// Member of a definition, in definition coordinates.
    Definition(DefinitionId),
}

/// What an object is.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Leaf geometry.
    Geometry(Geometry),
    /// A placement of a definition.
    Instance {
        /// Placed definition.
        definition: DefinitionId,
        /// Placement transform, local to the owner.
        transform: Transform,
    },
    /// An object kind the instance engines do not handle.
    Unsupported(String),
}

/// An object in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Object id.
    pub id: ObjectId,
    /// Scene or definition owning the object.
    pub owner: Owner,
    /// Layer the object sits on.
    pub layer: Option<LayerId>,
    /// Payload.
    pub kind: ObjectKind,
}

/// A block definition.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDefinition {
    /// Definition id.
    pub id: DefinitionId,
    /// Name shown to the user.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Member objects in order.
    pub members: Vec<ObjectId>,
}

/// A named layer, optionally nested under a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Layer name.
    pub name: String,
    /// Parent layer.
    pub parent: Option<LayerId>,
}

/// In-memory block document.
#[derive(Debug, Clone, Default)]
pub struct SceneDocument {
    units: Units,
    objects: IndexMap<ObjectId, SceneObject>,
    definitions: IndexMap<DefinitionId, BlockDefinition>,
    layers: Vec<Layer>,
    next_id: u64,
    changed: IndexSet<ObjectId>,
}

impl SceneDocument {
    /// Create an empty document in `units`.
    pub fn new(units: Units) -> Self {
        Self {
            units,
            ..Default::default()
        }
    }

    /// Units of the document.
    pub fn units(&self) -> Units {
        self.units
    }

    /// Look up an object.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Look up a definition.
    pub fn definition(&self, id: DefinitionId) -> Option<&BlockDefinition> {
        self.definitions.get(&id)
    }

    /// All definitions in creation order.
    pub fn definitions(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.definitions.values()
    }

    /// Find a definition by name.
    pub fn definition_by_name(&self, name: &str) -> Option<&BlockDefinition> {
        self.definitions.values().find(|d| d.name == name)
    }

    /// Number of objects, including definition members.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Objects owned by the scene root, in creation order.
    pub fn scene_objects(&self) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.owner == Owner::Scene)
            .map(|o| o.id)
            .collect()
    }

    /// Placements of `definition`, wherever they sit.
    pub fn placements_of(&self, definition: DefinitionId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| {
                matches!(o.kind, ObjectKind::Instance { definition: d, .. } if d == definition)
            })
            .map(|o| o.id)
            .collect()
    }

    /// Add geometry at the scene root.
    pub fn add_geometry(&mut self, geometry: Geometry) -> ObjectId {
        self.insert(ObjectKind::Geometry(geometry), None)
    }

    /// Add geometry at the scene root on `layer`.
    pub fn add_geometry_on(&mut self, geometry: Geometry, layer: LayerId) -> Result<ObjectId> {
        self.check_layer(layer)?;
        Ok(self.insert(ObjectKind::Geometry(geometry), Some(layer)))
    }

    /// Add an object of a kind the instance engines cannot handle.
    pub fn add_unsupported(&mut self, type_name: impl Into<String>) -> ObjectId {
        self.insert(ObjectKind::Unsupported(type_name.into()), None)
    }

    /// Build a definition from scene objects, moving them into it.
    pub fn define_block(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        members: &[ObjectId],
    ) -> Result<DefinitionId> {
        let name = name.into();
        if members.is_empty() {
            return Err(SceneError::EmptyDefinition(name));
        }
        for member in members {
            match self.objects.get(member) {
                None => return Err(SceneError::UnknownObject(*member)),
                Some(object) if object.owner != Owner::Scene => {
                    return Err(SceneError::NotInScene(*member))
                }
                Some(_) => {}
            }
        }

        let id = DefinitionId(self.allocate_id());
        for member in members {
            if let Some(object) = self.objects.get_mut(member) {
                object.owner = Owner::Definition(id);
            }
        }
        debug!(definition = %id, name = %name, members = members.len(), "defined block");
        self.definitions.insert(
            id,
            BlockDefinition {
                id,
                name,
                description: description.into(),
                members: members.to_vec(),
            },
        );
        Ok(id)
    }

    /// Place a definition at the scene root.
    pub fn place_block(
        &mut self,
        definition: DefinitionId,
        transform: Transform,
    ) -> Result<ObjectId> {
        self.place_block_on(definition, transform, None)
    }

    /// Place a definition at the scene root on an optional layer.
    pub fn place_block_on(
        &mut self,
        definition: DefinitionId,
        transform: Transform,
        layer: Option<LayerId>,
    ) -> Result<ObjectId> {
        if !self.definitions.contains_key(&definition) {
            return Err(SceneError::UnknownDefinition(definition));
        }
        if let Some(layer) = layer {
            self.check_layer(layer)?;
        }
        Ok(self.insert(
            ObjectKind::Instance {
                definition,
                transform,
            },
            layer,
        ))
    }

    /// Apply `transform` to an object in place.
    pub fn transform_object(&mut self, id: ObjectId, transform: &Transform) -> Result<()> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(SceneError::UnknownObject(id))?;
        match &mut object.kind {
            ObjectKind::Geometry(geometry) => *geometry = geometry.transformed(transform),
            ObjectKind::Instance { transform: t, .. } => *t = *transform * *t,
            ObjectKind::Unsupported(_) => {}
        }
        self.changed.insert(id);
        Ok(())
    }

    /// Remove a scene-owned object.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<SceneObject> {
        match self.objects.get(&id) {
            None => Err(SceneError::UnknownObject(id)),
            Some(object) if object.owner != Owner::Scene => Err(SceneError::NotInScene(id)),
            Some(_) => {
                self.changed.insert(id);
                self.objects
                    .shift_remove(&id)
                    .ok_or(SceneError::UnknownObject(id))
            }
        }
    }

    /// Delete a definition, its members and every placement of it.
    pub fn delete_definition(&mut self, id: DefinitionId) -> Result<BlockDefinition> {
        let definition = self
            .definitions
            .shift_remove(&id)
            .ok_or(SceneError::UnknownDefinition(id))?;

        let placements = self.placements_of(id);
        for placement in &placements {
            if let Some(SceneObject {
                owner: Owner::Definition(outer),
                ..
            }) = self.objects.get(placement)
            {
                let outer = *outer;
                if let Some(outer) = self.definitions.get_mut(&outer) {
                    outer.members.retain(|m| m != placement);
                }
            }
        }
        for removed in placements.iter().chain(&definition.members) {
            if self.objects.shift_remove(removed).is_some() {
                self.changed.insert(*removed);
            }
        }

        debug!(definition = %id, placements = placements.len(), "deleted definition");
        Ok(definition)
    }

    /// Find or create the nested layer `path[0] / path[1] / ...`.
    pub fn ensure_layer_path<S: AsRef<str>>(&mut self, path: &[S]) -> Option<LayerId> {
        let mut parent = None;
        for name in path {
            let name = name.as_ref();
            let existing = self
                .layers
                .iter()
                .position(|l| l.parent == parent && l.name == name);
            let index = match existing {
                Some(index) => index,
                None => {
                    self.layers.push(Layer {
                        name: name.to_string(),
                        parent,
                    });
                    self.layers.len() - 1
                }
            };
            parent = Some(LayerId(index));
        }
        parent
    }

    /// Names from the outermost layer down to `layer`.
    pub fn layer_path(&self, layer: LayerId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(layer);
        while let Some(LayerId(index)) = current {
            let Some(layer) = self.layers.get(index) else {
                break;
            };
            path.push(layer.name.clone());
            current = layer.parent;
        }
        path.reverse();
        path
    }

    /// Ids of objects added, edited or removed since the last call.
    pub fn take_changed_ids(&mut self) -> Vec<String> {
        self.changed.drain(..).map(|id| id.to_string()).collect()
    }

    /// Every geometry object in world coordinates, one entry per placement path.
    pub fn world_geometry(&self) -> WorldTraverser<'_> {
        WorldTraverser::new(self)
    }

    pub(crate) fn roots(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values().filter(|o| o.owner == Owner::Scene)
    }

    fn check_layer(&self, layer: LayerId) -> Result<()> {
        if layer.0 < self.layers.len() {
            Ok(())
        } else {
            Err(SceneError::UnknownLayer(layer.to_string()))
        }
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn insert_geometry(
        &mut self,
        geometry: Geometry,
        layer: Option<LayerId>,
    ) -> ObjectId {
        self.insert(ObjectKind::Geometry(geometry), layer)
    }

    fn insert(&mut self, kind: ObjectKind, layer: Option<LayerId>) -> ObjectId {
        let id = ObjectId(self.allocate_id());
        self.objects.insert(
            id,
            SceneObject {
                id,
                owner: Owner::Scene,
                layer,
                kind,
            },
        );
        self.changed.insert(id);
        id
    }
}
