//! The instance host interface for [`SceneDocument`].

use crate::document::{DefinitionId, LayerId, ObjectId, ObjectKind, SceneDocument};
use blockgraph_core::{InstanceError, Result, Transform, Units};
use blockgraph_instances::{DefinitionView, InstanceHost, ObjectShape};

impl InstanceHost for SceneDocument {
    type Object = ObjectId;

    fn object_id(&self, object: &ObjectId) -> Option<String> {
        self.object(*object).map(|o| o.id.to_string())
    }

    fn type_name(&self, object: &ObjectId) -> String {
        match self.object(*object).map(|o| &o.kind) {
            Some(ObjectKind::Geometry(geometry)) => geometry.kind().to_string(),
            Some(ObjectKind::Instance { .. }) => "BlockInstance".to_string(),
            Some(ObjectKind::Unsupported(name)) => name.clone(),
            None => "Missing".to_string(),
        }
    }

    fn inspect(&self, object: &ObjectId) -> Result<ObjectShape<ObjectId>> {
        let found = self
            .object(*object)
            .ok_or_else(|| InstanceError::unsupported(object.to_string(), "Missing"))?;
        match &found.kind {
            ObjectKind::Geometry(_) => Ok(ObjectShape::Atomic),
            ObjectKind::Instance {
                definition,
                transform,
            } => {
                let block = self.definition(*definition).ok_or_else(|| {
                    InstanceError::missing_definition(object.to_string(), definition.to_string())
                })?;
                Ok(ObjectShape::Instance {
                    definition: DefinitionView::new(block.id.to_string(), block.members.clone())
                        .named(&block.name),
                    transform: *transform,
                })
            }
            ObjectKind::Unsupported(type_name) => {
                Err(InstanceError::unsupported(object.to_string(), type_name))
            }
        }
    }

    fn model_units(&self) -> Units {
        self.units()
    }

    fn ensure_layer(&mut self, path: &[String], base_layer: &str) -> Result<String> {
        self.layer_under(base_layer, path)
            .map(|layer| layer.to_string())
            .ok_or_else(|| InstanceError::host_mutation(base_layer, "empty layer path"))
    }

    fn create_definition(
        &mut self,
        name: &str,
        description: &str,
        members: &[String],
    ) -> Result<String> {
        let members = members
            .iter()
            .map(|handle| ObjectId::parse(handle))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let id = self.define_block(name, description, &members)?;
        Ok(id.to_string())
    }

    fn place_instance(
        &mut self,
        definition: &str,
        transform: &Transform,
        layer: &str,
    ) -> Result<String> {
        let definition = DefinitionId::parse(definition)?;
        let layer = LayerId::parse(layer)?;
        let id = self.place_block_on(definition, *transform, Some(layer))?;
        Ok(id.to_string())
    }

    fn definitions(&self) -> Vec<(String, String)> {
        SceneDocument::definitions(self)
            .map(|d| (d.id.to_string(), d.name.clone()))
            .collect()
    }

    fn delete_definition(&mut self, definition: &str) -> Result<()> {
        let id = DefinitionId::parse(definition)?;
        SceneDocument::delete_definition(self, id)?;
        Ok(())
    }
}
