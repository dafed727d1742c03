//! In-memory host used by the unit tests.

use crate::host::{DefinitionView, InstanceHost, ObjectShape};
use blockgraph_core::{InstanceError, Result, Transform, Units};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
enum Kind {
    Atomic,
    Anonymous,
    Unsupported(String),
    Instance {
        definition: String,
        transform: Transform,
        layer: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct MockDefinition {
    pub name: String,
    pub members: Vec<String>,
}

/// Objects are addressed by their id string.
#[derive(Debug)]
pub struct MockHost {
    pub units: Units,
    objects: IndexMap<String, Kind>,
    pub definitions: IndexMap<String, MockDefinition>,
    pub layers: Vec<String>,
    /// `create_definition` fails for names starting with this.
    pub reject_definitions: Option<String>,
    next_handle: usize,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            units: Units::Meters,
            objects: IndexMap::new(),
            definitions: IndexMap::new(),
            layers: Vec::new(),
            reject_definitions: None,
            next_handle: 0,
        }
    }

    pub fn atomic(&mut self, id: &str) -> &mut Self {
        self.objects.insert(id.to_string(), Kind::Atomic);
        self
    }

    pub fn anonymous(&mut self, id: &str) -> &mut Self {
        self.objects.insert(id.to_string(), Kind::Anonymous);
        self
    }

    pub fn unsupported(&mut self, id: &str, type_name: &str) -> &mut Self {
        self.objects
            .insert(id.to_string(), Kind::Unsupported(type_name.to_string()));
        self
    }

    pub fn definition(&mut self, id: &str, members: &[&str]) -> &mut Self {
        self.named_definition(id, id, members)
    }

    pub fn named_definition(&mut self, id: &str, name: &str, members: &[&str]) -> &mut Self {
        self.definitions.insert(
            id.to_string(),
            MockDefinition {
                name: name.to_string(),
                members: members.iter().map(|m| m.to_string()).collect(),
            },
        );
        self
    }

    pub fn instance(&mut self, id: &str, definition: &str, transform: Transform) -> &mut Self {
        self.objects.insert(
            id.to_string(),
            Kind::Instance {
                definition: definition.to_string(),
                transform,
                layer: None,
            },
        );
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    /// Placements of `definition` as `(handle, transform, layer)`.
    pub fn placements(&self, definition: &str) -> Vec<(String, Transform, Option<String>)> {
        self.objects
            .iter()
            .filter_map(|(id, kind)| match kind {
                Kind::Instance {
                    definition: d,
                    transform,
                    layer,
                } if d == definition => Some((id.clone(), *transform, layer.clone())),
                _ => None,
            })
            .collect()
    }

    fn handle(&mut self, prefix: &str) -> String {
        self.next_handle += 1;
        format!("{prefix}{}", self.next_handle)
    }
}

impl InstanceHost for MockHost {
    type Object = String;

    fn object_id(&self, object: &String) -> Option<String> {
        match self.objects.get(object) {
            Some(Kind::Anonymous) | None => None,
            Some(_) => Some(object.clone()),
        }
    }

    fn type_name(&self, object: &String) -> String {
        match self.objects.get(object) {
            Some(Kind::Unsupported(name)) => name.clone(),
            Some(Kind::Instance { .. }) => "Instance".to_string(),
            _ => "Geometry".to_string(),
        }
    }

    fn inspect(&self, object: &String) -> Result<ObjectShape<String>> {
        match self.objects.get(object) {
            Some(Kind::Atomic) | Some(Kind::Anonymous) => Ok(ObjectShape::Atomic),
            Some(Kind::Instance {
                definition,
                transform,
                ..
            }) => {
                let found = self
                    .definitions
                    .get(definition)
                    .ok_or_else(|| InstanceError::unsupported(object, "DanglingInstance"))?;
                Ok(ObjectShape::Instance {
                    definition: DefinitionView::new(definition, found.members.clone())
                        .named(&found.name),
                    transform: *transform,
                })
            }
            Some(Kind::Unsupported(type_name)) => {
                Err(InstanceError::unsupported(object, type_name))
            }
            None => Err(InstanceError::unsupported(object, "Missing")),
        }
    }

    fn model_units(&self) -> Units {
        self.units
    }

    fn ensure_layer(&mut self, path: &[String], base_layer: &str) -> Result<String> {
        let mut full = vec![base_layer.to_string()];
        full.extend(path.iter().cloned());
        let layer = full.join("::");
        if !self.layers.contains(&layer) {
            self.layers.push(layer.clone());
        }
        Ok(layer)
    }

    fn create_definition(
        &mut self,
        name: &str,
        _description: &str,
        members: &[String],
    ) -> Result<String> {
        if let Some(prefix) = &self.reject_definitions {
            if name.starts_with(prefix.as_str()) {
                return Err(InstanceError::host_mutation(name, "rejected"));
            }
        }
        for member in members {
            if self.objects.shift_remove(member).is_none() {
                return Err(InstanceError::host_mutation(name, format!("unknown member {member}")));
            }
        }
        let handle = self.handle("def");
        self.definitions.insert(
            handle.clone(),
            MockDefinition {
                name: name.to_string(),
                members: members.to_vec(),
            },
        );
        Ok(handle)
    }

    fn place_instance(
        &mut self,
        definition: &str,
        transform: &Transform,
        layer: &str,
    ) -> Result<String> {
        if !self.definitions.contains_key(definition) {
            return Err(InstanceError::host_mutation(definition, "unknown definition"));
        }
        let handle = self.handle("inst");
        self.objects.insert(
            handle.clone(),
            Kind::Instance {
                definition: definition.to_string(),
                transform: *transform,
                layer: Some(layer.to_string()),
            },
        );
        Ok(handle)
    }

    fn definitions(&self) -> Vec<(String, String)> {
        self.definitions
            .iter()
            .map(|(id, d)| (id.clone(), d.name.clone()))
            .collect()
    }

    fn delete_definition(&mut self, definition: &str) -> Result<()> {
        self.definitions
            .shift_remove(definition)
            .ok_or_else(|| InstanceError::host_mutation(definition, "unknown definition"))?;
        self.objects.retain(|_, kind| {
            !matches!(kind, Kind::Instance { definition: d, .. } if d == definition)
        });
        Ok(())
    }
}
