//! Instance and definition proxies: the portable wire records.

use crate::transform::Transform;
use crate::units::Units;
use serde::{Deserialize, Serialize};

/// One placement of a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceProxy {
    /// Unique id of the placement.
    pub application_id: String,
    /// Application id of the placed definition.
    pub definition_id: String,
    /// Transform local to the placement's containing context.
    pub transform: Transform,
    /// Greatest nesting depth at which this placement has been observed.
    pub max_depth: u32,
    /// Units of the transform translation.
    pub units: Units,
}

impl InstanceProxy {
    /// Create a placement at depth 1.
    pub fn new(
        application_id: impl Into<String>,
        definition_id: impl Into<String>,
        transform: Transform,
        units: Units,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            definition_id: definition_id.into(),
            transform,
            max_depth: 1,
            units,
        }
    }

    /// Set the recorded depth.
    pub fn at_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A reusable definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDefinitionProxy {
    /// Unique id of the definition.
    pub application_id: String,
    /// Member ids in order: atomic objects and nested placements.
    pub objects: Vec<String>,
    /// Greatest nesting depth at which any placement of this definition was seen.
    pub max_depth: u32,
    /// Human readable label from the host, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl InstanceDefinitionProxy {
    /// Create an empty definition at depth 1.
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            objects: Vec::new(),
            max_depth: 1,
            name: None,
        }
    }

    /// Set the member ids.
    pub fn with_objects<I, S>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objects = objects.into_iter().map(Into::into).collect();
        self
    }

    /// Set the label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the recorded depth.
    pub fn at_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Append a member id, keeping the set property of `objects`.
    pub fn add_object(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.objects.contains(&id) {
            return false;
        }
        self.objects.push(id);
        true
    }

    /// Whether `id` is a member of this definition.
    pub fn contains(&self, id: &str) -> bool {
        self.objects.iter().any(|o| o == id)
    }

    /// Label used when naming the realized host definition.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.application_id)
    }
}

/// Either half of a received instance graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InstanceComponent {
    /// A definition record.
    Definition(InstanceDefinitionProxy),
    /// A placement record.
    Instance(InstanceProxy),
}

impl InstanceComponent {
    /// Application id of the wrapped record.
    pub fn application_id(&self) -> &str {
        match self {
            InstanceComponent::Definition(d) => &d.application_id,
            InstanceComponent::Instance(i) => &i.application_id,
        }
    }

    /// Recorded depth of the wrapped record.
    pub fn max_depth(&self) -> u32 {
        match self {
            InstanceComponent::Definition(d) => d.max_depth,
            InstanceComponent::Instance(i) => i.max_depth,
        }
    }

    /// Whether this is a definition record.
    pub fn is_definition(&self) -> bool {
        matches!(self, InstanceComponent::Definition(_))
    }
}

impl From<InstanceProxy> for InstanceComponent {
    fn from(proxy: InstanceProxy) -> Self {
        InstanceComponent::Instance(proxy)
    }
}

impl From<InstanceDefinitionProxy> for InstanceComponent {
    fn from(proxy: InstanceDefinitionProxy) -> Self {
        InstanceComponent::Definition(proxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use serde_json::json;

    #[test]
    fn test_instance_wire_shape() {
        let proxy = InstanceProxy::new(
            "inst-1",
            "def-1",
            Transform::from_translation(DVec3::new(5.0, 0.0, 0.0)),
            Units::Millimeters,
        )
        .at_depth(2);

        let value = serde_json::to_value(&proxy).unwrap();
        assert_eq!(value["applicationId"], "inst-1");
        assert_eq!(value["definitionId"], "def-1");
        assert_eq!(value["maxDepth"], 2);
        assert_eq!(value["units"], "mm");
        assert_eq!(value["transform"].as_array().unwrap().len(), 16);
        assert_eq!(value["transform"][3], 5.0);

        let back: InstanceProxy = serde_json::from_value(value).unwrap();
        assert_eq!(back, proxy);
    }

    #[test]
    fn test_definition_wire_shape_omits_missing_name() {
        let def = InstanceDefinitionProxy::new("def-1").with_objects(["a", "b"]);
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(
            value,
            json!({ "applicationId": "def-1", "objects": ["a", "b"], "maxDepth": 1 })
        );
    }

    #[test]
    fn test_definition_accepts_remote_record_without_name() {
        let def: InstanceDefinitionProxy = serde_json::from_value(json!({
            "applicationId": "d",
            "objects": ["x"],
            "maxDepth": 3
        }))
        .unwrap();
        assert_eq!(def.max_depth, 3);
        assert_eq!(def.label(), "d");
    }

    #[test]
    fn test_add_object_is_a_set() {
        let mut def = InstanceDefinitionProxy::new("d");
        assert!(def.add_object("a"));
        assert!(!def.add_object("a"));
        assert_eq!(def.objects, vec!["a"]);
    }
}
