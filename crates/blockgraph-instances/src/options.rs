//! Operation options.

use blockgraph_core::{InstanceError, Result, Units};
use serde::{Deserialize, Serialize};

/// Default bound on placement nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: u32 = 64;

/// Options for unpacking a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnpackOptions {
    /// Placements nested deeper than this are skipped and reported.
    pub max_nesting_depth: u32,
    /// Units stamped on placements instead of the document units.
    pub units: Option<Units>,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            units: None,
        }
    }
}

impl UnpackOptions {
    /// Create default unpack options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting bound.
    pub fn with_max_nesting_depth(mut self, depth: u32) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Override the units stamped on placements.
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| InstanceError::InvalidInput(format!("unpack options: {e}")))
    }
}

/// Options for baking a received graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BakeOptions {
    /// Description written on every created definition.
    pub definition_description: String,
    /// Scale placement translations into the document units.
    pub convert_units: bool,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self {
            definition_description: String::new(),
            convert_units: true,
        }
    }
}

impl BakeOptions {
    /// Create default bake options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the definition description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.definition_description = description.into();
        self
    }

    /// Keep translations in the units they were received in.
    pub fn without_unit_conversion(mut self) -> Self {
        self.convert_units = false;
        self
    }

    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| InstanceError::InvalidInput(format!("bake options: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = UnpackOptions::from_json(r#"{ "units": "ft" }"#).unwrap();
        assert_eq!(options.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
        assert_eq!(options.units, Some(Units::Feet));

        let bake = BakeOptions::from_json(r#"{ "definitionDescription": "received" }"#).unwrap();
        assert!(bake.convert_units);
        assert_eq!(bake.definition_description, "received");
    }

    #[test]
    fn test_bad_json_is_invalid_input() {
        assert!(matches!(
            UnpackOptions::from_json("{ nope"),
            Err(InstanceError::InvalidInput(_))
        ));
    }
}
