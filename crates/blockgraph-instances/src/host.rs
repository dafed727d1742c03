//! Host capability interface.
//!
//! A host integration implements [`InstanceHost`] once; the unpack, bake and
//! purge engines are written against this trait only.

use blockgraph_core::{Result, Transform, Units};

/// What the engine sees when it inspects a host object.
#[derive(Debug, Clone)]
pub enum ObjectShape<O> {
    /// A leaf object converted elsewhere.
    Atomic,
    /// A placement of a block definition.
    Instance {
        /// The placed definition.
        definition: DefinitionView<O>,
        /// Placement transform, local to the containing context.
        transform: Transform,
    },
}

/// A host definition as seen through one of its placements.
#[derive(Debug, Clone)]
pub struct DefinitionView<O> {
    /// Application id of the definition.
    pub id: String,
    /// Host label, if the host has one.
    pub name: Option<String>,
    /// Member objects in host order.
    pub members: Vec<O>,
}

impl<O> DefinitionView<O> {
    /// Create a view.
    pub fn new(id: impl Into<String>, members: Vec<O>) -> Self {
        Self {
            id: id.into(),
            name: None,
            members,
        }
    }

    /// Set the host label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Native operations a host document must provide.
///
/// Handles are host ids rendered as strings. Read methods take `&self`;
/// anything that mutates the document takes `&mut self`, so a document can
/// only be baked by one operation at a time.
pub trait InstanceHost {
    /// Host object handle handed to and returned from unpacking.
    type Object: Clone;

    /// Application id of an object, if it has one.
    fn object_id(&self, object: &Self::Object) -> Option<String>;

    /// Human readable type of an object, used in reports.
    fn type_name(&self, _object: &Self::Object) -> String {
        std::any::type_name::<Self::Object>().to_string()
    }

    /// Classify an object.
    ///
    /// Objects the engine cannot handle return
    /// `InstanceError::UnsupportedObjectType`; a placement of a definition the
    /// host no longer has returns `InstanceError::MissingDefinition`.
    fn inspect(&self, object: &Self::Object) -> Result<ObjectShape<Self::Object>>;

    /// Units of the document.
    fn model_units(&self) -> Units;

    /// Find or create the layer `base_layer / path...` and return its handle.
    fn ensure_layer(&mut self, path: &[String], base_layer: &str) -> Result<String>;

    /// Create a definition from already baked objects.
    ///
    /// The members are moved out of the document into the definition.
    fn create_definition(
        &mut self,
        name: &str,
        description: &str,
        members: &[String],
    ) -> Result<String>;

    /// Place a definition on a layer and return the placement handle.
    fn place_instance(
        &mut self,
        definition: &str,
        transform: &Transform,
        layer: &str,
    ) -> Result<String>;

    /// Every definition in the document as `(handle, name)`.
    fn definitions(&self) -> Vec<(String, String)>;

    /// Delete a definition together with its members and every placement of it.
    fn delete_definition(&mut self, definition: &str) -> Result<()>;
}
