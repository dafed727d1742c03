//! Error types for blockgraph-scene.

use crate::document::{DefinitionId, ObjectId};
use blockgraph_core::InstanceError;
use thiserror::Error;

/// Result type for document edits.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors raised by document edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// No object with this id.
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    /// No definition with this id.
    #[error("unknown definition {0}")]
    UnknownDefinition(DefinitionId),

    /// No layer with this handle.
    #[error("unknown layer {0}")]
    UnknownLayer(String),

    /// The object already belongs to a definition.
    #[error("object {0} is owned by a definition")]
    NotInScene(ObjectId),

    /// A definition needs at least one member.
    #[error("definition '{0}' has no members")]
    EmptyDefinition(String),

    /// A handle string does not name a document entity.
    #[error("malformed handle '{0}'")]
    MalformedHandle(String),
}

impl SceneError {
    /// Handle of the entity the error is about.
    pub fn subject(&self) -> String {
        match self {
            SceneError::UnknownObject(id) | SceneError::NotInScene(id) => id.to_string(),
            SceneError::UnknownDefinition(id) => id.to_string(),
            SceneError::UnknownLayer(handle) | SceneError::MalformedHandle(handle) => {
                handle.clone()
            }
            SceneError::EmptyDefinition(name) => name.clone(),
        }
    }
}

impl From<SceneError> for InstanceError {
    fn from(error: SceneError) -> Self {
        InstanceError::host_mutation(error.subject(), error.to_string())
    }
}
