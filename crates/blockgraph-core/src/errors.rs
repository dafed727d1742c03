//! Error types for the instance engine.

use thiserror::Error;

/// Result type for blockgraph operations.
pub type Result<T> = std::result::Result<T, InstanceError>;

/// Errors raised while unpacking, baking or flattening instance graphs.
///
/// Most variants describe a single object and end up in a
/// [`ConversionReport`](crate::ConversionReport) rather than aborting the
/// operation. Only [`InstanceError::Cancelled`] and
/// [`InstanceError::InvalidInput`] are returned as hard failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstanceError {
    /// The host handed us an object the engine does not understand.
    #[error("unsupported object type '{type_name}' for object {id}")]
    UnsupportedObjectType { id: String, type_name: String },

    /// An object without an application id cannot be indexed.
    #[error("object of type '{type_name}' has no application id")]
    MissingApplicationId { type_name: String },

    /// A definition transitively contains a placement of itself.
    #[error("cyclic definition reference: {}", .cycle.join(" -> "))]
    CyclicDefinitionReference { cycle: Vec<String> },

    /// An instance references a definition that is not part of the graph.
    #[error("instance {instance_id} references unknown definition {definition_id}")]
    MissingDefinition {
        instance_id: String,
        definition_id: String,
    },

    /// Two definitions share the same application id.
    #[error("duplicate definition {definition_id}")]
    DuplicateDefinition { definition_id: String },

    /// Two placements share the same application id.
    #[error("duplicate instance {instance_id}")]
    DuplicateInstance { instance_id: String },

    /// A component could not be realized because something it depends on failed.
    #[error("{id} depends on {dependency}, which was not realized")]
    UnresolvedDependency { id: String, dependency: String },

    /// The host failed to create or modify a native object.
    #[error("host failed to realize {id}: {reason}")]
    HostMutationFailure { id: String, reason: String },

    /// A placement is nested deeper than the configured limit.
    #[error("instance {id} is nested {depth} levels deep (limit {limit})")]
    NestingTooDeep { id: String, depth: u32, limit: u32 },

    /// The operation was cancelled by the user.
    #[error("operation cancelled after {completed} items")]
    Cancelled { completed: usize },

    /// The operation input is unusable as a whole.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl InstanceError {
    /// Create a host mutation failure.
    pub fn host_mutation(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HostMutationFailure {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported object error.
    pub fn unsupported(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedObjectType {
            id: id.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a missing definition error.
    pub fn missing_definition(
        instance_id: impl Into<String>,
        definition_id: impl Into<String>,
    ) -> Self {
        Self::MissingDefinition {
            instance_id: instance_id.into(),
            definition_id: definition_id.into(),
        }
    }

    /// Whether this error invalidates the whole operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message() {
        let err = InstanceError::CyclicDefinitionReference {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "cyclic definition reference: A -> B -> A");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(InstanceError::Cancelled { completed: 3 }.is_fatal());
        assert!(InstanceError::InvalidInput("no root".into()).is_fatal());
        assert!(!InstanceError::host_mutation("x", "boom").is_fatal());
        assert!(!InstanceError::missing_definition("i", "d").is_fatal());
    }
}
