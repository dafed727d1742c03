//! Removing definitions left behind by an earlier receive.

use crate::host::InstanceHost;
use crate::naming::DefinitionName;
use blockgraph_core::{InstanceError, Result};
use tracing::{debug, warn};

/// Delete every definition baked under `base_layer`, with its placements.
///
/// Only names that follow the baked naming convention and end in
/// `base_layer` are touched. Returns the handles of the deleted definitions;
/// definitions the host fails to delete are logged and left in place.
pub fn purge_instances<H: InstanceHost>(host: &mut H, base_layer: &str) -> Result<Vec<String>> {
    if base_layer.is_empty() {
        return Err(InstanceError::InvalidInput(
            "purge needs a base layer name".to_string(),
        ));
    }

    let stale: Vec<String> = host
        .definitions()
        .into_iter()
        .filter(|(_, name)| DefinitionName::parse_for_layer(name, base_layer).is_some())
        .map(|(handle, _)| handle)
        .collect();

    let mut purged = Vec::with_capacity(stale.len());
    for handle in stale {
        match host.delete_definition(&handle) {
            Ok(()) => purged.push(handle),
            Err(error) => warn!(definition = %handle, %error, "could not purge definition"),
        }
    }

    debug!(base_layer, purged = purged.len(), "purged baked definitions");
    Ok(purged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockHost;
    use blockgraph_core::Transform;

    #[test]
    fn test_user_definitions_survive() {
        let mut host = MockHost::new();
        host.atomic("x");
        host.named_definition("d1", "Chair-(abc)-Received", &["x"])
            .named_definition("d2", "Chair", &["x"])
            .named_definition("d3", "Table-(def)-Other", &["x"])
            .named_definition("d4", "Received", &["x"]);
        host.instance("i1", "d1", Transform::IDENTITY)
            .instance("i2", "d2", Transform::IDENTITY);

        let purged = purge_instances(&mut host, "Received").unwrap();

        assert_eq!(purged, vec!["d1"]);
        assert!(!host.contains("i1"));
        assert!(host.contains("i2"));
        let left: Vec<&String> = host.definitions.keys().collect();
        assert_eq!(left, vec!["d2", "d3", "d4"]);
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let mut host = MockHost::new();
        host.named_definition("d1", "Chair-(abc)-", &[]);
        assert!(purge_instances(&mut host, "").is_err());
        assert_eq!(host.definitions.len(), 1);
    }
}
