//! Names of definitions created by a bake.
//!
//! A baked definition is named `{label}-({applicationId})-{baseLayer}`. The
//! base layer segment ties the definition to the receive that created it, so
//! a later purge can remove exactly those definitions and nothing the user
//! authored.

use std::fmt;

/// Parsed name of a baked definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionName {
    /// Label of the received definition.
    pub label: String,
    /// Application id of the received definition.
    pub application_id: String,
    /// Base layer of the receive.
    pub base_layer: String,
}

impl DefinitionName {
    /// Create a name.
    pub fn new(
        label: impl Into<String>,
        application_id: impl Into<String>,
        base_layer: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            application_id: application_id.into(),
            base_layer: base_layer.into(),
        }
    }

    /// Parse a name, splitting at the last `)-` and the last `-(` before it.
    pub fn parse(name: &str) -> Option<Self> {
        let split = name.rfind(")-")?;
        let (head, base_layer) = (&name[..split], &name[split + 2..]);
        Self::split_head(head, base_layer)
    }

    /// Parse a name that must end in `base_layer`.
    ///
    /// Unlike [`DefinitionName::parse`] this accepts base layers that
    /// themselves contain `)-`.
    pub fn parse_for_layer(name: &str, base_layer: &str) -> Option<Self> {
        let head = name.strip_suffix(base_layer)?.strip_suffix(")-")?;
        Self::split_head(head, base_layer)
    }

    fn split_head(head: &str, base_layer: &str) -> Option<Self> {
        let split = head.rfind("-(")?;
        let (label, application_id) = (&head[..split], &head[split + 2..]);
        if application_id.is_empty() || base_layer.is_empty() {
            return None;
        }
        Some(Self::new(label, application_id, base_layer))
    }
}

impl fmt::Display for DefinitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-({})-{}",
            self.label, self.application_id, self.base_layer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let name = DefinitionName::new("Chair", "d-1", "Received");
        assert_eq!(name.to_string(), "Chair-(d-1)-Received");
        assert_eq!(DefinitionName::parse("Chair-(d-1)-Received"), Some(name));
    }

    #[test]
    fn test_label_with_separators() {
        let parsed = DefinitionName::parse("Door-(left)-(abc)-Model").unwrap();
        assert_eq!(parsed.label, "Door-(left)");
        assert_eq!(parsed.application_id, "abc");
        assert_eq!(parsed.base_layer, "Model");
    }

    #[test]
    fn test_user_names_do_not_parse() {
        assert_eq!(DefinitionName::parse("Chair"), None);
        assert_eq!(DefinitionName::parse("Chair-Received"), None);
        assert_eq!(DefinitionName::parse("Chair-()-Received"), None);
        assert_eq!(DefinitionName::parse("Chair-(x)-"), None);
    }

    #[test]
    fn test_parse_for_layer() {
        let name = "Chair-(d1)-Project )-A";
        assert_eq!(
            DefinitionName::parse_for_layer(name, "Project )-A").map(|n| n.application_id),
            Some("d1".to_string())
        );
        assert_eq!(DefinitionName::parse_for_layer(name, "Other"), None);
    }
}
