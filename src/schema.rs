// src/schema.rs
//! Node type schemas and the registry lookup used by every detector.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::node::{NodeName, NodeTypeName};

/// A declared property: its type plus the default to apply when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub property_type: String,
    pub default: Option<serde_json::Value>,
}

impl PropertyDeclaration {
    #[must_use]
    pub fn new(property_type: impl Into<String>, default: Option<serde_json::Value>) -> Self {
        Self {
            property_type: property_type.into(),
            default,
        }
    }
}

/// A schema-mandated auto-created child node. Declaration order is the order
/// the children must appear in below their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TetheredDeclaration {
    pub name: NodeName,
    pub node_type: NodeTypeName,
}

/// A resolved node type schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    name: NodeTypeName,
    properties: BTreeMap<String, PropertyDeclaration>,
    tethered_children: Vec<TetheredDeclaration>,
    /// `None` means any child type is allowed; `Some` is a closed allow-list.
    allowed_child_types: Option<BTreeSet<NodeTypeName>>,
}

impl NodeType {
    #[must_use]
    pub fn new(name: NodeTypeName) -> Self {
        Self {
            name,
            properties: BTreeMap::new(),
            tethered_children: Vec::new(),
            allowed_child_types: None,
        }
    }

    #[must_use]
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        declaration: PropertyDeclaration,
    ) -> Self {
        self.properties.insert(name.into(), declaration);
        self
    }

    #[must_use]
    pub fn with_tethered_child(mut self, name: NodeName, node_type: NodeTypeName) -> Self {
        self.tethered_children.push(TetheredDeclaration { name, node_type });
        self
    }

    #[must_use]
    pub fn with_allowed_child_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = NodeTypeName>,
    {
        self.allowed_child_types = Some(types.into_iter().collect());
        self
    }

    /// The schema's self-reported name. May differ from the name it was
    /// requested under when the registry substituted a fallback.
    #[must_use]
    pub fn name(&self) -> &NodeTypeName {
        &self.name
    }

    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, PropertyDeclaration> {
        &self.properties
    }

    /// Tethered child declarations in their mandated sibling order.
    #[must_use]
    pub fn tethered_children(&self) -> &[TetheredDeclaration] {
        &self.tethered_children
    }

    #[must_use]
    pub fn tethered_child(&self, name: &NodeName) -> Option<&TetheredDeclaration> {
        self.tethered_children.iter().find(|t| &t.name == name)
    }

    /// Whether a freely-placed child of the given type is permitted.
    /// Tethered children are exempt: their declaration is the permission.
    #[must_use]
    pub fn allows_child_of_type(&self, node_type: &NodeTypeName) -> bool {
        match &self.allowed_child_types {
            None => true,
            Some(allowed) => allowed.contains(node_type),
        }
    }
}

/// External collaborator: the node type registry.
///
/// `node_type` may substitute a configured fallback schema for unknown names
/// instead of reporting a miss; [`load_node_type`] unmasks that case.
pub trait NodeTypeRegistry: Send + Sync {
    fn node_type(&self, name: &NodeTypeName) -> Option<NodeType>;
}

/// Loads a node type, treating a fallback substitution as absence.
///
/// Absence is a normal outcome, not an error: both a registry miss and a
/// returned schema whose self-reported name differs from the requested one
/// yield `None`. The unknown-node-type detector turns `None` into a finding.
#[must_use]
pub fn load_node_type(
    registry: &dyn NodeTypeRegistry,
    name: &NodeTypeName,
) -> Option<NodeType> {
    let node_type = registry.node_type(name)?;
    if node_type.name() != name {
        // The registry silently answered with its fallback type.
        return None;
    }
    Some(node_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_any_child_without_constraint() {
        let schema = NodeType::new(NodeTypeName::new("acme:page"));
        assert!(schema.allows_child_of_type(&NodeTypeName::new("acme:anything")));
    }

    #[test]
    fn closed_allow_list_rejects_unlisted_types() {
        let schema = NodeType::new(NodeTypeName::new("acme:page"))
            .with_allowed_child_types([NodeTypeName::new("acme:text")]);
        assert!(schema.allows_child_of_type(&NodeTypeName::new("acme:text")));
        assert!(!schema.allows_child_of_type(&NodeTypeName::new("acme:image")));
    }

    #[test]
    fn tethered_children_keep_declaration_order() {
        let schema = NodeType::new(NodeTypeName::new("acme:page"))
            .with_tethered_child(NodeName::new("main"), NodeTypeName::new("acme:content"))
            .with_tethered_child(NodeName::new("footer"), NodeTypeName::new("acme:content"));
        let names: Vec<_> = schema
            .tethered_children()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, ["main", "footer"]);
    }
}
