// src/adjustment/property.rs
//! Detects stored property sets diverging from the node type schema:
//! orphaned properties, type-tag mismatches, and absent declared defaults.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{per_aggregate, AdjustmentDetector, AdjustmentKind, AdjustmentStream, StructureAdjustment};
use crate::error::Result;
use crate::graph::ProjectedNodeIterator;
use crate::node::{Node, NodeAggregate, NodeTypeName};
use crate::remediation::Remediation;
use crate::schema::{load_node_type, NodeType, NodeTypeRegistry};

pub struct PropertyAdjustment {
    projected_nodes: ProjectedNodeIterator,
    registry: Arc<dyn NodeTypeRegistry>,
}

impl PropertyAdjustment {
    #[must_use]
    pub fn new(projected_nodes: ProjectedNodeIterator, registry: Arc<dyn NodeTypeRegistry>) -> Self {
        Self {
            projected_nodes,
            registry,
        }
    }

    fn scan_aggregate(&self, aggregate: &NodeAggregate) -> Vec<Result<StructureAdjustment>> {
        let Some(schema) = load_node_type(self.registry.as_ref(), aggregate.node_type_name())
        else {
            return Vec::new();
        };

        let mut findings = Vec::new();
        for node in aggregate.nodes() {
            self.scan_variant(&schema, node, &mut findings);
        }
        findings
    }

    fn scan_variant(
        &self,
        schema: &NodeType,
        node: &Node,
        findings: &mut Vec<Result<StructureAdjustment>>,
    ) {
        let stream = self.projected_nodes.graph().content_stream_id();

        for (name, stored) in &node.properties {
            match schema.properties().get(name) {
                None => {
                    let message = format!(
                        "The property \"{}\" is not declared by node type \"{}\" anymore \
                         and will be removed.",
                        name,
                        schema.name(),
                    );
                    let remediation = Remediation::RemoveProperties {
                        content_stream_id: stream.clone(),
                        node_aggregate_id: node.aggregate_id.clone(),
                        origin: node.origin.clone(),
                        names: vec![name.clone()],
                    };
                    findings.push(Ok(StructureAdjustment::for_node(
                        node,
                        AdjustmentKind::ObsoleteProperty,
                        message,
                    )
                    .with_remediation(remediation)));
                }
                Some(declaration) if declaration.property_type != stored.declared_type => {
                    let message = format!(
                        "The property \"{}\" was stored as \"{}\" but node type \"{}\" now \
                         declares \"{}\"; the stored value cannot be deserialized \
                         and will be removed.",
                        name,
                        stored.declared_type,
                        schema.name(),
                        declaration.property_type,
                    );
                    let remediation = Remediation::RemoveProperties {
                        content_stream_id: stream.clone(),
                        node_aggregate_id: node.aggregate_id.clone(),
                        origin: node.origin.clone(),
                        names: vec![name.clone()],
                    };
                    findings.push(Ok(StructureAdjustment::for_node(
                        node,
                        AdjustmentKind::NonDeserializableProperty,
                        message,
                    )
                    .with_remediation(remediation)));
                }
                Some(_) => {}
            }
        }

        let missing_defaults: BTreeMap<String, serde_json::Value> = schema
            .properties()
            .iter()
            .filter(|(name, _)| !node.properties.contains_key(*name))
            .filter_map(|(name, declaration)| {
                declaration
                    .default
                    .clone()
                    .map(|default| (name.clone(), default))
            })
            .collect();
        if missing_defaults.is_empty() {
            return;
        }

        let names: Vec<&str> = missing_defaults.keys().map(String::as_str).collect();
        let message = format!(
            "The properties [{}] are declared with defaults by node type \"{}\" but \
             missing on the node; the defaults will be set.",
            names.join(", "),
            schema.name(),
        );
        let remediation = Remediation::SetDefaultProperties {
            content_stream_id: stream,
            node_aggregate_id: node.aggregate_id.clone(),
            origin: node.origin.clone(),
            values: missing_defaults,
        };
        findings.push(Ok(StructureAdjustment::for_node(
            node,
            AdjustmentKind::MissingDefaultValue,
            message,
        )
        .with_remediation(remediation)));
    }
}

impl AdjustmentDetector for PropertyAdjustment {
    fn find_adjustments_for_node_type(
        &self,
        node_type_name: &NodeTypeName,
    ) -> AdjustmentStream<'_> {
        per_aggregate(
            self.projected_nodes.node_aggregates_of_type(node_type_name),
            move |aggregate| self.scan_aggregate(aggregate),
        )
    }
}
