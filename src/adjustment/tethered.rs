// src/adjustment/tethered.rs
//! Detects schema-mandated ("tethered") child nodes that are missing,
//! extraneous, mistyped or out of order below their parent.

use std::sync::Arc;

use super::{per_aggregate, AdjustmentDetector, AdjustmentKind, AdjustmentStream, StructureAdjustment};
use crate::error::{GraphMendError, Result};
use crate::graph::ProjectedNodeIterator;
use crate::node::{Node, NodeAggregate, NodeAggregateId, NodeName, NodeTypeName};
use crate::remediation::Remediation;
use crate::schema::{load_node_type, NodeType, NodeTypeRegistry};

pub struct TetheredNodeAdjustments {
    projected_nodes: ProjectedNodeIterator,
    registry: Arc<dyn NodeTypeRegistry>,
}

impl TetheredNodeAdjustments {
    #[must_use]
    pub fn new(projected_nodes: ProjectedNodeIterator, registry: Arc<dyn NodeTypeRegistry>) -> Self {
        Self {
            projected_nodes,
            registry,
        }
    }

    fn scan_aggregate(&self, aggregate: &NodeAggregate) -> Vec<Result<StructureAdjustment>> {
        // Unknown schema: the unknown-node-type detector owns that finding.
        let Some(schema) = load_node_type(self.registry.as_ref(), aggregate.node_type_name())
        else {
            return Vec::new();
        };
        if schema.tethered_children().is_empty() {
            return Vec::new();
        }

        let mut findings = Vec::new();
        for node in aggregate.nodes() {
            if let Err(e) = self.scan_variant(aggregate, &schema, node, &mut findings) {
                findings.push(Err(e));
            }
        }
        findings
    }

    fn scan_variant(
        &self,
        aggregate: &NodeAggregate,
        schema: &NodeType,
        node: &Node,
        findings: &mut Vec<Result<StructureAdjustment>>,
    ) -> Result<()> {
        let graph = self.projected_nodes.graph();
        let actual = graph.tethered_child_nodes(aggregate.id(), &node.origin)?;
        let coverage = aggregate.coverage_by_occupant(&node.origin)?;

        let mut actual_names: Vec<NodeName> = Vec::with_capacity(actual.len());
        for child in &actual {
            let name = child.name.clone().ok_or_else(|| {
                GraphMendError::projection(format!(
                    "tethered node {} below {} has no node name",
                    child.aggregate_id,
                    aggregate.id()
                ))
            })?;
            actual_names.push(name);
        }

        for declaration in schema.tethered_children() {
            match actual_names.iter().position(|n| n == &declaration.name) {
                None => {
                    let message = format!(
                        "Tethered child node \"{}\" is missing below node aggregate {} in {}; \
                         it will be created with type \"{}\".",
                        declaration.name,
                        aggregate.id(),
                        node.origin.to_json(),
                        declaration.node_type,
                    );
                    let remediation = Remediation::CreateTetheredNode {
                        content_stream_id: graph.content_stream_id(),
                        node_aggregate_id: derived_child_id(aggregate.id(), &declaration.name),
                        node_type_name: declaration.node_type.clone(),
                        parent_id: aggregate.id().clone(),
                        name: declaration.name.clone(),
                        origin: node.origin.clone(),
                        coverage: coverage.to_vec(),
                    };
                    findings.push(Ok(StructureAdjustment::for_node(
                        node,
                        AdjustmentKind::TetheredNodeMissing,
                        message,
                    )
                    .with_remediation(remediation)));
                }
                Some(position) => {
                    let child = &actual[position];
                    if child.node_type_name != declaration.node_type {
                        // Retyping a populated subtree needs a manual
                        // migration; only report.
                        let message = format!(
                            "Tethered child node \"{}\" below node aggregate {} has type \"{}\", \
                             but the schema declares \"{}\". \
                             You need to write a node migration to fix this case.",
                            declaration.name,
                            aggregate.id(),
                            child.node_type_name,
                            declaration.node_type,
                        );
                        findings.push(Ok(StructureAdjustment::for_node(
                            child,
                            AdjustmentKind::TetheredNodeTypeWrong,
                            message,
                        )));
                    }
                }
            }
        }

        for child in &actual {
            let Some(name) = &child.name else { continue };
            if schema.tethered_child(name).is_none() {
                let message = format!(
                    "Tethered child node \"{}\" below node aggregate {} is not declared \
                     by node type \"{}\" and will be removed.",
                    name,
                    aggregate.id(),
                    schema.name(),
                );
                let remediation = Remediation::RemoveNodeAggregate {
                    content_stream_id: graph.content_stream_id(),
                    node_aggregate_id: child.aggregate_id.clone(),
                    occupied_points: vec![child.origin.clone()],
                    covered_points: coverage.to_vec(),
                };
                findings.push(Ok(StructureAdjustment::for_node(
                    child,
                    AdjustmentKind::DisallowedTetheredNode,
                    message,
                )
                .with_remediation(remediation)));
            }
        }

        self.check_order(aggregate, schema, node, &actual_names, findings);
        Ok(())
    }

    /// Order is only judged once the declared set is complete and free of
    /// strays; missing and extraneous children already got their own finding.
    fn check_order(
        &self,
        aggregate: &NodeAggregate,
        schema: &NodeType,
        node: &Node,
        actual_names: &[NodeName],
        findings: &mut Vec<Result<StructureAdjustment>>,
    ) {
        let declared: Vec<&NodeName> = schema
            .tethered_children()
            .iter()
            .map(|t| &t.name)
            .collect();
        if actual_names.len() != declared.len()
            || !declared.iter().all(|d| actual_names.contains(*d))
        {
            return;
        }
        if actual_names.iter().zip(&declared).all(|(a, d)| a == *d) {
            return;
        }

        let order: Vec<NodeName> = declared.into_iter().cloned().collect();
        let message = format!(
            "Tethered child nodes below node aggregate {} in {} are in the wrong order; \
             they will be reordered to [{}].",
            aggregate.id(),
            node.origin.to_json(),
            order
                .iter()
                .map(NodeName::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        );
        let remediation = Remediation::ReorderTetheredNodes {
            content_stream_id: self.projected_nodes.graph().content_stream_id(),
            parent_id: aggregate.id().clone(),
            origin: node.origin.clone(),
            order,
        };
        findings.push(Ok(StructureAdjustment::for_node(
            node,
            AdjustmentKind::TetheredNodeWronglyOrdered,
            message,
        )
        .with_remediation(remediation)));
    }
}

/// Identifier for a tethered child created by remediation. Derived from the
/// parent so that repeated detection passes propose the same identity.
fn derived_child_id(parent: &NodeAggregateId, name: &NodeName) -> NodeAggregateId {
    NodeAggregateId::new(format!("{parent}-{name}"))
}

impl AdjustmentDetector for TetheredNodeAdjustments {
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
