// src/adjustment/disallowed_child.rs
//! Detects nodes placed below a parent whose schema forbids their type.

use std::sync::Arc;

use super::{per_aggregate, AdjustmentDetector, AdjustmentKind, AdjustmentStream, StructureAdjustment};
use crate::error::Result;
use crate::graph::ProjectedNodeIterator;
use crate::node::{Node, NodeAggregate, NodeTypeName};
use crate::remediation::Remediation;
use crate::schema::{load_node_type, NodeTypeRegistry};

pub struct DisallowedChildAdjustment {
    projected_nodes: ProjectedNodeIterator,
    registry: Arc<dyn NodeTypeRegistry>,
}

impl DisallowedChildAdjustment {
    #[must_use]
    pub fn new(projected_nodes: ProjectedNodeIterator, registry: Arc<dyn NodeTypeRegistry>) -> Self {
        Self {
            projected_nodes,
            registry,
        }
    }

    fn scan_aggregate(&self, aggregate: &NodeAggregate) -> Vec<Result<StructureAdjustment>> {
        let mut findings = Vec::new();
        for node in aggregate.nodes() {
            match self.scan_variant(aggregate, node) {
                Ok(Some(adjustment)) => findings.push(Ok(adjustment)),
                Ok(None) => {}
                Err(e) => findings.push(Err(e)),
            }
        }
        findings
    }

    fn scan_variant(
        &self,
        aggregate: &NodeAggregate,
        node: &Node,
    ) -> Result<Option<StructureAdjustment>> {
        let graph = self.projected_nodes.graph();
        // Root aggregates have no parent and nothing to violate.
        let Some(parent) = graph.parent_node(aggregate.id(), &node.origin)? else {
            return Ok(None);
        };
        // Absent parent schema is the unknown-node-type detector's finding.
        let Some(parent_schema) =
            load_node_type(self.registry.as_ref(), &parent.node_type_name)
        else {
            return Ok(None);
        };

        let allowed = if node.is_tethered() {
            // For tethered children the declaration is the permission.
            node.name
                .as_ref()
                .and_then(|name| parent_schema.tethered_child(name))
                .is_some_and(|declaration| declaration.node_type == node.node_type_name)
        } else {
            parent_schema.allows_child_of_type(&node.node_type_name)
        };
        if allowed {
            return Ok(None);
        }

        let message = format!(
            "Node aggregate {} of type \"{}\" is not allowed below its parent {} \
             of type \"{}\" in {}; it will be removed.",
            aggregate.id(),
            node.node_type_name,
            parent.aggregate_id,
            parent.node_type_name,
            node.origin.to_json(),
        );
        let remediation = Remediation::RemoveNodeAggregate {
            content_stream_id: graph.content_stream_id(),
            node_aggregate_id: aggregate.id().clone(),
            occupied_points: aggregate.occupied_origins().cloned().collect(),
            covered_points: aggregate.coverage_by_occupant(&node.origin)?.to_vec(),
        };
        Ok(Some(
            StructureAdjustment::for_node(node, AdjustmentKind::DisallowedChildNode, message)
                .with_remediation(remediation),
        ))
    }
}

impl AdjustmentDetector for DisallowedChildAdjustment {
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
