// src/adjustment/unknown_type.rs
//! Detects aggregates whose node type no longer resolves to a schema.

use std::sync::Arc;

use super::{per_aggregate, AdjustmentDetector, AdjustmentKind, AdjustmentStream, StructureAdjustment};
use crate::error::Result;
use crate::graph::ProjectedNodeIterator;
use crate::node::{NodeAggregate, NodeTypeName};
use crate::remediation::Remediation;
use crate::schema::{load_node_type, NodeTypeRegistry};

pub struct UnknownNodeTypeAdjustment {
    projected_nodes: ProjectedNodeIterator,
    registry: Arc<dyn NodeTypeRegistry>,
}

impl UnknownNodeTypeAdjustment {
    #[must_use]
    pub fn new(projected_nodes: ProjectedNodeIterator, registry: Arc<dyn NodeTypeRegistry>) -> Self {
        Self {
            projected_nodes,
            registry,
        }
    }

    fn scan_aggregate(&self, aggregate: &NodeAggregate) -> Vec<Result<StructureAdjustment>> {
        // A registry miss and a fallback substitution are the same condition:
        // the persisted type name has no schema of its own anymore.
        if load_node_type(self.registry.as_ref(), aggregate.node_type_name()).is_some() {
            return Vec::new();
        }

        let message = format!(
            "The node type \"{}\" is not found; so the node should be removed (or converted).",
            aggregate.node_type_name()
        );
        let graph = self.projected_nodes.graph();
        let remediation = Remediation::RemoveNodeAggregate {
            content_stream_id: graph.content_stream_id(),
            node_aggregate_id: aggregate.id().clone(),
            occupied_points: aggregate.occupied_origins().cloned().collect(),
            covered_points: aggregate
                .coverage()
                .flat_map(|(_, covered)| covered)
                .cloned()
                .collect(),
        };

        vec![Ok(StructureAdjustment::for_aggregate(
            aggregate,
            AdjustmentKind::NodeTypeIsUnknown,
            message,
        )
        .with_remediation(remediation))]
    }
}

impl AdjustmentDetector for UnknownNodeTypeAdjustment {
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
