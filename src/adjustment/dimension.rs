// src/adjustment/dimension.rs
//! Detects coverage edges that do not specialize their origin.
//!
//! The invariant: for every covered point C of a node variant with origin O,
//! either C == O or C is a specialization of O. Coverage may only flow from a
//! more general point to a more specific one, never sideways or backwards.

use std::sync::Arc;

use super::{per_aggregate, AdjustmentDetector, AdjustmentKind, AdjustmentStream, StructureAdjustment};
use crate::dimension::{VariantType, VariationGraph};
use crate::error::Result;
use crate::graph::ProjectedNodeIterator;
use crate::node::{NodeAggregate, NodeTypeName};

pub struct DimensionAdjustment {
    projected_nodes: ProjectedNodeIterator,
    variation_graph: Arc<dyn VariationGraph>,
}

impl DimensionAdjustment {
    #[must_use]
    pub fn new(
        projected_nodes: ProjectedNodeIterator,
        variation_graph: Arc<dyn VariationGraph>,
    ) -> Self {
        Self {
            projected_nodes,
            variation_graph,
        }
    }

    fn scan_aggregate(&self, aggregate: &NodeAggregate) -> Vec<Result<StructureAdjustment>> {
        let mut findings = Vec::new();
        for node in aggregate.nodes() {
            let covered = match aggregate.coverage_by_occupant(&node.origin) {
                Ok(covered) => covered,
                Err(e) => {
                    findings.push(Err(e));
                    continue;
                }
            };
            for covered_point in covered {
                let variant_type = self
                    .variation_graph
                    .variant_type(covered_point, node.origin.as_dimension_space_point());
                if !node.origin.equals_point(covered_point)
                    && variant_type != VariantType::Specialization
                {
                    let message = format!(
                        "The node has an origin dimension space point of {}, \
                         and a covered dimension space point (i.e. an incoming edge) in {}. \
                         The incoming edge is a {} of the origin dimension space point, \
                         which is a violated invariant: coverage must only specialize. \
                         You need to write a node migration to fix this case.",
                        node.origin.to_json(),
                        covered_point.to_json(),
                        variant_type.label().to_uppercase(),
                    );
                    // Report-only: a safe automatic fix for arbitrary dimension
                    // misconfiguration is not decidable from local data alone.
                    findings.push(Ok(StructureAdjustment::for_node(
                        node,
                        AdjustmentKind::NodeCoversGeneralizationOrPeers,
                        message,
                    )));
                }
            }
        }
        findings
    }
}

impl AdjustmentDetector for DimensionAdjustment {
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
