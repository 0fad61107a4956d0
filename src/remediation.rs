// src/remediation.rs
//! Deferred corrective commands.
//!
//! A remediation is detection-time context frozen into a command value. It
//! computes its event batch on demand via [`Remediation::execute`], keeping
//! [`crate::adjustment::StructureAdjustment`] a plain data record up to this
//! one callable field.

use std::collections::BTreeMap;

use crate::dimension::{DimensionSpacePoint, OriginDimensionSpacePoint};
use crate::error::Result;
use crate::events::{EventsToPublish, StructureEvent};
use crate::node::{ContentStreamId, NodeAggregateId, NodeName, NodeTypeName};

/// A corrective command holding everything needed to compute its event batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Remediation {
    /// Remove a whole aggregate (unknown type, disallowed child or extraneous
    /// tethered node).
    RemoveNodeAggregate {
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        occupied_points: Vec<OriginDimensionSpacePoint>,
        covered_points: Vec<DimensionSpacePoint>,
    },
    /// Create a schema-mandated child that is missing below its parent.
    CreateTetheredNode {
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        node_type_name: NodeTypeName,
        parent_id: NodeAggregateId,
        name: NodeName,
        origin: OriginDimensionSpacePoint,
        coverage: Vec<DimensionSpacePoint>,
    },
    /// Restore the mandated sibling order of a parent's tethered children.
    ReorderTetheredNodes {
        content_stream_id: ContentStreamId,
        parent_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
        order: Vec<NodeName>,
    },
    /// Write declared defaults for properties missing on a variant.
    SetDefaultProperties {
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
        values: BTreeMap<String, serde_json::Value>,
    },
    /// Drop stored properties the schema no longer declares (or declares
    /// under a different type).
    RemoveProperties {
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
        names: Vec<String>,
    },
}

impl Remediation {
    /// Computes the minimal corrective event batch for this command.
    ///
    /// # Errors
    /// Currently infallible in practice; the `Result` keeps the seam open for
    /// commands that must consult collaborators to build their batch.
    pub fn execute(&self) -> Result<EventsToPublish> {
        let batch = match self {
            Self::RemoveNodeAggregate {
                content_stream_id,
                node_aggregate_id,
                occupied_points,
                covered_points,
            } => EventsToPublish::single(
                content_stream_id.clone(),
                StructureEvent::NodeAggregateWasRemoved {
                    node_aggregate_id: node_aggregate_id.clone(),
                    affected_occupied_points: occupied_points.clone(),
                    affected_covered_points: covered_points.clone(),
                },
            ),
            Self::CreateTetheredNode {
                content_stream_id,
                node_aggregate_id,
                node_type_name,
                parent_id,
                name,
                origin,
                coverage,
            } => EventsToPublish::single(
                content_stream_id.clone(),
                StructureEvent::TetheredNodeWasCreated {
                    node_aggregate_id: node_aggregate_id.clone(),
                    node_type_name: node_type_name.clone(),
                    parent_id: parent_id.clone(),
                    name: name.clone(),
                    origin: origin.clone(),
                    coverage: coverage.clone(),
                },
            ),
            Self::ReorderTetheredNodes {
                content_stream_id,
                parent_id,
                origin,
                order,
            } => EventsToPublish::single(
                content_stream_id.clone(),
                StructureEvent::TetheredNodesWereReordered {
                    parent_id: parent_id.clone(),
                    origin: origin.clone(),
                    order: order.clone(),
                },
            ),
            Self::SetDefaultProperties {
                content_stream_id,
                node_aggregate_id,
                origin,
                values,
            } => EventsToPublish::single(
                content_stream_id.clone(),
                StructureEvent::NodePropertiesWereSet {
                    node_aggregate_id: node_aggregate_id.clone(),
                    origin: origin.clone(),
                    values: values.clone(),
                },
            ),
            Self::RemoveProperties {
                content_stream_id,
                node_aggregate_id,
                origin,
                names,
            } => EventsToPublish::single(
                content_stream_id.clone(),
                StructureEvent::NodePropertiesWereRemoved {
                    node_aggregate_id: node_aggregate_id.clone(),
                    origin: origin.clone(),
                    names: names.clone(),
                },
            ),
        };
        Ok(batch)
    }

    /// Short label used by the journal and the console report.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::RemoveNodeAggregate { .. } => "remove node aggregate",
            Self::CreateTetheredNode { .. } => "create tethered node",
            Self::ReorderTetheredNodes { .. } => "reorder tethered nodes",
            Self::SetDefaultProperties { .. } => "set default properties",
            Self::RemoveProperties { .. } => "remove properties",
        }
    }
}
