// src/events.rs
//! Domain events emitted by remediations, and the publisher seam.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dimension::{DimensionSpacePoint, OriginDimensionSpacePoint};
use crate::error::Result;
use crate::node::{ContentStreamId, NodeAggregateId, NodeName, NodeTypeName};

/// A corrective domain event. Each remediation computes the minimal batch of
/// these needed to restore the violated invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructureEvent {
    NodeAggregateWasRemoved {
        node_aggregate_id: NodeAggregateId,
        affected_occupied_points: Vec<OriginDimensionSpacePoint>,
        affected_covered_points: Vec<DimensionSpacePoint>,
    },
    TetheredNodeWasCreated {
        node_aggregate_id: NodeAggregateId,
        node_type_name: NodeTypeName,
        parent_id: NodeAggregateId,
        name: NodeName,
        origin: OriginDimensionSpacePoint,
        coverage: Vec<DimensionSpacePoint>,
    },
    TetheredNodesWereReordered {
        parent_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
        /// The full mandated sibling order after the move.
        order: Vec<NodeName>,
    },
    NodePropertiesWereSet {
        node_aggregate_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
        values: BTreeMap<String, serde_json::Value>,
    },
    NodePropertiesWereRemoved {
        node_aggregate_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
        names: Vec<String>,
    },
}

/// An ordered batch of corrective events bound for one content stream.
///
/// Owned by the remediation that built it until handed to the publisher,
/// which takes ownership and blocks until the append is durable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsToPublish {
    pub content_stream_id: ContentStreamId,
    pub events: Vec<StructureEvent>,
}

impl EventsToPublish {
    #[must_use]
    pub fn new(content_stream_id: ContentStreamId, events: Vec<StructureEvent>) -> Self {
        Self {
            content_stream_id,
            events,
        }
    }

    #[must_use]
    pub fn single(content_stream_id: ContentStreamId, event: StructureEvent) -> Self {
        Self::new(content_stream_id, vec![event])
    }
}

/// External collaborator: the event store's append/publish seam.
pub trait EventPublisher: Send + Sync {
    /// Publishes the batch, blocking until it is durably appended or fails.
    /// There is deliberately no fire-and-forget variant; callers depend on
    /// the graph being consistent when this returns.
    ///
    /// # Errors
    /// Propagates append failures unchanged; no retry happens here.
    fn publish_events(&self, batch: EventsToPublish) -> Result<()>;
}
