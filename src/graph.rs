// src/graph.rs
//! Read-side collaborator traits and the projected node iterator.

use std::sync::Arc;

use crate::dimension::OriginDimensionSpacePoint;
use crate::error::Result;
use crate::node::{ContentStreamId, Node, NodeAggregate, NodeAggregateId, NodeTypeName};

/// A lazy, restartable stream of node aggregates read from the projection.
/// Graph errors surface as `Err` items mid-stream rather than aborting the
/// whole traversal up front.
pub type AggregateStream<'a> = Box<dyn Iterator<Item = Result<NodeAggregate>> + 'a>;

/// External collaborator: the content graph projection of the live workspace.
///
/// Pure read access. Implementations back this with whatever storage the
/// projection uses; paged or streaming sources are fine as long as each call
/// restarts the traversal.
pub trait ContentGraph: Send + Sync {
    /// The content stream remediation events for this graph are appended to.
    fn content_stream_id(&self) -> ContentStreamId;

    /// Every node type name currently in use by at least one aggregate.
    fn used_node_type_names(&self) -> Result<Vec<NodeTypeName>>;

    /// All aggregates whose type matches, in stable traversal order.
    fn node_aggregates_of_type(&self, name: &NodeTypeName) -> AggregateStream<'_>;

    /// The parent variant of the given aggregate at the given origin point,
    /// or `None` for root aggregates.
    fn parent_node(
        &self,
        id: &NodeAggregateId,
        origin: &OriginDimensionSpacePoint,
    ) -> Result<Option<Node>>;

    /// The tethered child variants below the given parent variant, in their
    /// actual sibling order.
    fn tethered_child_nodes(
        &self,
        parent: &NodeAggregateId,
        origin: &OriginDimensionSpacePoint,
    ) -> Result<Vec<Node>>;
}

/// External collaborator: the read-side projection cache.
///
/// Injected explicitly into the orchestrator; there is no ambient global
/// cache reference anywhere in this crate.
pub trait ReadCache: Send + Sync {
    /// Invalidates all cached read projections. Must be called before any
    /// remediation events become visible.
    fn disable_cache(&self);
}

/// Hands detectors a restartable view of all aggregates of one type.
///
/// Thin adapter over [`ContentGraph`]; exists so detectors share one entry
/// point for traversal and never talk to the projection's storage directly.
#[derive(Clone)]
pub struct ProjectedNodeIterator {
    graph: Arc<dyn ContentGraph>,
}

impl ProjectedNodeIterator {
    #[must_use]
    pub fn new(graph: Arc<dyn ContentGraph>) -> Self {
        Self { graph }
    }

    /// Restartable lazy traversal of all aggregates of the given type.
    pub fn node_aggregates_of_type(&self, name: &NodeTypeName) -> AggregateStream<'_> {
        self.graph.node_aggregates_of_type(name)
    }

    #[must_use]
    pub fn graph(&self) -> &Arc<dyn ContentGraph> {
        &self.graph
    }
}
