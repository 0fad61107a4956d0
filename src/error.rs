// src/error.rs
use thiserror::Error;

use crate::dimension::OriginDimensionSpacePoint;
use crate::node::NodeAggregateId;

#[derive(Debug, Error)]
pub enum GraphMendError {
    /// The graph projection handed back data this crate cannot interpret.
    /// Never swallowed: a detector that hits this must surface it, not skip the node.
    #[error("Graph projection error: {message}")]
    Projection { message: String },

    /// Coverage was queried for an origin point the aggregate does not occupy.
    #[error("Node aggregate {node_aggregate_id} does not occupy origin point {origin}")]
    UnoccupiedOrigin {
        node_aggregate_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
    },

    /// The event store refused or failed to append a remediation batch.
    #[error("Event publish failed: {message}")]
    Publish { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Generic error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GraphMendError>;

impl GraphMendError {
    /// Shorthand for projection errors built from format strings at call sites.
    pub fn projection(message: impl Into<String>) -> Self {
        GraphMendError::Projection {
            message: message.into(),
        }
    }
}
