// src/adjustment/mod.rs
//! Structure adjustments: detected invariant violations plus their optional
//! corrective command.
//!
//! The five detectors in this module each own one invariant class:
//! - **tethered**: schema-mandated child nodes missing, extraneous, mistyped
//!   or misordered
//! - **unknown_type**: aggregates whose node type no longer resolves
//! - **disallowed_child**: parent/child pairs the parent schema forbids
//! - **property**: stored properties diverging from their declarations
//! - **dimension**: coverage flowing anywhere but origin → specialization

pub mod dimension;
pub mod disallowed_child;
pub mod property;
pub mod tethered;
pub mod unknown_type;

pub use dimension::DimensionAdjustment;
pub use disallowed_child::DisallowedChildAdjustment;
pub use property::PropertyAdjustment;
pub use tethered::TetheredNodeAdjustments;
pub use unknown_type::UnknownNodeTypeAdjustment;

use serde::Serialize;
use std::fmt;

use crate::error::Result;
use crate::node::{Node, NodeAggregate, NodeAggregateId, NodeTypeName};
use crate::remediation::Remediation;

/// The closed set of violation classes this crate detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    TetheredNodeMissing,
    DisallowedTetheredNode,
    TetheredNodeTypeWrong,
    TetheredNodeWronglyOrdered,
    NodeTypeIsUnknown,
    DisallowedChildNode,
    ObsoleteProperty,
    MissingDefaultValue,
    NonDeserializableProperty,
    NodeCoversGeneralizationOrPeers,
}

impl AdjustmentKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::TetheredNodeMissing => "TETHERED_NODE_MISSING",
            Self::DisallowedTetheredNode => "DISALLOWED_TETHERED_NODE",
            Self::TetheredNodeTypeWrong => "TETHERED_NODE_TYPE_WRONG",
            Self::TetheredNodeWronglyOrdered => "TETHERED_NODE_WRONGLY_ORDERED",
            Self::NodeTypeIsUnknown => "NODE_TYPE_IS_UNKNOWN",
            Self::DisallowedChildNode => "DISALLOWED_CHILD_NODE",
            Self::ObsoleteProperty => "OBSOLETE_PROPERTY",
            Self::MissingDefaultValue => "MISSING_DEFAULT_VALUE",
            Self::NonDeserializableProperty => "NON_DESERIALIZABLE_PROPERTY",
            Self::NodeCoversGeneralizationOrPeers => "NODE_COVERS_GENERALIZATION_OR_PEERS",
        }
    }
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One detected violation: diagnosis plus optional corrective command.
///
/// Transient by design. Rebuilt fresh on every detection pass, consumed once
/// by the service, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct StructureAdjustment {
    pub kind: AdjustmentKind,
    pub node_aggregate_id: NodeAggregateId,
    pub node_type_name: NodeTypeName,
    pub message: String,
    #[serde(skip)]
    pub remediation: Option<Remediation>,
}

impl StructureAdjustment {
    /// A report-only finding for one node variant.
    #[must_use]
    pub fn for_node(node: &Node, kind: AdjustmentKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            node_aggregate_id: node.aggregate_id.clone(),
            node_type_name: node.node_type_name.clone(),
            message: message.into(),
            remediation: None,
        }
    }

    /// A report-only finding for a whole aggregate.
    #[must_use]
    pub fn for_aggregate(
        aggregate: &NodeAggregate,
        kind: AdjustmentKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            node_aggregate_id: aggregate.id().clone(),
            node_type_name: aggregate.node_type_name().clone(),
            message: message.into(),
            remediation: None,
        }
    }

    #[must_use]
    pub fn with_remediation(mut self, remediation: Remediation) -> Self {
        self.remediation = Some(remediation);
        self
    }

    /// True if this finding carries no corrective command and can only be
    /// fixed by a manual migration.
    #[must_use]
    pub fn is_detection_only(&self) -> bool {
        self.remediation.is_none()
    }
}

/// A lazy stream of findings; graph errors surface as `Err` items.
pub type AdjustmentStream<'a> = Box<dyn Iterator<Item = Result<StructureAdjustment>> + 'a>;

/// The one capability every detector implements.
///
/// The detector set is closed and known at build time; the service holds the
/// five instances in a fixed order rather than a dynamic registry.
pub trait AdjustmentDetector {
    fn find_adjustments_for_node_type(&self, node_type_name: &NodeTypeName)
        -> AdjustmentStream<'_>;
}

/// Flattens per-aggregate findings over a lazy aggregate stream.
///
/// Keeps traversal lazy across aggregates (the unbounded axis) while letting
/// detectors stay simple eager functions within one aggregate. An `Err`
/// aggregate becomes a single `Err` finding; nothing is skipped.
pub(crate) fn per_aggregate<'a, F>(
    aggregates: crate::graph::AggregateStream<'a>,
    mut scan: F,
) -> AdjustmentStream<'a>
where
    F: FnMut(&NodeAggregate) -> Vec<Result<StructureAdjustment>> + 'a,
{
    Box::new(aggregates.flat_map(move |aggregate| match aggregate {
        Ok(aggregate) => scan(&aggregate),
        Err(e) => vec![Err(e)],
    }))
}
