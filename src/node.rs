// src/node.rs
//! Node aggregates and their variants, as read from the graph projection.
//!
//! Everything here is a read-only snapshot: the projection owns the data, this
//! crate only inspects it. Mutation happens exclusively through published
//! events (see [`crate::events`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::dimension::{DimensionSpacePoint, OriginDimensionSpacePoint};
use crate::error::{GraphMendError, Result};

macro_rules! string_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_newtype! {
    /// Identifier of a node type schema, e.g. `"acme:document.article"`.
    NodeTypeName
}

string_newtype! {
    /// Identity shared by all variants of one conceptual node.
    NodeAggregateId
}

string_newtype! {
    /// Name of a node below its parent; tethered children always carry one.
    NodeName
}

string_newtype! {
    /// Identifier of the content stream remediation events are appended to.
    ContentStreamId
}

/// How a node came to exist in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClassification {
    /// A root node; has no parent.
    Root,
    /// An ordinary, editor-created node.
    Regular,
    /// A schema-mandated auto-created child node.
    Tethered,
}

/// A stored property value together with the type tag it was persisted under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub value: serde_json::Value,
    /// The declared property type at the time of writing, e.g. `"string"`.
    pub declared_type: String,
}

impl PropertyValue {
    #[must_use]
    pub fn new(value: serde_json::Value, declared_type: impl Into<String>) -> Self {
        Self {
            value,
            declared_type: declared_type.into(),
        }
    }
}

/// One node variant: the materialization of an aggregate at one origin point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub aggregate_id: NodeAggregateId,
    pub node_type_name: NodeTypeName,
    pub name: Option<NodeName>,
    pub classification: NodeClassification,
    pub origin: OriginDimensionSpacePoint,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Node {
    #[must_use]
    pub fn is_tethered(&self) -> bool {
        self.classification == NodeClassification::Tethered
    }
}

/// The set of all variants sharing one node identity across dimension space.
///
/// Carries, per occupied origin point, the covered points: every point at which
/// this aggregate is visible, whether authored there or inherited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAggregate {
    id: NodeAggregateId,
    node_type_name: NodeTypeName,
    nodes: Vec<Node>,
    coverage_by_occupant: BTreeMap<OriginDimensionSpacePoint, Vec<DimensionSpacePoint>>,
}

impl NodeAggregate {
    #[must_use]
    pub fn new(
        id: NodeAggregateId,
        node_type_name: NodeTypeName,
        nodes: Vec<Node>,
        coverage_by_occupant: BTreeMap<OriginDimensionSpacePoint, Vec<DimensionSpacePoint>>,
    ) -> Self {
        Self {
            id,
            node_type_name,
            nodes,
            coverage_by_occupant,
        }
    }

    #[must_use]
    pub fn id(&self) -> &NodeAggregateId {
        &self.id
    }

    #[must_use]
    pub fn node_type_name(&self) -> &NodeTypeName {
        &self.node_type_name
    }

    /// The individual node variants, one per occupied origin point.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn occupied_origins(&self) -> impl Iterator<Item = &OriginDimensionSpacePoint> {
        self.coverage_by_occupant.keys()
    }

    /// Every occupied origin paired with its covered points.
    pub fn coverage(
        &self,
    ) -> impl Iterator<Item = (&OriginDimensionSpacePoint, &[DimensionSpacePoint])> {
        self.coverage_by_occupant
            .iter()
            .map(|(origin, covered)| (origin, covered.as_slice()))
    }

    /// The points covered by the variant occupying the given origin.
    ///
    /// # Errors
    /// Returns [`GraphMendError::UnoccupiedOrigin`] if the aggregate does not
    /// occupy `origin` — a projection that claims a variant without coverage
    /// data is malformed, and detectors must surface that instead of skipping.
    pub fn coverage_by_occupant(
        &self,
        origin: &OriginDimensionSpacePoint,
    ) -> Result<&[DimensionSpacePoint]> {
        self.coverage_by_occupant
            .get(origin)
            .map(Vec::as_slice)
            .ok_or_else(|| GraphMendError::UnoccupiedOrigin {
                node_aggregate_id: self.id.clone(),
                origin: origin.clone(),
            })
    }
}
