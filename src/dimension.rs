// src/dimension.rs
//! Dimension space coordinates and the variation relation between them.
//!
//! A content node exists at a point of a multi-dimensional "dimension space"
//! (language, market, audience, ...). Visibility of a node at other points is
//! governed by the variation graph, an external collaborator that knows how any
//! two points relate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A coordinate in dimension space, e.g. `{language: "en", market: "eu"}`.
///
/// Coordinates are kept in a `BTreeMap` so that equality, hashing and the JSON
/// rendering are independent of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionSpacePoint {
    coordinates: BTreeMap<String, String>,
}

impl DimensionSpacePoint {
    #[must_use]
    pub fn new(coordinates: BTreeMap<String, String>) -> Self {
        Self { coordinates }
    }

    /// Convenience constructor from `(dimension, value)` pairs.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            coordinates: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> &BTreeMap<String, String> {
        &self.coordinates
    }

    /// Canonical JSON rendering used in diagnostic messages,
    /// e.g. `{"language":"en"}`.
    #[must_use]
    pub fn to_json(&self) -> String {
        // BTreeMap<String, String> serialization cannot fail.
        serde_json::to_string(&self.coordinates).unwrap_or_default()
    }
}

impl fmt::Display for DimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// The dimension space point at which a node variant was originally authored.
///
/// Distinct from a plain [`DimensionSpacePoint`]: an origin point is always an
/// occupied point of some aggregate, while covered points may be inherited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginDimensionSpacePoint(DimensionSpacePoint);

impl OriginDimensionSpacePoint {
    #[must_use]
    pub fn new(point: DimensionSpacePoint) -> Self {
        Self(point)
    }

    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self(DimensionSpacePoint::from_pairs(pairs))
    }

    /// The same coordinate, viewed as a plain dimension space point.
    #[must_use]
    pub fn to_dimension_space_point(&self) -> DimensionSpacePoint {
        self.0.clone()
    }

    #[must_use]
    pub fn as_dimension_space_point(&self) -> &DimensionSpacePoint {
        &self.0
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        self.0.to_json()
    }

    /// True if this origin sits at exactly the given covered point.
    #[must_use]
    pub fn equals_point(&self, point: &DimensionSpacePoint) -> bool {
        &self.0 == point
    }
}

impl fmt::Display for OriginDimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The structural relation between two dimension space points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantType {
    Same,
    Specialization,
    Generalization,
    Peer,
}

impl VariantType {
    /// Lowercase name, as stored in the variation graph's own vocabulary.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Same => "same",
            Self::Specialization => "specialization",
            Self::Generalization => "generalization",
            Self::Peer => "peer",
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// External collaborator: the inter-dimensional variation graph.
///
/// Given two points, reports how the first relates to the second. The graph's
/// construction is outside this crate; detection only ever queries it.
pub trait VariationGraph: Send + Sync {
    fn variant_type(&self, point: &DimensionSpacePoint, base: &DimensionSpacePoint) -> VariantType;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_json_is_order_independent() {
        let a = DimensionSpacePoint::from_pairs([("market", "eu"), ("language", "en")]);
        let b = DimensionSpacePoint::from_pairs([("language", "en"), ("market", "eu")]);
        assert_eq!(a, b);
        assert_eq!(a.to_json(), b.to_json());
        assert_eq!(a.to_json(), r#"{"language":"en","market":"eu"}"#);
    }

    #[test]
    fn origin_converts_to_plain_point() {
        let origin = OriginDimensionSpacePoint::from_pairs([("language", "en")]);
        let plain = DimensionSpacePoint::from_pairs([("language", "en")]);
        assert_eq!(origin.to_dimension_space_point(), plain);
        assert!(origin.equals_point(&plain));
    }

    #[test]
    fn variant_type_labels() {
        assert_eq!(VariantType::Peer.label(), "peer");
        assert_eq!(VariantType::Specialization.label().to_uppercase(), "SPECIALIZATION");
    }
}
