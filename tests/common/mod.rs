// tests/common/mod.rs
//! In-memory fake collaborators shared by the test suite.
//!
//! The graph fake is mutable behind a mutex so that the recording publisher
//! can apply published events back into it; this is what makes remediation
//! convergence observable in tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use graphmend::dimension::{
    DimensionSpacePoint, OriginDimensionSpacePoint, VariantType, VariationGraph,
};
use graphmend::error::{GraphMendError, Result};
use graphmend::events::{EventPublisher, EventsToPublish, StructureEvent};
use graphmend::graph::{AggregateStream, ContentGraph, ReadCache};
use graphmend::node::{
    ContentStreamId, Node, NodeAggregate, NodeAggregateId, NodeClassification, NodeName,
    NodeTypeName, PropertyValue,
};
use graphmend::schema::{NodeType, NodeTypeRegistry};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

// --- Dimension space helpers ---

pub fn point(language: &str) -> DimensionSpacePoint {
    DimensionSpacePoint::from_pairs([("language", language)])
}

pub fn origin(language: &str) -> OriginDimensionSpacePoint {
    OriginDimensionSpacePoint::from_pairs([("language", language)])
}

// --- Node helpers ---

pub fn node(id: &str, node_type: &str, at: OriginDimensionSpacePoint) -> Node {
    Node {
        aggregate_id: NodeAggregateId::new(id),
        node_type_name: NodeTypeName::new(node_type),
        name: None,
        classification: NodeClassification::Regular,
        origin: at,
        properties: BTreeMap::new(),
    }
}

pub fn tethered_node(
    id: &str,
    node_type: &str,
    name: &str,
    at: OriginDimensionSpacePoint,
) -> Node {
    Node {
        name: Some(NodeName::new(name)),
        classification: NodeClassification::Tethered,
        ..node(id, node_type, at)
    }
}

/// An aggregate with one variant whose origin covers the given points.
pub fn single_variant_aggregate(
    variant: Node,
    covered: Vec<DimensionSpacePoint>,
) -> NodeAggregate {
    let coverage = BTreeMap::from([(variant.origin.clone(), covered)]);
    NodeAggregate::new(
        variant.aggregate_id.clone(),
        variant.node_type_name.clone(),
        vec![variant],
        coverage,
    )
}

// --- Content graph fake ---

#[derive(Default)]
pub struct GraphState {
    pub aggregates: Vec<NodeAggregate>,
    /// child aggregate id -> parent aggregate id
    pub parent_of: HashMap<String, String>,
    /// parent aggregate id -> ordered child aggregate ids
    pub children_of: HashMap<String, Vec<String>>,
}

impl GraphState {
    fn find_aggregate(&self, id: &str) -> Option<&NodeAggregate> {
        self.aggregates.iter().find(|a| a.id().as_str() == id)
    }

    fn find_aggregate_mut(&mut self, id: &str) -> Option<&mut NodeAggregate> {
        self.aggregates.iter_mut().find(|a| a.id().as_str() == id)
    }

    /// The variant at exactly the given origin, falling back to the first
    /// variant (e.g. a parent authored at a generalization).
    fn node_at(&self, id: &str, at: &OriginDimensionSpacePoint) -> Option<Node> {
        let aggregate = self.find_aggregate(id)?;
        aggregate
            .nodes()
            .find(|n| &n.origin == at)
            .or_else(|| aggregate.nodes().next())
            .cloned()
    }
}

#[derive(Clone)]
pub struct InMemoryGraph {
    stream: ContentStreamId,
    state: Arc<Mutex<GraphState>>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self {
            stream: ContentStreamId::new("cs-live"),
            state: Arc::new(Mutex::new(GraphState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<GraphState>> {
        Arc::clone(&self.state)
    }

    pub fn add_aggregate(&self, aggregate: NodeAggregate) -> &Self {
        self.state.lock().unwrap().aggregates.push(aggregate);
        self
    }

    pub fn add_child(&self, parent: &str, child: &str) -> &Self {
        let mut state = self.state.lock().unwrap();
        state.parent_of.insert(child.to_string(), parent.to_string());
        state
            .children_of
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
        self
    }
}

impl ContentGraph for InMemoryGraph {
    fn content_stream_id(&self) -> ContentStreamId {
        self.stream.clone()
    }

    fn used_node_type_names(&self) -> Result<Vec<NodeTypeName>> {
        let state = self.state.lock().unwrap();
        let mut names: Vec<NodeTypeName> = Vec::new();
        for aggregate in &state.aggregates {
            if !names.contains(aggregate.node_type_name()) {
                names.push(aggregate.node_type_name().clone());
            }
        }
        Ok(names)
    }

    fn node_aggregates_of_type(&self, name: &NodeTypeName) -> AggregateStream<'_> {
        let matching: Vec<NodeAggregate> = self
            .state
            .lock()
            .unwrap()
            .aggregates
            .iter()
            .filter(|a| a.node_type_name() == name)
            .cloned()
            .collect();
        Box::new(matching.into_iter().map(Ok))
    }

    fn parent_node(
        &self,
        id: &NodeAggregateId,
        at: &OriginDimensionSpacePoint,
    ) -> Result<Option<Node>> {
        let state = self.state.lock().unwrap();
        let Some(parent_id) = state.parent_of.get(id.as_str()) else {
            return Ok(None);
        };
        state
            .node_at(parent_id, at)
            .map(Some)
            .ok_or_else(|| GraphMendError::projection(format!("dangling parent link for {id}")))
    }

    fn tethered_child_nodes(
        &self,
        parent: &NodeAggregateId,
        at: &OriginDimensionSpacePoint,
    ) -> Result<Vec<Node>> {
        let state = self.state.lock().unwrap();
        let child_ids = state
            .children_of
            .get(parent.as_str())
            .cloned()
            .unwrap_or_default();
        Ok(child_ids
            .iter()
            .filter_map(|child_id| state.node_at(child_id, at))
            .filter(Node::is_tethered)
            .collect())
    }
}

// --- Node type registry fake ---

#[derive(Default)]
pub struct StaticRegistry {
    types: HashMap<NodeTypeName, NodeType>,
    /// Returned for any miss when set, mimicking a configured fallback type.
    fallback: Option<NodeType>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.types.insert(node_type.name().clone(), node_type);
        self
    }

    pub fn with_fallback(mut self, fallback: NodeType) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

impl NodeTypeRegistry for StaticRegistry {
    fn node_type(&self, name: &NodeTypeName) -> Option<NodeType> {
        self.types
            .get(name)
            .cloned()
            .or_else(|| self.fallback.clone())
    }
}

// --- Variation graph fake ---

/// Relations are looked up as (point, base) pairs; unlisted pairs are Same
/// when equal and Peer otherwise.
#[derive(Default)]
pub struct StaticVariationGraph {
    relations: HashMap<(DimensionSpacePoint, DimensionSpacePoint), VariantType>,
}

impl StaticVariationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relation(
        mut self,
        point: DimensionSpacePoint,
        base: DimensionSpacePoint,
        variant_type: VariantType,
    ) -> Self {
        self.relations.insert((point, base), variant_type);
        self
    }
}

impl VariationGraph for StaticVariationGraph {
    fn variant_type(&self, point: &DimensionSpacePoint, base: &DimensionSpacePoint) -> VariantType {
        if let Some(variant_type) = self.relations.get(&(point.clone(), base.clone())) {
            return *variant_type;
        }
        if point == base {
            VariantType::Same
        } else {
            VariantType::Peer
        }
    }
}

// --- Cache and publisher fakes ---

pub struct FlagCache {
    log: CallLog,
}

impl FlagCache {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl ReadCache for FlagCache {
    fn disable_cache(&self) {
        self.log.lock().unwrap().push("disable_cache".to_string());
    }
}

/// Records published batches and applies their events back into the shared
/// graph state, emulating the projection catching up synchronously.
pub struct RecordingPublisher {
    log: CallLog,
    state: Arc<Mutex<GraphState>>,
    pub published: Mutex<Vec<EventsToPublish>>,
}

impl RecordingPublisher {
    pub fn new(log: CallLog, state: Arc<Mutex<GraphState>>) -> Self {
        Self {
            log,
            state,
            published: Mutex::new(Vec::new()),
        }
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish_events(&self, batch: EventsToPublish) -> Result<()> {
        self.log.lock().unwrap().push("publish_events".to_string());
        let mut state = self.state.lock().unwrap();
        for event in &batch.events {
            apply_event(&mut state, event);
        }
        self.published.lock().unwrap().push(batch);
        Ok(())
    }
}

/// A publisher whose appends always fail.
pub struct FailingPublisher;

impl EventPublisher for FailingPublisher {
    fn publish_events(&self, _batch: EventsToPublish) -> Result<()> {
        Err(GraphMendError::Publish {
            message: "event store unavailable".to_string(),
        })
    }
}

fn property_type_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::String(_) => "string",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "integer",
        _ => "json",
    }
}

fn apply_event(state: &mut GraphState, event: &StructureEvent) {
    match event {
        StructureEvent::NodeAggregateWasRemoved {
            node_aggregate_id, ..
        } => {
            let id = node_aggregate_id.as_str().to_string();
            state.aggregates.retain(|a| a.id().as_str() != id);
            state.parent_of.remove(&id);
            for children in state.children_of.values_mut() {
                children.retain(|c| c != &id);
            }
        }
        StructureEvent::TetheredNodeWasCreated {
            node_aggregate_id,
            node_type_name,
            parent_id,
            name,
            origin,
            coverage,
        } => {
            let variant = Node {
                aggregate_id: node_aggregate_id.clone(),
                node_type_name: node_type_name.clone(),
                name: Some(name.clone()),
                classification: NodeClassification::Tethered,
                origin: origin.clone(),
                properties: BTreeMap::new(),
            };
            state.aggregates.push(NodeAggregate::new(
                node_aggregate_id.clone(),
                node_type_name.clone(),
                vec![variant],
                BTreeMap::from([(origin.clone(), coverage.clone())]),
            ));
            state.parent_of.insert(
                node_aggregate_id.as_str().to_string(),
                parent_id.as_str().to_string(),
            );
            state
                .children_of
                .entry(parent_id.as_str().to_string())
                .or_default()
                .push(node_aggregate_id.as_str().to_string());
        }
        StructureEvent::TetheredNodesWereReordered {
            parent_id, order, ..
        } => {
            let current = state
                .children_of
                .get(parent_id.as_str())
                .cloned()
                .unwrap_or_default();
            let mut reordered: Vec<String> = Vec::with_capacity(current.len());
            for name in order {
                if let Some(child_id) = current.iter().find(|child_id| {
                    state
                        .find_aggregate(child_id)
                        .and_then(|a| a.nodes().next())
                        .and_then(|n| n.name.clone())
                        .is_some_and(|n| &n == name)
                }) {
                    reordered.push(child_id.clone());
                }
            }
            for child_id in current {
                if !reordered.contains(&child_id) {
                    reordered.push(child_id);
                }
            }
            state
                .children_of
                .insert(parent_id.as_str().to_string(), reordered);
        }
        StructureEvent::NodePropertiesWereSet {
            node_aggregate_id,
            origin,
            values,
        } => {
            if let Some(aggregate) = state.find_aggregate_mut(node_aggregate_id.as_str()) {
                mutate_variant_properties(aggregate, origin, |properties| {
                    for (name, value) in values {
                        properties.insert(
                            name.clone(),
                            PropertyValue::new(value.clone(), property_type_of(value)),
                        );
                    }
                });
            }
        }
        StructureEvent::NodePropertiesWereRemoved {
            node_aggregate_id,
            origin,
            names,
        } => {
            if let Some(aggregate) = state.find_aggregate_mut(node_aggregate_id.as_str()) {
                mutate_variant_properties(aggregate, origin, |properties| {
                    for name in names {
                        properties.remove(name);
                    }
                });
            }
        }
    }
}

/// Rebuilds the aggregate with the mutated variant; `NodeAggregate` exposes
/// no mutable access by design, so the fake re-creates it.
fn mutate_variant_properties<F>(
    aggregate: &mut NodeAggregate,
    at: &OriginDimensionSpacePoint,
    mutate: F,
) where
    F: FnOnce(&mut BTreeMap<String, PropertyValue>),
{
    let mut nodes: Vec<Node> = aggregate.nodes().cloned().collect();
    if let Some(variant) = nodes.iter_mut().find(|n| &n.origin == at) {
        mutate(&mut variant.properties);
    }
    let coverage: BTreeMap<_, _> = nodes
        .iter()
        .map(|n| {
            (
                n.origin.clone(),
                aggregate
                    .coverage_by_occupant(&n.origin)
                    .map(<[DimensionSpacePoint]>::to_vec)
                    .unwrap_or_default(),
            )
        })
        .collect();
    *aggregate = NodeAggregate::new(
        aggregate.id().clone(),
        aggregate.node_type_name().clone(),
        nodes,
        coverage,
    );
}
