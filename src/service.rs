// src/service.rs
//! Orchestrates the five detectors and executes remediations.

use std::sync::Arc;

use crate::adjustment::{
    AdjustmentDetector, AdjustmentStream, DimensionAdjustment, DisallowedChildAdjustment,
    PropertyAdjustment, StructureAdjustment, TetheredNodeAdjustments, UnknownNodeTypeAdjustment,
};
use crate::dimension::VariationGraph;
use crate::error::Result;
use crate::events::EventPublisher;
use crate::graph::{ContentGraph, ProjectedNodeIterator, ReadCache};
use crate::journal::{AuditTrail, JournalEntryKind};
use crate::node::NodeTypeName;
use crate::schema::NodeTypeRegistry;

/// Outcome counts of a [`StructureAdjustmentService::fix_all_adjustments`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixSummary {
    pub detected: usize,
    pub fixed: usize,
    /// Findings without a corrective command; these need a manual migration.
    pub detection_only: usize,
}

/// The orchestrator: runs all detectors over all node types in use and turns
/// chosen findings into published corrective events.
///
/// Detection is a pure read and may run concurrently with other detection
/// passes. Remediation is blocking and must be serialized by the caller;
/// no two fixes should touch overlapping nodes at once.
pub struct StructureAdjustmentService {
    graph: Arc<dyn ContentGraph>,
    publisher: Arc<dyn EventPublisher>,
    cache: Arc<dyn ReadCache>,
    tethered: TetheredNodeAdjustments,
    unknown_type: UnknownNodeTypeAdjustment,
    disallowed_child: DisallowedChildAdjustment,
    property: PropertyAdjustment,
    dimension: DimensionAdjustment,
    journal: Option<AuditTrail>,
}

impl StructureAdjustmentService {
    #[must_use]
    pub fn new(
        graph: Arc<dyn ContentGraph>,
        registry: Arc<dyn NodeTypeRegistry>,
        variation_graph: Arc<dyn VariationGraph>,
        publisher: Arc<dyn EventPublisher>,
        cache: Arc<dyn ReadCache>,
    ) -> Self {
        let projected_nodes = ProjectedNodeIterator::new(Arc::clone(&graph));
        Self {
            tethered: TetheredNodeAdjustments::new(projected_nodes.clone(), Arc::clone(&registry)),
            unknown_type: UnknownNodeTypeAdjustment::new(
                projected_nodes.clone(),
                Arc::clone(&registry),
            ),
            disallowed_child: DisallowedChildAdjustment::new(
                projected_nodes.clone(),
                Arc::clone(&registry),
            ),
            property: PropertyAdjustment::new(projected_nodes.clone(), Arc::clone(&registry)),
            dimension: DimensionAdjustment::new(projected_nodes, variation_graph),
            graph,
            publisher,
            cache,
            journal: None,
        }
    }

    /// Attaches a best-effort audit trail for detection and fix lifecycles.
    #[must_use]
    pub fn with_journal(mut self, journal: AuditTrail) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Lazily finds every adjustment for every node type currently in use.
    ///
    /// Consumers may stop early; nothing is materialized up front. A failure
    /// to enumerate the used node type names surfaces as a single `Err` item.
    pub fn find_all_adjustments(&self) -> AdjustmentStream<'_> {
        match self.graph.used_node_type_names() {
            Ok(names) => Box::new(
                names
                    .into_iter()
                    .flat_map(move |name| self.find_adjustments_for_node_type(&name)),
            ),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    /// All findings for one node type, in fixed detector order: tethered,
    /// unknown type, disallowed child, property, dimension.
    pub fn find_adjustments_for_node_type<'a>(
        &'a self,
        node_type_name: &NodeTypeName,
    ) -> AdjustmentStream<'a> {
        if let Some(journal) = &self.journal {
            journal.record(JournalEntryKind::DetectionStarted {
                node_type: node_type_name.to_string(),
            });
        }
        let journal = self.journal.clone();
        let stream = self
            .tethered
            .find_adjustments_for_node_type(node_type_name)
            .chain(self.unknown_type.find_adjustments_for_node_type(node_type_name))
            .chain(
                self.disallowed_child
                    .find_adjustments_for_node_type(node_type_name),
            )
            .chain(self.property.find_adjustments_for_node_type(node_type_name))
            .chain(self.dimension.find_adjustments_for_node_type(node_type_name));
        Box::new(stream.inspect(move |item| {
            if let (Some(journal), Ok(adjustment)) = (&journal, item) {
                journal.record(JournalEntryKind::AdjustmentDetected {
                    kind: adjustment.kind.to_string(),
                    node_aggregate_id: adjustment.node_aggregate_id.to_string(),
                });
            }
        }))
    }

    /// Executes an adjustment's remediation, if it has one.
    ///
    /// The read cache is invalidated strictly before the batch is published,
    /// so a detection pass started after this call observes corrected state
    /// instead of stale projections. Publishing blocks until durable.
    ///
    /// # Errors
    /// Propagates remediation and publish failures unchanged; no retry.
    pub fn fix_error(&self, adjustment: &StructureAdjustment) -> Result<()> {
        let Some(remediation) = &adjustment.remediation else {
            // Detection-only finding; nothing to do.
            return Ok(());
        };
        if let Some(journal) = &self.journal {
            journal.record(JournalEntryKind::FixStarted {
                kind: adjustment.kind.to_string(),
                node_aggregate_id: adjustment.node_aggregate_id.to_string(),
            });
        }

        let batch = remediation.execute()?;
        let event_count = batch.events.len();
        self.cache.disable_cache();
        match self.publisher.publish_events(batch) {
            Ok(()) => {
                if let Some(journal) = &self.journal {
                    journal.record(JournalEntryKind::FixSucceeded {
                        kind: adjustment.kind.to_string(),
                        node_aggregate_id: adjustment.node_aggregate_id.to_string(),
                        events_published: event_count,
                    });
                }
                Ok(())
            }
            Err(e) => {
                if let Some(journal) = &self.journal {
                    journal.record(JournalEntryKind::FixFailed {
                        kind: adjustment.kind.to_string(),
                        node_aggregate_id: adjustment.node_aggregate_id.to_string(),
                        error: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }

    /// Finds and fixes everything fixable in one pass.
    ///
    /// Findings are materialized before the first fix; remediating while
    /// lazily reading the same projection would observe half-fixed state.
    /// Fixes run serially and the first failure aborts the run.
    ///
    /// # Errors
    /// Propagates the first detection or remediation failure.
    pub fn fix_all_adjustments(&self) -> Result<FixSummary> {
        let adjustments: Vec<StructureAdjustment> =
            self.find_all_adjustments().collect::<Result<_>>()?;

        let mut summary = FixSummary {
            detected: adjustments.len(),
            ..FixSummary::default()
        };
        for adjustment in &adjustments {
            if adjustment.is_detection_only() {
                summary.detection_only += 1;
            } else {
                self.fix_error(adjustment)?;
                summary.fixed += 1;
            }
        }
        Ok(summary)
    }
}
