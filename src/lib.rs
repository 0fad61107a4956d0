// src/lib.rs
//! graphmend audits a dimensioned, event-sourced content graph for
//! structural-integrity violations and optionally repairs them by publishing
//! corrective events.
//!
//! Detection is a pure read: five detectors walk the projected graph and
//! report violations as [`adjustment::StructureAdjustment`] values. Fixable
//! findings carry a deferred [`remediation::Remediation`] command whose event
//! batch the [`service::StructureAdjustmentService`] publishes on request.
//! Storage, projection, schema loading and the event store itself are
//! external collaborators behind traits.

pub mod adjustment;
pub mod dimension;
pub mod error;
pub mod events;
pub mod graph;
pub mod journal;
pub mod node;
pub mod remediation;
pub mod reporting;
pub mod schema;
pub mod service;

pub use adjustment::{AdjustmentDetector, AdjustmentKind, AdjustmentStream, StructureAdjustment};
pub use error::{GraphMendError, Result};
pub use service::{FixSummary, StructureAdjustmentService};
