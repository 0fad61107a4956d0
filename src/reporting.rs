// src/reporting.rs
//! Console output formatting for adjustment findings.
//!
//! Findings are grouped by kind. The first occurrence of each kind renders a
//! full guidance block (what it means, how it is fixed); subsequent
//! occurrences of the same kind render a compact one-liner with a
//! back-reference.

use colored::Colorize;
use std::collections::HashMap;
use std::fmt::Write;

use crate::adjustment::{AdjustmentKind, StructureAdjustment};

/// Static guidance per adjustment kind.
struct KindGuidance {
    meaning: &'static str,
    fix: &'static str,
}

fn get_guidance(kind: AdjustmentKind) -> KindGuidance {
    match kind {
        AdjustmentKind::TetheredNodeMissing => KindGuidance {
            meaning: "The schema mandates an auto-created child node that is absent below its parent.",
            fix: "Remediation creates the tethered child with its declared type, covering the parent's dimension space points.",
        },
        AdjustmentKind::DisallowedTetheredNode => KindGuidance {
            meaning: "A tethered child exists that the parent's schema no longer declares.",
            fix: "Remediation removes the stray child aggregate.",
        },
        AdjustmentKind::TetheredNodeTypeWrong => KindGuidance {
            meaning: "A tethered child exists under its declared name but with a different node type.",
            fix: "No automatic fix; retyping a populated subtree needs a hand-written node migration.",
        },
        AdjustmentKind::TetheredNodeWronglyOrdered => KindGuidance {
            meaning: "The tethered children are complete but not in their schema-declared sibling order.",
            fix: "Remediation reorders them to the declared order.",
        },
        AdjustmentKind::NodeTypeIsUnknown => KindGuidance {
            meaning: "The persisted node type name no longer resolves to a schema (or resolves to the generic fallback).",
            fix: "Remediation removes the aggregate; convert the nodes first if their content must survive.",
        },
        AdjustmentKind::DisallowedChildNode => KindGuidance {
            meaning: "The parent's schema forbids children of this node's type.",
            fix: "Remediation removes the aggregate; move it under a permitting parent first if it must survive.",
        },
        AdjustmentKind::ObsoleteProperty => KindGuidance {
            meaning: "A stored property is no longer declared by the node type.",
            fix: "Remediation removes the orphaned value.",
        },
        AdjustmentKind::MissingDefaultValue => KindGuidance {
            meaning: "A declared property with a default is absent on the node.",
            fix: "Remediation writes the declared default.",
        },
        AdjustmentKind::NonDeserializableProperty => KindGuidance {
            meaning: "A stored property was written under a type the schema no longer declares for it.",
            fix: "Remediation removes the stale value; re-enter it under the new type afterwards.",
        },
        AdjustmentKind::NodeCoversGeneralizationOrPeers => KindGuidance {
            meaning: "A node is covered at a dimension space point that is not a specialization of its origin.",
            fix: "No automatic fix; coverage misdirection needs a hand-written node migration.",
        },
    }
}

/// Renders a full report of the given findings.
#[must_use]
pub fn render(adjustments: &[StructureAdjustment]) -> String {
    let mut out = String::new();
    if adjustments.is_empty() {
        let _ = writeln!(out, "{}", "No structure adjustments found.".green());
        return out;
    }

    let mut totals: HashMap<AdjustmentKind, usize> = HashMap::new();
    for adjustment in adjustments {
        *totals.entry(adjustment.kind).or_insert(0) += 1;
    }

    let mut seen: HashMap<AdjustmentKind, usize> = HashMap::new();
    for adjustment in adjustments {
        let occurrence = seen.entry(adjustment.kind).or_insert(0);
        *occurrence += 1;
        if *occurrence == 1 {
            render_full(&mut out, adjustment);
        } else {
            render_compact(&mut out, adjustment, *occurrence, totals[&adjustment.kind]);
        }
    }

    let detection_only = adjustments.iter().filter(|a| a.is_detection_only()).count();
    let _ = writeln!(
        out,
        "{} {} ({} fixable, {} reported only)",
        "Total:".bold(),
        adjustments.len(),
        adjustments.len() - detection_only,
        detection_only,
    );
    out
}

fn render_full(out: &mut String, adjustment: &StructureAdjustment) {
    let header = format!(
        "{}: {} (type {})",
        adjustment.kind,
        adjustment.node_aggregate_id,
        adjustment.node_type_name,
    );
    let _ = writeln!(out, "{}", header.red().bold());
    let _ = writeln!(out, "   {} {}", "=".blue(), adjustment.message);

    let guidance = get_guidance(adjustment.kind);
    let _ = writeln!(out, "   {}", "|".blue());
    let _ = writeln!(out, "   {} {} {}", "=".blue(), "MEANING:".cyan(), guidance.meaning);
    let _ = writeln!(out, "   {}", "|".blue());
    let _ = writeln!(out, "   {} {} {}", "=".blue(), "FIX:".green(), guidance.fix);
    if let Some(remediation) = &adjustment.remediation {
        let _ = writeln!(out, "   {}", "|".blue());
        let _ = writeln!(
            out,
            "   {} {} {}",
            "=".blue(),
            "REMEDIATION:".green(),
            remediation.label(),
        );
    }
    let _ = writeln!(out);
}

fn render_compact(
    out: &mut String,
    adjustment: &StructureAdjustment,
    occurrence: usize,
    total: usize,
) {
    let header = format!(
        "[{occurrence} of {total}] {}: {}",
        adjustment.kind, adjustment.node_aggregate_id,
    );
    let _ = writeln!(out, "{}", header.yellow());
    let _ = writeln!(
        out,
        "   {} see first {} above",
        "=".blue(),
        adjustment.kind.label().yellow(),
    );
}
