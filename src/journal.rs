// src/journal.rs
//! Machine-readable audit trail for detection and remediation runs.
//!
//! Entries are appended as JSON lines to a caller-chosen file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalEntryKind {
    DetectionStarted {
        node_type: String,
    },
    AdjustmentDetected {
        kind: String,
        node_aggregate_id: String,
    },
    FixStarted {
        kind: String,
        node_aggregate_id: String,
    },
    FixSucceeded {
        kind: String,
        node_aggregate_id: String,
        events_published: usize,
    },
    FixFailed {
        kind: String,
        node_aggregate_id: String,
        error: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: u64,
    pub kind: JournalEntryKind,
}

#[derive(Clone)]
pub struct AuditTrail {
    log_path: PathBuf,
}

impl AuditTrail {
    #[must_use]
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    pub fn record(&self, kind: JournalEntryKind) {
        // Journaling is best-effort. We swallow errors to avoid crashing main flow.
        if let Ok(json) = Self::serialize_entry(kind) {
            let _ = self.append_to_file(&json);
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn serialize_entry(kind: JournalEntryKind) -> Result<String> {
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let entry = JournalEntry { timestamp, kind };
        Ok(serde_json::to_string(&entry)?)
    }

    fn append_to_file(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_appends_one_json_line_per_entry() {
        let dir = TempDir::new().unwrap();
        let trail = AuditTrail::new(dir.path().join("audit").join("trail.jsonl"));

        trail.record(JournalEntryKind::DetectionStarted {
            node_type: "acme:page".to_string(),
        });
        trail.record(JournalEntryKind::FixSucceeded {
            kind: "TETHERED_NODE_MISSING".to_string(),
            node_aggregate_id: "a1".to_string(),
            events_published: 1,
        });

        let content = fs::read_to_string(trail.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: JournalEntry = serde_json::from_str(lines[0]).unwrap();
        assert!(matches!(
            first.kind,
            JournalEntryKind::DetectionStarted { .. }
        ));
    }

    #[test]
    fn record_is_best_effort_on_unwritable_path() {
        // A directory path cannot be opened as a file; record must not panic.
        let dir = TempDir::new().unwrap();
        let trail = AuditTrail::new(dir.path());
        trail.record(JournalEntryKind::DetectionStarted {
            node_type: "acme:page".to_string(),
        });
    }
}
