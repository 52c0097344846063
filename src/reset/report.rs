//! Reset reports
//!
//! One outcome per phase, collected into a report for the whole run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Remove matching keys from the default store
    SelectiveKeyRemoval,
    /// Clear the plugin store
    ScopedStoreClear,
    /// Delete the plugin store's backing file
    TargetedFileDeletion,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::SelectiveKeyRemoval => write!(f, "selective key removal"),
            Phase::ScopedStoreClear => write!(f, "scoped store clear"),
            Phase::TargetedFileDeletion => write!(f, "targeted file deletion"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseOutcome {
    /// Phase ran; `affected` entries or files were removed
    Completed { affected: usize },
    /// Nothing to do
    Skipped { reason: String },
    Failed { reason: String },
}

impl PhaseOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, PhaseOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub outcome: PhaseOutcome,
}

/// Result of one reset run.
///
/// A report exists whenever the run itself completed; failed phases are
/// recorded here rather than failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub phases: Vec<PhaseReport>,
}

impl ResetReport {
    pub fn outcome(&self, phase: Phase) -> Option<&PhaseOutcome> {
        self.phases
            .iter()
            .find(|report| report.phase == phase)
            .map(|report| &report.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PhaseReport> {
        self.phases.iter().filter(|report| report.outcome.is_failure())
    }

    /// True when no phase failed
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}
