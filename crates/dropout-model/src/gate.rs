//! Accounting for rows removed at each join and filter boundary.
//!
//! Removing a study is never an error, but every removal is counted with a
//! reason so callers can assert acceptable loss bounds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::response::MilestoneKind;

/// The filtering and joining boundaries of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// Withdrawal totals joined with actual enrollment.
    ResponseJoin,
    /// All three participant-flow milestones present.
    Milestones,
    /// Three-way equality between enrollment, withdrawals and milestones.
    Consistency,
    /// Completed, interventional studies only.
    StudyFilter,
    /// Features joined with responses.
    ModelJoin,
    /// Dropout ratio below the configured threshold.
    DropRatio,
}

impl Gate {
    pub fn label(self) -> &'static str {
        match self {
            Gate::ResponseJoin => "response join",
            Gate::Milestones => "milestones",
            Gate::Consistency => "consistency",
            Gate::StudyFilter => "study filter",
            Gate::ModelJoin => "model join",
            Gate::DropRatio => "drop ratio",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a study was removed. Each removed study has exactly one reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    MissingWithdrawals,
    EnrollmentNotActual,
    MissingEnrollment,
    MissingStarted,
    MissingCompleted,
    MissingNotCompleted,
    EnrolledNotStarted,
    DroppedNotNotCompleted,
    StartedNotSum,
    StatusNotCompleted,
    NotInterventional,
    MissingFeatures,
    MissingResponse,
    DropRatioAtThreshold,
}

impl DropReason {
    pub fn missing_milestone(kind: MilestoneKind) -> Self {
        match kind {
            MilestoneKind::Started => DropReason::MissingStarted,
            MilestoneKind::Completed => DropReason::MissingCompleted,
            MilestoneKind::NotCompleted => DropReason::MissingNotCompleted,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DropReason::MissingWithdrawals => "no withdrawal counts",
            DropReason::EnrollmentNotActual => "enrollment not actual",
            DropReason::MissingEnrollment => "no enrollment",
            DropReason::MissingStarted => "no STARTED milestone",
            DropReason::MissingCompleted => "no COMPLETED milestone",
            DropReason::MissingNotCompleted => "no NOT COMPLETED milestone",
            DropReason::EnrolledNotStarted => "enrolled != STARTED",
            DropReason::DroppedNotNotCompleted => "dropped != NOT COMPLETED",
            DropReason::StartedNotSum => "STARTED != COMPLETED + NOT COMPLETED",
            DropReason::StatusNotCompleted => "status not Completed",
            DropReason::NotInterventional => "not Interventional",
            DropReason::MissingFeatures => "no features",
            DropReason::MissingResponse => "no response",
            DropReason::DropRatioAtThreshold => "drop ratio at or above threshold",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts for a single gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub gate: Gate,
    pub input: usize,
    pub kept: usize,
    pub dropped: BTreeMap<DropReason, usize>,
}

impl GateReport {
    pub fn new(gate: Gate) -> Self {
        Self {
            gate,
            input: 0,
            kept: 0,
            dropped: BTreeMap::new(),
        }
    }

    pub fn keep(&mut self) {
        self.input += 1;
        self.kept += 1;
    }

    pub fn drop_row(&mut self, reason: DropReason) {
        self.input += 1;
        *self.dropped.entry(reason).or_default() += 1;
    }

    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn dropped_for(&self, reason: DropReason) -> usize {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }
}

impl fmt::Display for GateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} in, {} kept", self.gate, self.input, self.kept)?;
        if self.dropped.is_empty() {
            return Ok(());
        }
        write!(f, ", {} dropped (", self.dropped_total())?;
        for (idx, (reason, count)) in self.dropped.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{reason}: {count}")?;
        }
        f.write_str(")")
    }
}

/// Gate reports of one pipeline run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub gates: Vec<GateReport>,
}

impl PipelineReport {
    pub fn push(&mut self, report: GateReport) {
        self.gates.push(report);
    }

    pub fn extend(&mut self, other: PipelineReport) {
        self.gates.extend(other.gates);
    }

    pub fn get(&self, gate: Gate) -> Option<&GateReport> {
        self.gates.iter().find(|report| report.gate == gate)
    }

    pub fn total_dropped(&self) -> usize {
        self.gates.iter().map(GateReport::dropped_total).sum()
    }
}
