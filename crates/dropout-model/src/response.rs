use std::fmt;

use serde::{Deserialize, Serialize};

/// Participant counts that define a study's dropout response.
///
/// Only built for studies that passed the three-way consistency gate, so
/// `dropped <= enrolled` is expected but enforced later by the drop-ratio
/// filter rather than assumed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyResponse {
    pub enrolled: u64,
    pub dropped: u64,
}

impl StudyResponse {
    pub fn new(enrolled: u64, dropped: u64) -> Self {
        Self { enrolled, dropped }
    }

    /// Fraction of enrolled participants who dropped out.
    ///
    /// Returns `None` when nobody was enrolled.
    pub fn dropout_rate(&self) -> Option<f64> {
        if self.enrolled == 0 {
            None
        } else {
            Some(self.dropped as f64 / self.enrolled as f64)
        }
    }
}

/// Participant-flow milestones used by the consistency gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MilestoneKind {
    Started,
    Completed,
    NotCompleted,
}

impl MilestoneKind {
    pub const ALL: [MilestoneKind; 3] = [
        MilestoneKind::Started,
        MilestoneKind::Completed,
        MilestoneKind::NotCompleted,
    ];

    /// Milestone title as recorded in the participant-flow table.
    pub fn title(self) -> &'static str {
        match self {
            MilestoneKind::Started => "STARTED",
            MilestoneKind::Completed => "COMPLETED",
            MilestoneKind::NotCompleted => "NOT COMPLETED",
        }
    }

    /// Exact (whitespace-trimmed, case-sensitive) title match.
    pub fn from_title(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.into_iter().find(|kind| kind.title() == trimmed)
    }
}

impl fmt::Display for MilestoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
