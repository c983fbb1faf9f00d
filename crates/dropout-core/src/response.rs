//! Response extraction: enrolled and dropped participants per study.
//!
//! A study survives only when withdrawal totals, actual enrollment and the
//! three participant-flow milestones all agree:
//!
//! - `enrolled == STARTED`
//! - `dropped == NOT COMPLETED`
//! - `STARTED == COMPLETED + NOT COMPLETED`
//!
//! Studies failing any check are counted in the gate reports, never errors.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info_span};

use dropout_ingest::{EnrollmentRecord, MilestoneRecord, ResponseInputs, WithdrawalRecord};
use dropout_model::{
    DropReason, Gate, GateReport, MilestoneKind, PipelineReport, StudyId, StudyResponse,
};

use crate::audit::log_gate;

/// Responses that passed every gate, with the gate accounting.
#[derive(Debug, Clone, Default)]
pub struct ResponseSet {
    pub responses: BTreeMap<StudyId, StudyResponse>,
    pub report: PipelineReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Enrollment {
    Actual(u64),
    NotActual,
    Missing,
}

/// Milestone totals for one study, indexed like [`MilestoneKind::ALL`].
#[derive(Debug, Clone, Copy, Default)]
struct MilestoneTotals([Option<u64>; 3]);

impl MilestoneTotals {
    fn slot(kind: MilestoneKind) -> usize {
        match kind {
            MilestoneKind::Started => 0,
            MilestoneKind::Completed => 1,
            MilestoneKind::NotCompleted => 2,
        }
    }

    fn add(&mut self, kind: MilestoneKind, count: u64) {
        let total = &mut self.0[Self::slot(kind)];
        *total = Some(total.unwrap_or(0).saturating_add(count));
    }

    fn get(&self, kind: MilestoneKind) -> Option<u64> {
        self.0[Self::slot(kind)]
    }

    /// The three totals, or the first milestone that has none.
    fn complete(&self) -> Result<[u64; 3], MilestoneKind> {
        let mut totals = [0; 3];
        for kind in MilestoneKind::ALL {
            totals[Self::slot(kind)] = self.get(kind).ok_or(kind)?;
        }
        Ok(totals)
    }
}

fn usable_count(count: Option<i64>) -> Option<u64> {
    count.and_then(|value| u64::try_from(value).ok())
}

/// Sums usable withdrawal counts per study.
pub fn dropped_totals(withdrawals: &[WithdrawalRecord]) -> BTreeMap<StudyId, u64> {
    let mut totals: BTreeMap<StudyId, u64> = BTreeMap::new();
    for record in withdrawals {
        if let Some(count) = usable_count(record.count) {
            let total = totals.entry(record.study_id.clone()).or_default();
            *total = total.saturating_add(count);
        }
    }
    totals
}

fn enrollment_states(enrollments: &[EnrollmentRecord]) -> BTreeMap<StudyId, Enrollment> {
    let mut states = BTreeMap::new();
    for record in enrollments {
        if states.contains_key(&record.study_id) {
            debug!(study = %record.study_id, "ignoring duplicate enrollment row");
            continue;
        }
        let state = if record.enrollment_type.as_deref() == Some("Actual") {
            usable_count(record.enrollment).map_or(Enrollment::Missing, Enrollment::Actual)
        } else {
            Enrollment::NotActual
        };
        states.insert(record.study_id.clone(), state);
    }
    states
}

fn milestone_totals(milestones: &[MilestoneRecord]) -> BTreeMap<StudyId, MilestoneTotals> {
    let mut totals: BTreeMap<StudyId, MilestoneTotals> = BTreeMap::new();
    for record in milestones {
        let Some(kind) = record.title.as_deref().and_then(MilestoneKind::from_title) else {
            continue;
        };
        if let Some(count) = usable_count(record.count) {
            totals
                .entry(record.study_id.clone())
                .or_default()
                .add(kind, count);
        }
    }
    totals
}

/// Checks the three equalities in order and names the first one violated.
fn consistency(
    response: StudyResponse,
    [started, completed, not_completed]: [u64; 3],
) -> Result<(), DropReason> {
    if response.enrolled != started {
        return Err(DropReason::EnrolledNotStarted);
    }
    if response.dropped != not_completed {
        return Err(DropReason::DroppedNotNotCompleted);
    }
    if Some(started) != completed.checked_add(not_completed) {
        return Err(DropReason::StartedNotSum);
    }
    Ok(())
}

/// Builds the per-study response set from the three response record sets.
pub fn extract_responses(inputs: &ResponseInputs) -> ResponseSet {
    let _span = info_span!("extract_responses").entered();

    let dropped = dropped_totals(&inputs.withdrawals);
    let enrollment = enrollment_states(&inputs.enrollments);
    let milestones = milestone_totals(&inputs.milestones);

    let candidates: BTreeSet<&StudyId> = dropped.keys().chain(enrollment.keys()).collect();
    let mut join = GateReport::new(Gate::ResponseJoin);
    let mut joined = Vec::new();
    for study_id in candidates {
        match (dropped.get(study_id), enrollment.get(study_id)) {
            (None, _) => join.drop_row(DropReason::MissingWithdrawals),
            (Some(&dropped), Some(&Enrollment::Actual(enrolled))) => {
                join.keep();
                joined.push((study_id.clone(), StudyResponse::new(enrolled, dropped)));
            }
            (Some(_), Some(Enrollment::NotActual)) => {
                join.drop_row(DropReason::EnrollmentNotActual)
            }
            (Some(_), Some(Enrollment::Missing) | None) => {
                join.drop_row(DropReason::MissingEnrollment)
            }
        }
    }
    log_gate(&join);

    let mut milestone_gate = GateReport::new(Gate::Milestones);
    let mut with_milestones = Vec::new();
    for (study_id, response) in joined {
        let totals = milestones
            .get(&study_id)
            .copied()
            .unwrap_or_default()
            .complete();
        match totals {
            Ok(totals) => {
                milestone_gate.keep();
                with_milestones.push((study_id, response, totals));
            }
            Err(kind) => milestone_gate.drop_row(DropReason::missing_milestone(kind)),
        }
    }
    log_gate(&milestone_gate);

    let mut consistency_gate = GateReport::new(Gate::Consistency);
    let mut responses = BTreeMap::new();
    for (study_id, response, totals) in with_milestones {
        match consistency(response, totals) {
            Ok(()) => {
                consistency_gate.keep();
                responses.insert(study_id, response);
            }
            Err(reason) => consistency_gate.drop_row(reason),
        }
    }
    log_gate(&consistency_gate);

    let mut report = PipelineReport::default();
    report.push(join);
    report.push(milestone_gate);
    report.push(consistency_gate);
    ResponseSet { responses, report }
}
