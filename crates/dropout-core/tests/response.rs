use dropout_core::extract_responses;
use dropout_ingest::{EnrollmentRecord, MilestoneRecord, ResponseInputs, WithdrawalRecord};
use dropout_model::{DropReason, Gate, StudyId, StudyResponse};
use proptest::prelude::*;

/// Flow counts for one synthetic study.
#[derive(Debug, Clone, Copy)]
struct Flow {
    enrolled: i64,
    dropped: i64,
    started: i64,
    completed: i64,
    not_completed: i64,
}

impl Flow {
    fn consistent(self) -> bool {
        self.enrolled == self.started
            && self.dropped == self.not_completed
            && self.started == self.completed + self.not_completed
    }
}

fn push_study(inputs: &mut ResponseInputs, id: &str, flow: Flow) {
    inputs.withdrawals.push(WithdrawalRecord {
        study_id: id.into(),
        count: Some(flow.dropped),
    });
    inputs.enrollments.push(EnrollmentRecord {
        study_id: id.into(),
        enrollment: Some(flow.enrolled),
        enrollment_type: Some("Actual".to_string()),
    });
    for (title, count) in [
        ("STARTED", flow.started),
        ("COMPLETED", flow.completed),
        ("NOT COMPLETED", flow.not_completed),
    ] {
        inputs.milestones.push(MilestoneRecord {
            study_id: id.into(),
            title: Some(title.to_string()),
            count: Some(count),
        });
    }
}

fn single(flow: Flow) -> ResponseInputs {
    let mut inputs = ResponseInputs::default();
    push_study(&mut inputs, "NCT1", flow);
    inputs
}

const GOOD: Flow = Flow {
    enrolled: 100,
    dropped: 20,
    started: 100,
    completed: 80,
    not_completed: 20,
};

#[test]
fn test_consistent_study_is_kept() {
    let set = extract_responses(&single(GOOD));
    assert_eq!(
        set.responses.get(&StudyId::from("NCT1")),
        Some(&StudyResponse::new(100, 20))
    );
    assert_eq!(set.report.total_dropped(), 0);
}

#[test]
fn test_each_equality_violation_is_attributed() {
    let cases = [
        (
            Flow {
                enrolled: 101,
                ..GOOD
            },
            DropReason::EnrolledNotStarted,
        ),
        (
            Flow {
                dropped: 21,
                ..GOOD
            },
            DropReason::DroppedNotNotCompleted,
        ),
        (
            Flow {
                completed: 79,
                ..GOOD
            },
            DropReason::StartedNotSum,
        ),
    ];
    for (flow, reason) in cases {
        let set = extract_responses(&single(flow));
        assert!(set.responses.is_empty(), "{flow:?} should be dropped");
        let gate = set.report.get(Gate::Consistency).unwrap();
        assert_eq!(gate.dropped_for(reason), 1, "{flow:?}");
        assert_eq!(gate.kept, 0);
    }
}

#[test]
fn test_missing_inputs_are_attributed_per_gate() {
    let mut inputs = ResponseInputs::default();
    push_study(&mut inputs, "NCT1", GOOD);

    // Enrollment but no withdrawals.
    inputs.enrollments.push(EnrollmentRecord {
        study_id: "NCT2".into(),
        enrollment: Some(5),
        enrollment_type: Some("Actual".to_string()),
    });
    // Anticipated enrollment.
    inputs.withdrawals.push(WithdrawalRecord {
        study_id: "NCT3".into(),
        count: Some(1),
    });
    inputs.enrollments.push(EnrollmentRecord {
        study_id: "NCT3".into(),
        enrollment: Some(5),
        enrollment_type: Some("Anticipated".to_string()),
    });
    // No COMPLETED milestone.
    inputs.withdrawals.push(WithdrawalRecord {
        study_id: "NCT4".into(),
        count: Some(1),
    });
    inputs.enrollments.push(EnrollmentRecord {
        study_id: "NCT4".into(),
        enrollment: Some(5),
        enrollment_type: Some("Actual".to_string()),
    });
    inputs.milestones.push(MilestoneRecord {
        study_id: "NCT4".into(),
        title: Some("STARTED".to_string()),
        count: Some(5),
    });
    inputs.milestones.push(MilestoneRecord {
        study_id: "NCT4".into(),
        title: Some("NOT COMPLETED".to_string()),
        count: Some(1),
    });

    let set = extract_responses(&inputs);
    assert_eq!(set.responses.len(), 1);

    let join = set.report.get(Gate::ResponseJoin).unwrap();
    assert_eq!(join.input, 4);
    assert_eq!(join.kept, 2);
    assert_eq!(join.dropped_for(DropReason::MissingWithdrawals), 1);
    assert_eq!(join.dropped_for(DropReason::EnrollmentNotActual), 1);

    let milestones = set.report.get(Gate::Milestones).unwrap();
    assert_eq!(milestones.dropped_for(DropReason::MissingCompleted), 1);
    assert_eq!(set.report.total_dropped(), 3);
}

#[test]
fn test_milestone_counts_are_summed_per_title() {
    let mut inputs = single(Flow {
        completed: 50,
        ..GOOD
    });
    inputs.milestones.push(MilestoneRecord {
        study_id: "NCT1".into(),
        title: Some(" COMPLETED ".to_string()),
        count: Some(30),
    });
    // Lowercase titles are not milestones.
    inputs.milestones.push(MilestoneRecord {
        study_id: "NCT1".into(),
        title: Some("completed".to_string()),
        count: Some(999),
    });
    let set = extract_responses(&inputs);
    assert_eq!(set.responses.len(), 1);
}

#[test]
fn test_empty_inputs_give_empty_set() {
    let set = extract_responses(&ResponseInputs::default());
    assert!(set.responses.is_empty());
    assert_eq!(set.report.gates.len(), 3);
    assert!(set.report.gates.iter().all(|gate| gate.input == 0));
}

proptest! {
    #[test]
    fn test_kept_iff_all_equalities_hold(
        enrolled in 0i64..12,
        dropped in 0i64..12,
        started in 0i64..12,
        completed in 0i64..12,
        not_completed in 0i64..12,
    ) {
        let flow = Flow { enrolled, dropped, started, completed, not_completed };
        let set = extract_responses(&single(flow));
        prop_assert_eq!(set.responses.len() == 1, flow.consistent());
        let consistency = set.report.get(Gate::Consistency).unwrap();
        prop_assert_eq!(consistency.input, 1);
    }

    #[test]
    fn test_consistent_flows_are_always_kept(
        completed in 0i64..1000,
        not_completed in 0i64..1000,
    ) {
        let started = completed + not_completed;
        let flow = Flow { enrolled: started, dropped: not_completed, started, completed, not_completed };
        let set = extract_responses(&single(flow));
        let expected = StudyResponse::new(started as u64, not_completed as u64);
        prop_assert_eq!(set.responses.get(&StudyId::from("NCT1")), Some(&expected));
    }
}
