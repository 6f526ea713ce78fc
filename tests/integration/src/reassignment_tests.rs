//! Priority-driven reassignment: proposal, explicit commit, and the races a
//! proposal can lose

use crate::test_utils::{config, thermal_contention_roster};
use skycoord_domain::{AvailabilityStatus, Priority};
use skycoord_engine::{dispatch, EngineError, ReassignmentPlan, Request, Response};
use skycoord_roster::StoreError;

#[test]
fn test_urgent_thermal_mission_proposes_preempting_standard() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut store = thermal_contention_roster();

    // No free thermal pair exists for M2.
    let response = dispatch(
        &mut store,
        Request::FindCandidates {
            mission_id: "M2".to_string(),
        },
        &config(),
    )
    .unwrap();
    let Response::Candidates { candidates } = response else {
        panic!("expected candidates");
    };
    assert!(candidates.is_empty());

    let response = dispatch(
        &mut store,
        Request::ProposeReassignment {
            mission_id: "M2".to_string(),
        },
        &config(),
    )
    .unwrap();
    let Response::Plan {
        plan: ReassignmentPlan::Preempt(proposal),
    } = response
    else {
        panic!("expected a preemption proposal");
    };

    assert_eq!(proposal.vacate_mission_id, "M3");
    assert_eq!(proposal.pilot_id, "P1");
    assert_eq!(proposal.drone_id, "D2");
    assert_eq!(proposal.serve_mission_id, "M2");
    assert_eq!(
        proposal.rationale,
        "vacate Standard mission M3 to serve Urgent mission M2"
    );

    // Planning is side-effect free: M3 is still served.
    assert!(store.snapshot().assignment_for("M3").is_some());
}

#[test]
fn test_committing_the_proposal_swaps_atomically() {
    let mut store = thermal_contention_roster();
    let response = dispatch(
        &mut store,
        Request::ProposeReassignment {
            mission_id: "M2".to_string(),
        },
        &config(),
    )
    .unwrap();
    let Response::Plan {
        plan: ReassignmentPlan::Preempt(proposal),
    } = response
    else {
        panic!("expected a preemption proposal");
    };

    let response = dispatch(
        &mut store,
        Request::CommitProposal { proposal },
        &config(),
    )
    .unwrap();
    let Response::Reassigned {
        vacated_mission_id,
        assignment,
    } = response
    else {
        panic!("expected a committed swap");
    };
    assert_eq!(vacated_mission_id, "M3");
    assert_eq!(assignment.mission_id, "M2");

    let snapshot = store.snapshot();
    assert!(snapshot.mission("M3").unwrap().is_open());
    assert_eq!(
        snapshot.pilot("P1").unwrap().current_assignment.as_deref(),
        Some("M2")
    );
    assert_eq!(
        snapshot.drone("D2").unwrap().current_assignment.as_deref(),
        Some("M2")
    );
}

#[test]
fn test_proposal_loses_race_against_roster_change() {
    let mut store = thermal_contention_roster();
    let response = dispatch(
        &mut store,
        Request::ProposeReassignment {
            mission_id: "M2".to_string(),
        },
        &config(),
    )
    .unwrap();
    let Response::Plan {
        plan: ReassignmentPlan::Preempt(proposal),
    } = response
    else {
        panic!("expected a preemption proposal");
    };

    // The thermal pilot goes on leave before the proposal is confirmed,
    // which vacates M3.
    dispatch(
        &mut store,
        Request::SetPilotStatus {
            pilot_id: "P1".to_string(),
            status: AvailabilityStatus::Unavailable,
        },
        &config(),
    )
    .unwrap();

    let err = dispatch(
        &mut store,
        Request::CommitProposal { proposal },
        &config(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Store(StoreError::NotAssigned(_))
    ));
}

#[test]
fn test_standard_mission_cannot_trigger_preemption() {
    let mut store = thermal_contention_roster();
    // Downgrade the blocked mission before asking.
    {
        let mut snapshot = store.snapshot();
        for m in snapshot.missions.iter_mut().filter(|m| m.id == "M2") {
            m.priority = Priority::Standard;
        }
        store = skycoord_roster::RosterStore::from_snapshot(snapshot);
    }

    let err = dispatch(
        &mut store,
        Request::ProposeReassignment {
            mission_id: "M2".to_string(),
        },
        &config(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::PreemptionNotJustified { .. }));
}

#[test]
fn test_proposals_only_name_strictly_lower_priority_missions() {
    let mut store = thermal_contention_roster();
    {
        let mut snapshot = store.snapshot();
        for m in snapshot.missions.iter_mut().filter(|m| m.id == "M3") {
            m.priority = Priority::Urgent;
        }
        store = skycoord_roster::RosterStore::from_snapshot(snapshot);
    }

    let err = dispatch(
        &mut store,
        Request::ProposeReassignment {
            mission_id: "M2".to_string(),
        },
        &config(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        EngineError::NoEligibleOrReassignableResource("M2".to_string())
    );
}
