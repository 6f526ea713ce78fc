//! Full assign workflow: candidate search, commit, conflict checks, and the
//! stale-snapshot race at commit time

use crate::test_utils::{config, drone, mapping_roster, mission, pilot};
use skycoord_domain::{AvailabilityStatus, CapabilityTag, MissionType, Priority, SkillTag};
use skycoord_engine::{detect, dispatch, EngineError, Request, Response};
use skycoord_roster::{RosterSnapshot, RosterStore, StoreError};

#[test]
fn test_find_candidates_then_assign_updates_both_references() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut store = mapping_roster();

    let response = dispatch(
        &mut store,
        Request::FindCandidates {
            mission_id: "M1".to_string(),
        },
        &config(),
    )
    .unwrap();
    let Response::Candidates { candidates } = response else {
        panic!("expected candidates");
    };
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].pilot.id, "P1");
    assert_eq!(candidates[0].drone.id, "D1");

    dispatch(
        &mut store,
        Request::Assign {
            mission_id: "M1".to_string(),
            pilot_id: "P1".to_string(),
            drone_id: "D1".to_string(),
        },
        &config(),
    )
    .unwrap();

    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.pilot("P1").unwrap().current_assignment.as_deref(),
        Some("M1")
    );
    assert_eq!(
        snapshot.drone("D1").unwrap().current_assignment.as_deref(),
        Some("M1")
    );
    assert!(detect(&snapshot).is_empty());
}

#[test]
fn test_stale_snapshot_commit_fails_with_already_assigned() {
    let mut store = RosterStore::from_snapshot(RosterSnapshot {
        pilots: vec![pilot("P1", vec![SkillTag::Mapping, SkillTag::Survey], "Bangalore")],
        drones: vec![drone("D1", vec![CapabilityTag::Rgb], "Bangalore")],
        missions: vec![
            mission("M1", MissionType::Mapping, "Bangalore", Priority::High),
            mission("M5", MissionType::Survey, "Bangalore", Priority::Standard),
        ],
    });

    // Two coordinators ran the candidate search over the same snapshot.
    let snapshot = store.snapshot();
    let first = skycoord_engine::find_candidates(&snapshot, "M1", &config()).unwrap();
    let second = skycoord_engine::find_candidates(&snapshot, "M5", &config()).unwrap();
    assert_eq!(first[0].pilot.id, second[0].pilot.id);

    skycoord_engine::assign(&mut store, "M1", &first[0].pilot.id, &first[0].drone.id).unwrap();

    let err =
        skycoord_engine::assign(&mut store, "M5", &second[0].pilot.id, &second[0].drone.id)
            .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Store(StoreError::AlreadyAssigned { .. })
    ));

    // The losing request re-runs the search against the fresh state and
    // finds no free pair.
    let retry = skycoord_engine::find_candidates(&store.snapshot(), "M5", &config()).unwrap();
    assert!(retry.is_empty());
}

#[test]
fn test_pulling_a_pilot_vacates_and_reopens_the_mission() {
    let mut store = mapping_roster();
    dispatch(
        &mut store,
        Request::Assign {
            mission_id: "M1".to_string(),
            pilot_id: "P1".to_string(),
            drone_id: "D1".to_string(),
        },
        &config(),
    )
    .unwrap();

    let response = dispatch(
        &mut store,
        Request::SetPilotStatus {
            pilot_id: "P1".to_string(),
            status: AvailabilityStatus::Unavailable,
        },
        &config(),
    )
    .unwrap();
    assert_eq!(
        response,
        Response::StatusSet {
            resource_id: "P1".to_string(),
            status: AvailabilityStatus::Unavailable,
            vacated_mission_id: Some("M1".to_string()),
        }
    );

    let snapshot = store.snapshot();
    assert!(snapshot.mission("M1").unwrap().is_open());
    assert!(snapshot.drone("D1").unwrap().is_available());
    assert!(detect(&snapshot).is_empty());
}

#[test]
fn test_capability_mismatch_surfaces_after_roster_edit() {
    let mut store = mapping_roster();
    dispatch(
        &mut store,
        Request::Assign {
            mission_id: "M1".to_string(),
            pilot_id: "P1".to_string(),
            drone_id: "D1".to_string(),
        },
        &config(),
    )
    .unwrap();

    // An external edit strips the drone of its RGB sensor.
    let mut snapshot = store.snapshot();
    snapshot.drones[0].capabilities = vec![CapabilityTag::Thermal];
    let report = detect(&snapshot);

    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].resource_id, "D1");
    assert!(report.mismatches[0].reason.contains("RGB capability"));
}

#[test]
fn test_mission_resources_round_trip() {
    let mut store = mapping_roster();
    dispatch(
        &mut store,
        Request::Assign {
            mission_id: "M1".to_string(),
            pilot_id: "P1".to_string(),
            drone_id: "D1".to_string(),
        },
        &config(),
    )
    .unwrap();

    let response = dispatch(
        &mut store,
        Request::MissionResources {
            mission_id: "M1".to_string(),
        },
        &config(),
    )
    .unwrap();
    let Response::Resources { mission, pilot, drone } = response else {
        panic!("expected resources");
    };
    assert_eq!(mission.id, "M1");
    assert_eq!(pilot.unwrap().id, "P1");
    assert_eq!(drone.unwrap().id, "D1");
}
