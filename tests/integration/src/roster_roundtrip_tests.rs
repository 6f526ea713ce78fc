//! Ingest a dirty legacy export, coordinate against it, and write the
//! committed state back through the full tabular pipeline

use crate::test_utils::config;
use skycoord_engine::{detect, dispatch, Request};
use skycoord_roster::{
    load_drones, load_missions, load_pilots, write_roster, RosterSnapshot, RosterStore,
};

const PILOTS: &str = "\
id,name,location,skills,status,current_assignment
P001,Asha,Bangalore,\"Mapping, Survey\",Available,-
P002,Ravi,Bangalore,Thermal,Available,\u{2013}
,Ghost,Delhi,Mapping,Available,-
P003,Kiran,Pune,Inspection,On Leave,-
";

const DRONES: &str = "\
id,model,capabilities,location,status,current_assignment
D001,QuadX,RGB,Bangalore,Available,
D002,HexaTherm,Thermal,Bangalore,Available,-
D003,FixedWing,Sonar,Mumbai,Available,-
";

const MISSIONS: &str = "\
id,type,location,start,end,priority,status
PRJ001,Mapping,Bangalore,2025-06-01,2025-06-05,High,Unassigned
PRJ002,Thermal,Bangalore,2025-06-03,2025-06-09,Urgent,Unassigned
PRJ003,Survey,Pune,2025-06-10,2025-06-01,Low,Unassigned
";

fn load_dirty_export(dir: &std::path::Path) -> (RosterStore, usize) {
    std::fs::write(dir.join("pilots.csv"), PILOTS).unwrap();
    std::fs::write(dir.join("drones.csv"), DRONES).unwrap();
    std::fs::write(dir.join("missions.csv"), MISSIONS).unwrap();

    let (pilots, p_errs) = load_pilots(dir.join("pilots.csv")).unwrap();
    let (drones, d_errs) = load_drones(dir.join("drones.csv")).unwrap();
    let (missions, m_errs) = load_missions(dir.join("missions.csv")).unwrap();
    let skipped = p_errs.len() + d_errs.len() + m_errs.len();

    (
        RosterStore::from_snapshot(RosterSnapshot {
            pilots,
            drones,
            missions,
        }),
        skipped,
    )
}

#[test]
fn test_dirty_export_loads_with_row_recovery() {
    let _ = tracing_subscriber::fmt::try_init();
    let dir = tempfile::tempdir().unwrap();
    let (store, skipped) = load_dirty_export(dir.path());

    // One pilot row without an id, one drone with an unknown capability,
    // one mission with an inverted window.
    assert_eq!(skipped, 3);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.pilots.len(), 3);
    assert_eq!(snapshot.drones.len(), 2);
    assert_eq!(snapshot.missions.len(), 2);
    assert!(detect(&snapshot).is_empty());
}

#[test]
fn test_coordinate_and_write_back_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = load_dirty_export(dir.path());

    // Serve both open missions from the surviving roster.
    dispatch(
        &mut store,
        Request::Assign {
            mission_id: "PRJ001".to_string(),
            pilot_id: "P001".to_string(),
            drone_id: "D001".to_string(),
        },
        &config(),
    )
    .unwrap();
    dispatch(
        &mut store,
        Request::Assign {
            mission_id: "PRJ002".to_string(),
            pilot_id: "P002".to_string(),
            drone_id: "D002".to_string(),
        },
        &config(),
    )
    .unwrap();

    let committed = store.snapshot();
    write_roster(
        &committed,
        dir.path().join("pilots.csv"),
        dir.path().join("drones.csv"),
        dir.path().join("missions.csv"),
    )
    .unwrap();

    // A fresh session over the written files sees the same state, clean.
    let (reloaded, skipped) = load_dirty_export_from_written(dir.path());
    assert_eq!(skipped, 0);
    assert_eq!(reloaded.snapshot(), committed);
    assert!(detect(&reloaded.snapshot()).is_empty());
}

fn load_dirty_export_from_written(dir: &std::path::Path) -> (RosterStore, usize) {
    let (pilots, p_errs) = load_pilots(dir.join("pilots.csv")).unwrap();
    let (drones, d_errs) = load_drones(dir.join("drones.csv")).unwrap();
    let (missions, m_errs) = load_missions(dir.join("missions.csv")).unwrap();
    let skipped = p_errs.len() + d_errs.len() + m_errs.len();
    (
        RosterStore::from_snapshot(RosterSnapshot {
            pilots,
            drones,
            missions,
        }),
        skipped,
    )
}

#[test]
fn test_added_entities_survive_write_back() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = load_dirty_export(dir.path());

    let response = dispatch(
        &mut store,
        Request::AddPilot {
            pilot: skycoord_roster::NewPilot {
                name: "Meera".to_string(),
                location: "Mumbai".to_string(),
                skills: vec![skycoord_domain::SkillTag::Survey],
            },
        },
        &config(),
    )
    .unwrap();
    assert_eq!(
        response,
        skycoord_engine::Response::Added {
            id: "P004".to_string()
        }
    );

    write_roster(
        &store.snapshot(),
        dir.path().join("pilots.csv"),
        dir.path().join("drones.csv"),
        dir.path().join("missions.csv"),
    )
    .unwrap();

    let (pilots, errs) = load_pilots(dir.path().join("pilots.csv")).unwrap();
    assert!(errs.is_empty());
    assert!(pilots.iter().any(|p| p.id == "P004" && p.name == "Meera"));
}
