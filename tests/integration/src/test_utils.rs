//! Shared fixtures for the coordination engine integration tests

use chrono::NaiveDate;
use skycoord_core::MatchingConfig;
use skycoord_domain::{
    AvailabilityStatus, CapabilityTag, Drone, Mission, MissionStatus, MissionType, Pilot, Priority,
    SkillTag, TimeWindow,
};
use skycoord_roster::{RosterSnapshot, RosterStore};

/// A window in June 2025, days are 1-based
pub fn window(start_day: u32, end_day: u32) -> TimeWindow {
    TimeWindow::new(
        NaiveDate::from_ymd_opt(2025, 6, start_day).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, end_day).unwrap(),
    )
    .unwrap()
}

pub fn pilot(id: &str, skills: Vec<SkillTag>, location: &str) -> Pilot {
    Pilot {
        id: id.to_string(),
        name: format!("Pilot {}", id),
        location: location.to_string(),
        skills,
        status: AvailabilityStatus::Available,
        current_assignment: None,
    }
}

pub fn drone(id: &str, capabilities: Vec<CapabilityTag>, location: &str) -> Drone {
    Drone {
        id: id.to_string(),
        model: "QuadX".to_string(),
        location: location.to_string(),
        capabilities,
        status: AvailabilityStatus::Available,
        current_assignment: None,
    }
}

pub fn mission(
    id: &str,
    mission_type: MissionType,
    location: &str,
    priority: Priority,
) -> Mission {
    Mission {
        id: id.to_string(),
        mission_type,
        location: location.to_string(),
        window: window(1, 8),
        priority,
        status: MissionStatus::Unassigned,
    }
}

/// Link an existing pilot/drone/mission triple as an active assignment
pub fn link_assignment(snapshot: &mut RosterSnapshot, pilot_id: &str, drone_id: &str, mission_id: &str) {
    for p in snapshot.pilots.iter_mut().filter(|p| p.id == pilot_id) {
        p.status = AvailabilityStatus::Assigned;
        p.current_assignment = Some(mission_id.to_string());
    }
    for d in snapshot.drones.iter_mut().filter(|d| d.id == drone_id) {
        d.status = AvailabilityStatus::Assigned;
        d.current_assignment = Some(mission_id.to_string());
    }
    for m in snapshot.missions.iter_mut().filter(|m| m.id == mission_id) {
        m.status = MissionStatus::Assigned;
    }
}

/// One available mapping pair plus an open High mapping mission
pub fn mapping_roster() -> RosterStore {
    RosterStore::from_snapshot(RosterSnapshot {
        pilots: vec![pilot("P1", vec![SkillTag::Mapping], "Bangalore")],
        drones: vec![drone("D1", vec![CapabilityTag::Rgb], "Bangalore")],
        missions: vec![mission("M1", MissionType::Mapping, "Bangalore", Priority::High)],
    })
}

/// An Urgent thermal mission with the only thermal pair tied up on a
/// Standard mission
pub fn thermal_contention_roster() -> RosterStore {
    let mut snapshot = RosterSnapshot {
        pilots: vec![
            pilot("P1", vec![SkillTag::Thermal], "Bangalore"),
            pilot("P2", vec![SkillTag::Mapping], "Bangalore"),
        ],
        drones: vec![
            drone("D1", vec![CapabilityTag::Rgb], "Bangalore"),
            drone("D2", vec![CapabilityTag::Thermal], "Bangalore"),
        ],
        missions: vec![
            mission("M2", MissionType::Thermal, "Bangalore", Priority::Urgent),
            mission("M3", MissionType::Thermal, "Bangalore", Priority::Standard),
        ],
    };
    link_assignment(&mut snapshot, "P1", "D2", "M3");
    RosterStore::from_snapshot(snapshot)
}

pub fn config() -> MatchingConfig {
    MatchingConfig::default_config()
}
