//! Standing conflict checks over a roster snapshot
//!
//! The detector is read-only. It runs as a standalone query and is also
//! consulted internally before a reassignment proposal is returned. It
//! reports two conflict families: double-bookings (a resource referenced by
//! more than one mission, or by missions with overlapping windows) and
//! capability mismatches (an active assignment that no longer passes the
//! eligibility rules, which signals a stale assignment or a roster edit
//! made after assignment).

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use skycoord_domain::{
    drone_qualifies, location_compatible, pilot_qualifies, required_capability,
    AvailabilityStatus, Mission,
};
use skycoord_roster::RosterSnapshot;

/// Which roster table a resource lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Pilot roster
    Pilot,
    /// Drone fleet
    Drone,
}

/// A resource claimed by more than one mission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleBooking {
    /// Conflicted resource
    pub resource_id: String,
    /// Pilot or drone
    pub resource_kind: ResourceKind,
    /// Missions claiming the resource
    pub mission_ids: Vec<String>,
    /// Whether the claiming missions' windows also overlap in time
    pub windows_overlap: bool,
}

/// An active assignment that fails the eligibility rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMismatch {
    /// Mission the resource references
    pub mission_id: String,
    /// Offending resource
    pub resource_id: String,
    /// Pilot or drone
    pub resource_kind: ResourceKind,
    /// What rule the assignment breaks
    pub reason: String,
}

/// Aggregated conflict report for a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Resources claimed by more than one mission
    pub double_bookings: Vec<DoubleBooking>,
    /// Assignments failing eligibility
    pub mismatches: Vec<CapabilityMismatch>,
}

impl ConflictReport {
    /// No conflicts found
    pub fn is_empty(&self) -> bool {
        self.double_bookings.is_empty() && self.mismatches.is_empty()
    }
}

fn referenced_missions<'a>(
    snapshot: &'a RosterSnapshot,
    assignment: Option<&str>,
) -> Vec<&'a Mission> {
    match assignment {
        Some(mission_id) => snapshot
            .missions
            .iter()
            .filter(|m| m.id == mission_id)
            .collect(),
        None => Vec::new(),
    }
}

fn windows_overlap(missions: &[&Mission]) -> bool {
    missions
        .iter()
        .enumerate()
        .any(|(i, a)| missions[i + 1..].iter().any(|b| a.window.overlaps(&b.window)))
}

/// Report every resource claimed by more than one mission
///
/// With id-referenced assignments this only happens when the mission table
/// itself carries duplicate ids (dirty external data); both claims are
/// reported, with the window overlap test applied across them.
pub fn find_double_bookings(snapshot: &RosterSnapshot) -> Vec<DoubleBooking> {
    let mut bookings = Vec::new();

    for p in &snapshot.pilots {
        let missions = referenced_missions(snapshot, p.current_assignment.as_deref());
        if missions.len() > 1 {
            bookings.push(DoubleBooking {
                resource_id: p.id.clone(),
                resource_kind: ResourceKind::Pilot,
                mission_ids: missions.iter().map(|m| m.id.clone()).collect(),
                windows_overlap: windows_overlap(&missions),
            });
        }
    }
    for d in &snapshot.drones {
        let missions = referenced_missions(snapshot, d.current_assignment.as_deref());
        if missions.len() > 1 {
            bookings.push(DoubleBooking {
                resource_id: d.id.clone(),
                resource_kind: ResourceKind::Drone,
                mission_ids: missions.iter().map(|m| m.id.clone()).collect(),
                windows_overlap: windows_overlap(&missions),
            });
        }
    }
    bookings
}

/// Re-run the eligibility rules over every active assignment
pub fn find_capability_mismatches(snapshot: &RosterSnapshot) -> Vec<CapabilityMismatch> {
    let mut mismatches = Vec::new();

    for p in &snapshot.pilots {
        let Some(mission_id) = p.current_assignment.as_deref() else {
            continue;
        };
        let Some(mission) = snapshot.mission(mission_id) else {
            mismatches.push(CapabilityMismatch {
                mission_id: mission_id.to_string(),
                resource_id: p.id.clone(),
                resource_kind: ResourceKind::Pilot,
                reason: format!("pilot {} is assigned to unknown mission {}", p.id, mission_id),
            });
            continue;
        };
        if p.status != AvailabilityStatus::Assigned {
            mismatches.push(CapabilityMismatch {
                mission_id: mission_id.to_string(),
                resource_id: p.id.clone(),
                resource_kind: ResourceKind::Pilot,
                reason: format!("pilot {} references {} but is not Assigned", p.id, mission_id),
            });
        }
        if !pilot_qualifies(p, mission) {
            let reason = if location_compatible(&p.location, &mission.location) {
                format!(
                    "pilot {} lacks a skill for {} mission {}",
                    p.id, mission.mission_type, mission_id
                )
            } else {
                format!("pilot {} location mismatch for {}", p.id, mission_id)
            };
            mismatches.push(CapabilityMismatch {
                mission_id: mission_id.to_string(),
                resource_id: p.id.clone(),
                resource_kind: ResourceKind::Pilot,
                reason,
            });
        }
    }

    for d in &snapshot.drones {
        let Some(mission_id) = d.current_assignment.as_deref() else {
            continue;
        };
        let Some(mission) = snapshot.mission(mission_id) else {
            mismatches.push(CapabilityMismatch {
                mission_id: mission_id.to_string(),
                resource_id: d.id.clone(),
                resource_kind: ResourceKind::Drone,
                reason: format!("drone {} is assigned to unknown mission {}", d.id, mission_id),
            });
            continue;
        };
        if d.status != AvailabilityStatus::Assigned {
            mismatches.push(CapabilityMismatch {
                mission_id: mission_id.to_string(),
                resource_id: d.id.clone(),
                resource_kind: ResourceKind::Drone,
                reason: format!("drone {} references {} but is not Assigned", d.id, mission_id),
            });
        }
        if !drone_qualifies(d, mission) {
            let reason = if location_compatible(&d.location, &mission.location) {
                format!(
                    "drone {} lacks {} capability for mission {}",
                    d.id,
                    required_capability(mission.mission_type),
                    mission_id
                )
            } else {
                format!("drone {} location mismatch for {}", d.id, mission_id)
            };
            mismatches.push(CapabilityMismatch {
                mission_id: mission_id.to_string(),
                resource_id: d.id.clone(),
                resource_kind: ResourceKind::Drone,
                reason,
            });
        }
    }

    mismatches
}

/// Full standing check: double-bookings plus capability mismatches
pub fn detect(snapshot: &RosterSnapshot) -> ConflictReport {
    ConflictReport {
        double_bookings: find_double_bookings(snapshot),
        mismatches: find_capability_mismatches(snapshot),
    }
}
