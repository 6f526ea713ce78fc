//! Candidate search and assignment commit
//!
//! `find_candidates` is a pure query over a snapshot: filter to Available,
//! filter to eligible, then order by the configured tie-break precedence.
//! Identifier order is always the final comparison, so the output is
//! reproducible for a given snapshot. `assign` commits through the roster
//! store, which re-checks availability at commit time; a stale candidate
//! list surfaces as `AlreadyAssigned`, and the caller re-runs the search.

#![warn(missing_docs)]

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use skycoord_core::{MatchingConfig, TieBreak};
use skycoord_domain::{
    drone_has_exact_capability, is_eligible, pilot_has_exact_skill, Assignment, Drone, Mission,
    Pilot,
};
use skycoord_roster::{Applied, Mutation, RosterSnapshot, RosterStore};
use std::cmp::Ordering;
use tracing::debug;

/// An eligible pilot/drone pair for a mission, with its ranking facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePair {
    /// Eligible pilot
    pub pilot: Pilot,
    /// Eligible drone
    pub drone: Drone,
    /// Pilot and drone both sit exactly at the mission location
    pub location_match: bool,
    /// How many of the two resources hold exactly the required tag (0-2)
    pub specificity: u8,
}

impl CandidatePair {
    pub(crate) fn for_mission(pilot: &Pilot, drone: &Drone, mission: &Mission) -> Self {
        let location_match = pilot.location.eq_ignore_ascii_case(&mission.location)
            && drone.location.eq_ignore_ascii_case(&mission.location);
        let specificity = u8::from(pilot_has_exact_skill(pilot, mission))
            + u8::from(drone_has_exact_capability(drone, mission));
        Self {
            pilot: pilot.clone(),
            drone: drone.clone(),
            location_match,
            specificity,
        }
    }
}

/// Compare two candidates under one tie-break rule
fn compare_rule(a: &CandidatePair, b: &CandidatePair, rule: TieBreak) -> Ordering {
    match rule {
        // More desirable first: true before false, higher specificity first.
        TieBreak::LocationMatch => b.location_match.cmp(&a.location_match),
        TieBreak::Specificity => b.specificity.cmp(&a.specificity),
        TieBreak::IdentifierOrder => (&a.pilot.id, &a.drone.id).cmp(&(&b.pilot.id, &b.drone.id)),
    }
}

/// Compare two candidates by the configured precedence, then identifiers
pub(crate) fn compare_pairs(a: &CandidatePair, b: &CandidatePair, config: &MatchingConfig) -> Ordering {
    for rule in &config.tie_breaks {
        let ord = compare_rule(a, b, *rule);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    compare_rule(a, b, TieBreak::IdentifierOrder)
}

/// Order candidates by the configured precedence, then identifiers
pub(crate) fn rank(candidates: &mut [CandidatePair], config: &MatchingConfig) {
    candidates.sort_by(|a, b| compare_pairs(a, b, config));
}

/// Find every eligible, available pilot/drone pair for a mission, ranked
pub fn find_candidates(
    snapshot: &RosterSnapshot,
    mission_id: &str,
    config: &MatchingConfig,
) -> Result<Vec<CandidatePair>, EngineError> {
    let mission = snapshot
        .mission(mission_id)
        .ok_or_else(|| EngineError::UnknownMission(mission_id.to_string()))?;

    let mut candidates = Vec::new();
    for pilot in snapshot.pilots.iter().filter(|p| p.is_available()) {
        for drone in snapshot.drones.iter().filter(|d| d.is_available()) {
            if is_eligible(pilot, drone, mission) {
                candidates.push(CandidatePair::for_mission(pilot, drone, mission));
            }
        }
    }
    rank(&mut candidates, config);

    debug!(
        mission_id = %mission_id,
        candidates = candidates.len(),
        "candidate search finished"
    );
    Ok(candidates)
}

/// Commit a pilot/drone pair to a mission through the store
///
/// The store re-checks availability and eligibility inside `apply`; a pair
/// picked from a stale snapshot fails with `AlreadyAssigned` rather than
/// double-booking.
pub fn assign(
    store: &mut RosterStore,
    mission_id: &str,
    pilot_id: &str,
    drone_id: &str,
) -> Result<Assignment, EngineError> {
    let applied = store.apply(Mutation::Assign {
        mission_id: mission_id.to_string(),
        pilot_id: pilot_id.to_string(),
        drone_id: drone_id.to_string(),
    })?;
    match applied {
        Applied::Assigned(assignment) => Ok(assignment),
        _ => Err(EngineError::Store(
            skycoord_roster::StoreError::InvariantViolation(
                "assign mutation yielded an unexpected outcome".to_string(),
            ),
        )),
    }
}
