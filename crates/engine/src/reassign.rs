//! Priority-driven reassignment proposals
//!
//! When no free eligible pair exists for an Urgent or High mission, the
//! proposer searches active assignments of strictly lower priority for a
//! pair that could serve the blocked mission instead. The resulting
//! proposal carries an explicit priority trade-off and is never
//! auto-applied: committing it is a separate, explicit call, so a proposal
//! can be inspected, rejected, or re-evaluated without side effects.

#![warn(missing_docs)]

use crate::conflict;
use crate::error::EngineError;
use crate::matching::{compare_pairs, find_candidates, CandidatePair};
use serde::{Deserialize, Serialize};
use skycoord_core::MatchingConfig;
use skycoord_domain::{is_eligible, Assignment, Mission, Priority, ReassignmentProposal};
use skycoord_roster::{Applied, Mutation, RosterSnapshot, RosterStore, StoreError};
use tracing::{debug, info};

/// Outcome of asking how a blocked mission could be served
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReassignmentPlan {
    /// Free capacity exists after all; no preemption needed
    DirectAssignment(Vec<CandidatePair>),
    /// Preempt a lower-priority assignment
    Preempt(ReassignmentProposal),
}

struct Victim {
    mission: Mission,
    pair: CandidatePair,
    assignment: Assignment,
}

/// Plan how to serve a mission that has no free eligible pair
pub fn plan_reassignment(
    snapshot: &RosterSnapshot,
    mission_id: &str,
    config: &MatchingConfig,
) -> Result<ReassignmentPlan, EngineError> {
    let blocked = snapshot
        .mission(mission_id)
        .ok_or_else(|| EngineError::UnknownMission(mission_id.to_string()))?
        .clone();

    if blocked.priority < Priority::High {
        return Err(EngineError::PreemptionNotJustified {
            mission_id: mission_id.to_string(),
            priority: blocked.priority.to_string(),
        });
    }

    let free = find_candidates(snapshot, mission_id, config)?;
    if !free.is_empty() {
        return Ok(ReassignmentPlan::DirectAssignment(free));
    }

    // Only Standard and Low assignments may be preempted, and only by pairs
    // eligible for the blocked mission itself.
    let mut victims = Vec::new();
    for assignment in snapshot.active_assignments() {
        if assignment.mission_id == blocked.id {
            continue;
        }
        let Some(victim_mission) = snapshot.mission(&assignment.mission_id) else {
            continue;
        };
        if victim_mission.priority > Priority::Standard {
            continue;
        }
        let (Some(pilot), Some(drone)) = (
            snapshot.pilot(&assignment.pilot_id),
            snapshot.drone(&assignment.drone_id),
        ) else {
            continue;
        };
        if !is_eligible(pilot, drone, &blocked) {
            continue;
        }
        victims.push(Victim {
            mission: victim_mission.clone(),
            pair: CandidatePair::for_mission(pilot, drone, &blocked),
            assignment,
        });
    }

    victims.sort_by(|a, b| {
        a.mission
            .priority
            .cmp(&b.mission.priority)
            .then_with(|| compare_pairs(&a.pair, &b.pair, config))
            .then_with(|| a.mission.id.cmp(&b.mission.id))
    });

    for victim in victims {
        match validate_swap(snapshot, &victim, &blocked) {
            Ok(()) => {
                let rationale = format!(
                    "vacate {} mission {} to serve {} mission {}",
                    victim.mission.priority, victim.mission.id, blocked.priority, blocked.id
                );
                info!(
                    blocked_mission = %blocked.id,
                    vacate_mission = %victim.mission.id,
                    pilot_id = %victim.assignment.pilot_id,
                    drone_id = %victim.assignment.drone_id,
                    "reassignment proposed"
                );
                return Ok(ReassignmentPlan::Preempt(ReassignmentProposal {
                    vacate_mission_id: victim.mission.id,
                    pilot_id: victim.assignment.pilot_id,
                    drone_id: victim.assignment.drone_id,
                    serve_mission_id: blocked.id,
                    rationale,
                }));
            }
            Err(reason) => {
                debug!(
                    blocked_mission = %blocked.id,
                    vacate_mission = %victim.mission.id,
                    %reason,
                    "swap candidate rejected"
                );
            }
        }
    }

    Err(EngineError::NoEligibleOrReassignableResource(
        mission_id.to_string(),
    ))
}

/// Dry-run the swap on a scratch store and check the post-state with the
/// conflict detector before the proposal leaves the engine
fn validate_swap(
    snapshot: &RosterSnapshot,
    victim: &Victim,
    blocked: &Mission,
) -> Result<(), String> {
    let mut trial = RosterStore::from_snapshot(snapshot.clone());
    trial
        .apply(Mutation::Reassign {
            vacate_mission_id: victim.mission.id.clone(),
            mission_id: blocked.id.clone(),
            pilot_id: victim.assignment.pilot_id.clone(),
            drone_id: victim.assignment.drone_id.clone(),
        })
        .map_err(|e| e.to_string())?;

    let report = conflict::detect(&trial.snapshot());
    let touches_swap = |id: &str| {
        id == victim.assignment.pilot_id
            || id == victim.assignment.drone_id
            || id == victim.mission.id
            || id == blocked.id
    };
    if report
        .double_bookings
        .iter()
        .any(|b| touches_swap(&b.resource_id))
    {
        return Err("swap would double-book a resource".to_string());
    }
    if let Some(m) = report
        .mismatches
        .iter()
        .find(|m| touches_swap(&m.resource_id) || touches_swap(&m.mission_id))
    {
        return Err(format!("swap would leave a mismatch: {}", m.reason));
    }
    Ok(())
}

/// Commit a confirmed proposal through the store as one atomic step
///
/// Fails with `StaleProposal` if the roster moved since the proposal was
/// constructed, and with `AlreadyAssigned` if the blocked mission was
/// served some other way in the meantime.
pub fn commit_proposal(
    store: &mut RosterStore,
    proposal: &ReassignmentProposal,
) -> Result<Assignment, EngineError> {
    let applied = store.apply(Mutation::Reassign {
        vacate_mission_id: proposal.vacate_mission_id.clone(),
        mission_id: proposal.serve_mission_id.clone(),
        pilot_id: proposal.pilot_id.clone(),
        drone_id: proposal.drone_id.clone(),
    })?;
    match applied {
        Applied::Reassigned { assignment, .. } => Ok(assignment),
        _ => Err(EngineError::Store(StoreError::InvariantViolation(
            "reassign mutation yielded an unexpected outcome".to_string(),
        ))),
    }
}
