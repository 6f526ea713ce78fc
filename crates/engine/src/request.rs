//! Serialized request surface for the coordination engine
//!
//! One tagged `Request` enum covers every operation a coordination session
//! can perform, and `dispatch` routes it against the store. Read-only
//! requests run over a snapshot; mutating requests go through `apply` so
//! every precondition is re-checked at commit time.

#![warn(missing_docs)]

use crate::conflict::{detect, ConflictReport};
use crate::error::EngineError;
use crate::matching::{assign, find_candidates, CandidatePair};
use crate::reassign::{commit_proposal, plan_reassignment, ReassignmentPlan};
use serde::{Deserialize, Serialize};
use skycoord_core::MatchingConfig;
use skycoord_domain::{
    Assignment, AvailabilityStatus, CapabilityTag, Drone, Mission, Pilot, ReassignmentProposal,
    SkillTag,
};
use skycoord_roster::{Applied, Mutation, NewDrone, NewMission, NewPilot, RosterStore};
use tracing::debug;

/// A coordination request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Ranked eligible pairs for a mission
    FindCandidates {
        /// Mission to staff
        mission_id: String,
    },
    /// Commit a pilot/drone pair to a mission
    Assign {
        /// Mission to serve
        mission_id: String,
        /// Pilot to commit
        pilot_id: String,
        /// Drone to commit
        drone_id: String,
    },
    /// Vacate a mission
    Unassign {
        /// Mission to vacate
        mission_id: String,
    },
    /// Standing conflict report over the whole roster
    ListConflicts,
    /// Plan how a blocked High or Urgent mission could be served
    ProposeReassignment {
        /// Blocked mission
        mission_id: String,
    },
    /// Commit a previously returned proposal
    CommitProposal {
        /// The proposal, exactly as returned
        proposal: ReassignmentProposal,
    },
    /// Pilots matching optional filters
    ListPilots {
        /// Required skill tag
        #[serde(default)]
        skill: Option<SkillTag>,
        /// Required home location
        #[serde(default)]
        location: Option<String>,
        /// Only Available pilots
        #[serde(default)]
        available_only: bool,
    },
    /// Drones matching optional filters
    ListDrones {
        /// Required capability tag
        #[serde(default)]
        capability: Option<CapabilityTag>,
        /// Required home location
        #[serde(default)]
        location: Option<String>,
        /// Only Available drones
        #[serde(default)]
        available_only: bool,
    },
    /// The pilot and drone currently serving a mission
    MissionResources {
        /// Mission to inspect
        mission_id: String,
    },
    /// Update a pilot's availability
    SetPilotStatus {
        /// Pilot to update
        pilot_id: String,
        /// New status
        status: AvailabilityStatus,
    },
    /// Update a drone's availability
    SetDroneStatus {
        /// Drone to update
        drone_id: String,
        /// New status
        status: AvailabilityStatus,
    },
    /// Register a new pilot
    AddPilot {
        /// Pilot fields; the id is allocated by the store
        pilot: NewPilot,
    },
    /// Register a new drone
    AddDrone {
        /// Drone fields; the id is allocated by the store
        drone: NewDrone,
    },
    /// Register a new mission
    AddMission {
        /// Mission fields; the id is allocated by the store
        mission: NewMission,
    },
}

impl Request {
    /// Whether dispatching this request can change the roster
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Request::Assign { .. }
                | Request::Unassign { .. }
                | Request::CommitProposal { .. }
                | Request::SetPilotStatus { .. }
                | Request::SetDroneStatus { .. }
                | Request::AddPilot { .. }
                | Request::AddDrone { .. }
                | Request::AddMission { .. }
        )
    }
}

/// Result of a dispatched request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Response {
    /// Ranked candidates for `FindCandidates`
    Candidates {
        /// Eligible pairs, best first
        candidates: Vec<CandidatePair>,
    },
    /// Committed assignment for `Assign`
    Assigned {
        /// The committed assignment
        assignment: Assignment,
    },
    /// Vacated mission for `Unassign`
    Unassigned {
        /// The vacated mission
        mission_id: String,
    },
    /// Report for `ListConflicts`
    Conflicts {
        /// Double-bookings and capability mismatches
        report: ConflictReport,
    },
    /// Plan for `ProposeReassignment`
    Plan {
        /// Direct assignment or preemption proposal
        plan: ReassignmentPlan,
    },
    /// Committed swap for `CommitProposal`
    Reassigned {
        /// Mission freed by the swap
        vacated_mission_id: String,
        /// The new assignment
        assignment: Assignment,
    },
    /// Pilot listing
    Pilots {
        /// Matching pilots
        pilots: Vec<Pilot>,
    },
    /// Drone listing
    Drones {
        /// Matching drones
        drones: Vec<Drone>,
    },
    /// Resources serving a mission, if any
    Resources {
        /// The mission
        mission: Mission,
        /// Assigned pilot, when the mission is served
        pilot: Option<Pilot>,
        /// Assigned drone, when the mission is served
        drone: Option<Drone>,
    },
    /// Status update outcome
    StatusSet {
        /// Updated resource
        resource_id: String,
        /// New status
        status: AvailabilityStatus,
        /// Mission vacated as a side effect, if any
        vacated_mission_id: Option<String>,
    },
    /// Entity registered
    Added {
        /// Allocated id
        id: String,
    },
}

/// Route a request against the store
pub fn dispatch(
    store: &mut RosterStore,
    request: Request,
    config: &MatchingConfig,
) -> Result<Response, EngineError> {
    debug!(request = ?request, "dispatching");
    match request {
        Request::FindCandidates { mission_id } => {
            let candidates = find_candidates(&store.snapshot(), &mission_id, config)?;
            Ok(Response::Candidates { candidates })
        }
        Request::Assign {
            mission_id,
            pilot_id,
            drone_id,
        } => {
            let assignment = assign(store, &mission_id, &pilot_id, &drone_id)?;
            Ok(Response::Assigned { assignment })
        }
        Request::Unassign { mission_id } => {
            store.apply(Mutation::Unassign {
                mission_id: mission_id.clone(),
            })?;
            Ok(Response::Unassigned { mission_id })
        }
        Request::ListConflicts => Ok(Response::Conflicts {
            report: detect(&store.snapshot()),
        }),
        Request::ProposeReassignment { mission_id } => {
            let plan = plan_reassignment(&store.snapshot(), &mission_id, config)?;
            Ok(Response::Plan { plan })
        }
        Request::CommitProposal { proposal } => {
            let assignment = commit_proposal(store, &proposal)?;
            Ok(Response::Reassigned {
                vacated_mission_id: proposal.vacate_mission_id,
                assignment,
            })
        }
        Request::ListPilots {
            skill,
            location,
            available_only,
        } => {
            let snapshot = store.snapshot();
            let pilots = snapshot
                .filter_pilots(skill, location.as_deref(), available_only)
                .into_iter()
                .cloned()
                .collect();
            Ok(Response::Pilots { pilots })
        }
        Request::ListDrones {
            capability,
            location,
            available_only,
        } => {
            let snapshot = store.snapshot();
            let drones = snapshot
                .filter_drones(capability, location.as_deref(), available_only)
                .into_iter()
                .cloned()
                .collect();
            Ok(Response::Drones { drones })
        }
        Request::MissionResources { mission_id } => {
            let snapshot = store.snapshot();
            let mission = snapshot
                .mission(&mission_id)
                .ok_or_else(|| EngineError::UnknownMission(mission_id.clone()))?
                .clone();
            let assignment = snapshot.assignment_for(&mission_id);
            let pilot = assignment
                .as_ref()
                .and_then(|a| snapshot.pilot(&a.pilot_id))
                .cloned();
            let drone = assignment
                .as_ref()
                .and_then(|a| snapshot.drone(&a.drone_id))
                .cloned();
            Ok(Response::Resources {
                mission,
                pilot,
                drone,
            })
        }
        Request::SetPilotStatus { pilot_id, status } => {
            status_response(store.apply(Mutation::SetPilotStatus { pilot_id, status })?)
        }
        Request::SetDroneStatus { drone_id, status } => {
            status_response(store.apply(Mutation::SetDroneStatus { drone_id, status })?)
        }
        Request::AddPilot { pilot } => added_response(store.apply(Mutation::AddPilot(pilot))?),
        Request::AddDrone { drone } => added_response(store.apply(Mutation::AddDrone(drone))?),
        Request::AddMission { mission } => {
            added_response(store.apply(Mutation::AddMission(mission))?)
        }
    }
}

fn status_response(applied: Applied) -> Result<Response, EngineError> {
    match applied {
        Applied::StatusSet {
            resource_id,
            status,
            vacated_mission_id,
        } => Ok(Response::StatusSet {
            resource_id,
            status,
            vacated_mission_id,
        }),
        _ => Err(unexpected_outcome()),
    }
}

fn added_response(applied: Applied) -> Result<Response, EngineError> {
    match applied {
        Applied::Added { id } => Ok(Response::Added { id }),
        _ => Err(unexpected_outcome()),
    }
}

fn unexpected_outcome() -> EngineError {
    EngineError::Store(skycoord_roster::StoreError::InvariantViolation(
        "mutation yielded an unexpected outcome".to_string(),
    ))
}
