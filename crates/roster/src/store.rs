//! Single-writer roster store with atomic, invariant-checked mutations
//!
//! `apply` builds the post-state on a scratch copy, re-checks every
//! precondition at commit time (candidate lists are snapshot views and may
//! be stale), validates the roster invariants, and only then swaps the new
//! state in. A failed mutation leaves the store exactly as it was.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use skycoord_domain::{
    is_eligible, Assignment, AvailabilityStatus, CapabilityTag, Drone, Mission, MissionStatus,
    MissionType, Pilot, Priority, SkillTag, TimeWindow,
};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::info;

/// Store mutation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Pilot id not present in the roster
    #[error("Unknown pilot: {0}")]
    UnknownPilot(String),

    /// Drone id not present in the roster
    #[error("Unknown drone: {0}")]
    UnknownDrone(String),

    /// Mission id not present in the roster
    #[error("Unknown mission: {0}")]
    UnknownMission(String),

    /// Resource availability changed between snapshot and commit
    #[error("Resource {resource_id} is no longer available for mission {mission_id}")]
    AlreadyAssigned {
        /// Resource that lost the race
        resource_id: String,
        /// Mission the caller tried to serve
        mission_id: String,
    },

    /// Mission is not open for assignment
    #[error("Mission {0} is not open for assignment")]
    MissionClosed(String),

    /// Pair fails the eligibility rules for the mission
    #[error("Pilot {pilot_id} / drone {drone_id} pair is not eligible for mission {mission_id}")]
    NotEligible {
        /// Pilot in the rejected pair
        pilot_id: String,
        /// Drone in the rejected pair
        drone_id: String,
        /// Mission the pair was proposed for
        mission_id: String,
    },

    /// Mission has no active assignment to vacate
    #[error("Mission {0} has no active assignment")]
    NotAssigned(String),

    /// Proposal no longer matches the roster state
    #[error("Stale proposal: {0}")]
    StaleProposal(String),

    /// Post-mutation state would break a roster invariant
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Immutable point-in-time view of the roster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// All pilots
    pub pilots: Vec<Pilot>,
    /// All drones
    pub drones: Vec<Drone>,
    /// All missions
    pub missions: Vec<Mission>,
}

impl RosterSnapshot {
    /// Look up a pilot by id
    pub fn pilot(&self, id: &str) -> Option<&Pilot> {
        self.pilots.iter().find(|p| p.id == id)
    }

    /// Look up a drone by id
    pub fn drone(&self, id: &str) -> Option<&Drone> {
        self.drones.iter().find(|d| d.id == id)
    }

    /// Look up a mission by id
    pub fn mission(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.id == id)
    }

    /// Derive the assignment serving a mission, if the reciprocal pilot and
    /// drone references both exist
    pub fn assignment_for(&self, mission_id: &str) -> Option<Assignment> {
        let pilot = self
            .pilots
            .iter()
            .find(|p| p.current_assignment.as_deref() == Some(mission_id))?;
        let drone = self
            .drones
            .iter()
            .find(|d| d.current_assignment.as_deref() == Some(mission_id))?;
        Some(Assignment {
            pilot_id: pilot.id.clone(),
            drone_id: drone.id.clone(),
            mission_id: mission_id.to_string(),
        })
    }

    /// All derived assignments in the snapshot, in mission order
    pub fn active_assignments(&self) -> Vec<Assignment> {
        self.missions
            .iter()
            .filter_map(|m| self.assignment_for(&m.id))
            .collect()
    }

    /// Pilots matching optional skill/location filters
    pub fn filter_pilots(
        &self,
        skill: Option<SkillTag>,
        location: Option<&str>,
        available_only: bool,
    ) -> Vec<&Pilot> {
        self.pilots
            .iter()
            .filter(|p| !available_only || p.is_available())
            .filter(|p| skill.is_none_or(|s| p.skills.contains(&s)))
            .filter(|p| location.is_none_or(|l| p.location.eq_ignore_ascii_case(l)))
            .collect()
    }

    /// Drones matching optional capability/location filters
    pub fn filter_drones(
        &self,
        capability: Option<CapabilityTag>,
        location: Option<&str>,
        available_only: bool,
    ) -> Vec<&Drone> {
        self.drones
            .iter()
            .filter(|d| !available_only || d.is_available())
            .filter(|d| capability.is_none_or(|c| d.capabilities.contains(&c)))
            .filter(|d| location.is_none_or(|l| d.location.eq_ignore_ascii_case(l)))
            .collect()
    }
}

/// Fields for a pilot added at runtime; the store allocates the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPilot {
    /// Display name
    pub name: String,
    /// Home location
    pub location: String,
    /// Skill tags
    pub skills: Vec<SkillTag>,
}

/// Fields for a drone added at runtime; the store allocates the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDrone {
    /// Airframe model
    pub model: String,
    /// Home location
    pub location: String,
    /// Sensor capabilities
    pub capabilities: Vec<CapabilityTag>,
}

/// Fields for a mission added at runtime; the store allocates the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMission {
    /// Mission type
    pub mission_type: MissionType,
    /// Operating location
    pub location: String,
    /// Scheduled window
    pub window: TimeWindow,
    /// Priority
    pub priority: Priority,
}

/// Atomic roster mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    /// Assign a pilot/drone pair to an open mission
    Assign {
        /// Mission to serve
        mission_id: String,
        /// Pilot to commit
        pilot_id: String,
        /// Drone to commit
        drone_id: String,
    },
    /// Vacate a mission, freeing its pilot and drone
    Unassign {
        /// Mission to vacate
        mission_id: String,
    },
    /// Vacate one mission and serve another with the freed pair, as one step
    Reassign {
        /// Mission to vacate
        vacate_mission_id: String,
        /// Mission to serve with the freed resources
        mission_id: String,
        /// Pilot expected to be freed
        pilot_id: String,
        /// Drone expected to be freed
        drone_id: String,
    },
    /// Set a pilot's availability; vacates their mission if one is active
    SetPilotStatus {
        /// Pilot to update
        pilot_id: String,
        /// New status (Assigned is owned by the engine and rejected here)
        status: AvailabilityStatus,
    },
    /// Set a drone's availability; vacates its mission if one is active
    SetDroneStatus {
        /// Drone to update
        drone_id: String,
        /// New status (Assigned is owned by the engine and rejected here)
        status: AvailabilityStatus,
    },
    /// Add a pilot with a freshly allocated P-series id
    AddPilot(NewPilot),
    /// Add a drone with a freshly allocated D-series id
    AddDrone(NewDrone),
    /// Add a mission with a freshly allocated PRJ-series id
    AddMission(NewMission),
}

/// Outcome of a committed mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Applied {
    /// Pair committed to a mission
    Assigned(Assignment),
    /// Mission vacated
    Unassigned {
        /// Vacated mission
        mission_id: String,
    },
    /// Mission vacated and another served in one step
    Reassigned {
        /// Vacated mission
        vacated_mission_id: String,
        /// New assignment
        assignment: Assignment,
    },
    /// Availability updated
    StatusSet {
        /// Updated resource
        resource_id: String,
        /// New status
        status: AvailabilityStatus,
        /// Mission vacated as a side effect, if any
        vacated_mission_id: Option<String>,
    },
    /// Entity added
    Added {
        /// Allocated id
        id: String,
    },
}

/// Single writer for the roster during a coordination session
#[derive(Debug, Default)]
pub struct RosterStore {
    state: RosterSnapshot,
}

impl RosterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from a freshly pulled snapshot
    ///
    /// The seed is accepted as-is; the conflict detector is the tool for
    /// reporting pre-existing inconsistencies in external data.
    pub fn from_snapshot(snapshot: RosterSnapshot) -> Self {
        Self { state: snapshot }
    }

    /// Immutable point-in-time view of the roster
    pub fn snapshot(&self) -> RosterSnapshot {
        self.state.clone()
    }

    /// Apply a mutation atomically
    ///
    /// Preconditions are re-checked against the current state, not trusted
    /// from any earlier snapshot, and the roster invariants are validated on
    /// the post-state before commit. On error the store is unchanged.
    pub fn apply(&mut self, mutation: Mutation) -> Result<Applied, StoreError> {
        let mut next = self.state.clone();
        let applied = match mutation {
            Mutation::Assign {
                mission_id,
                pilot_id,
                drone_id,
            } => Applied::Assigned(Self::do_assign(&mut next, &mission_id, &pilot_id, &drone_id)?),
            Mutation::Unassign { mission_id } => {
                let assignment = Self::vacate(&mut next, &mission_id)?;
                info!(mission_id = %mission_id, pilot_id = %assignment.pilot_id,
                      drone_id = %assignment.drone_id, "mission vacated");
                Applied::Unassigned { mission_id }
            }
            Mutation::Reassign {
                vacate_mission_id,
                mission_id,
                pilot_id,
                drone_id,
            } => {
                let freed = Self::vacate(&mut next, &vacate_mission_id)?;
                if freed.pilot_id != pilot_id || freed.drone_id != drone_id {
                    return Err(StoreError::StaleProposal(format!(
                        "mission {} is served by {}/{}, not {}/{}",
                        vacate_mission_id, freed.pilot_id, freed.drone_id, pilot_id, drone_id
                    )));
                }
                let assignment = Self::do_assign(&mut next, &mission_id, &pilot_id, &drone_id)?;
                Applied::Reassigned {
                    vacated_mission_id: vacate_mission_id,
                    assignment,
                }
            }
            Mutation::SetPilotStatus { pilot_id, status } => {
                Self::set_pilot_status(&mut next, &pilot_id, status)?
            }
            Mutation::SetDroneStatus { drone_id, status } => {
                Self::set_drone_status(&mut next, &drone_id, status)?
            }
            Mutation::AddPilot(new) => {
                let id = next_id("P", next.pilots.iter().map(|p| p.id.as_str()));
                next.pilots.push(Pilot {
                    id: id.clone(),
                    name: new.name,
                    location: new.location,
                    skills: new.skills,
                    status: AvailabilityStatus::Available,
                    current_assignment: None,
                });
                Applied::Added { id }
            }
            Mutation::AddDrone(new) => {
                let id = next_id("D", next.drones.iter().map(|d| d.id.as_str()));
                next.drones.push(Drone {
                    id: id.clone(),
                    model: new.model,
                    location: new.location,
                    capabilities: new.capabilities,
                    status: AvailabilityStatus::Available,
                    current_assignment: None,
                });
                Applied::Added { id }
            }
            Mutation::AddMission(new) => {
                let id = next_id("PRJ", next.missions.iter().map(|m| m.id.as_str()));
                next.missions.push(Mission {
                    id: id.clone(),
                    mission_type: new.mission_type,
                    location: new.location,
                    window: new.window,
                    priority: new.priority,
                    status: MissionStatus::Unassigned,
                });
                Applied::Added { id }
            }
        };

        validate(&next)?;
        self.state = next;
        Ok(applied)
    }

    fn do_assign(
        next: &mut RosterSnapshot,
        mission_id: &str,
        pilot_id: &str,
        drone_id: &str,
    ) -> Result<Assignment, StoreError> {
        let mission = next
            .mission(mission_id)
            .ok_or_else(|| StoreError::UnknownMission(mission_id.to_string()))?
            .clone();
        if !mission.is_open() {
            return Err(StoreError::MissionClosed(mission_id.to_string()));
        }

        let pilot = next
            .pilot(pilot_id)
            .ok_or_else(|| StoreError::UnknownPilot(pilot_id.to_string()))?;
        if !pilot.is_available() {
            return Err(StoreError::AlreadyAssigned {
                resource_id: pilot_id.to_string(),
                mission_id: mission_id.to_string(),
            });
        }
        let drone = next
            .drone(drone_id)
            .ok_or_else(|| StoreError::UnknownDrone(drone_id.to_string()))?;
        if !drone.is_available() {
            return Err(StoreError::AlreadyAssigned {
                resource_id: drone_id.to_string(),
                mission_id: mission_id.to_string(),
            });
        }

        if !is_eligible(pilot, drone, &mission) {
            return Err(StoreError::NotEligible {
                pilot_id: pilot_id.to_string(),
                drone_id: drone_id.to_string(),
                mission_id: mission_id.to_string(),
            });
        }

        for p in next.pilots.iter_mut().filter(|p| p.id == pilot_id) {
            p.status = AvailabilityStatus::Assigned;
            p.current_assignment = Some(mission_id.to_string());
        }
        for d in next.drones.iter_mut().filter(|d| d.id == drone_id) {
            d.status = AvailabilityStatus::Assigned;
            d.current_assignment = Some(mission_id.to_string());
        }
        for m in next.missions.iter_mut().filter(|m| m.id == mission_id) {
            m.status = MissionStatus::Assigned;
        }

        info!(mission_id = %mission_id, pilot_id = %pilot_id, drone_id = %drone_id,
              "assignment committed");
        Ok(Assignment {
            pilot_id: pilot_id.to_string(),
            drone_id: drone_id.to_string(),
            mission_id: mission_id.to_string(),
        })
    }

    /// Free a mission's pilot and drone and reopen the mission
    fn vacate(next: &mut RosterSnapshot, mission_id: &str) -> Result<Assignment, StoreError> {
        if next.mission(mission_id).is_none() {
            return Err(StoreError::UnknownMission(mission_id.to_string()));
        }
        let assignment = next
            .assignment_for(mission_id)
            .ok_or_else(|| StoreError::NotAssigned(mission_id.to_string()))?;

        for p in next
            .pilots
            .iter_mut()
            .filter(|p| p.current_assignment.as_deref() == Some(mission_id))
        {
            p.status = AvailabilityStatus::Available;
            p.current_assignment = None;
        }
        for d in next
            .drones
            .iter_mut()
            .filter(|d| d.current_assignment.as_deref() == Some(mission_id))
        {
            d.status = AvailabilityStatus::Available;
            d.current_assignment = None;
        }
        for m in next.missions.iter_mut().filter(|m| m.id == mission_id) {
            m.status = MissionStatus::Unassigned;
        }
        Ok(assignment)
    }

    fn set_pilot_status(
        next: &mut RosterSnapshot,
        pilot_id: &str,
        status: AvailabilityStatus,
    ) -> Result<Applied, StoreError> {
        if status == AvailabilityStatus::Assigned {
            return Err(StoreError::InvariantViolation(
                "Assigned status is set by assignment mutations only".to_string(),
            ));
        }
        let pilot = next
            .pilot(pilot_id)
            .ok_or_else(|| StoreError::UnknownPilot(pilot_id.to_string()))?;

        // Pulling an assigned pilot vacates the whole mission: reciprocity
        // forbids leaving the drone referencing it alone.
        let vacated = match pilot.current_assignment.clone() {
            Some(mission_id) => {
                Self::vacate(next, &mission_id)?;
                Some(mission_id)
            }
            None => None,
        };

        for p in next.pilots.iter_mut().filter(|p| p.id == pilot_id) {
            p.status = status;
        }
        Ok(Applied::StatusSet {
            resource_id: pilot_id.to_string(),
            status,
            vacated_mission_id: vacated,
        })
    }

    fn set_drone_status(
        next: &mut RosterSnapshot,
        drone_id: &str,
        status: AvailabilityStatus,
    ) -> Result<Applied, StoreError> {
        if status == AvailabilityStatus::Assigned {
            return Err(StoreError::InvariantViolation(
                "Assigned status is set by assignment mutations only".to_string(),
            ));
        }
        let drone = next
            .drone(drone_id)
            .ok_or_else(|| StoreError::UnknownDrone(drone_id.to_string()))?;

        let vacated = match drone.current_assignment.clone() {
            Some(mission_id) => {
                Self::vacate(next, &mission_id)?;
                Some(mission_id)
            }
            None => None,
        };

        for d in next.drones.iter_mut().filter(|d| d.id == drone_id) {
            d.status = status;
        }
        Ok(Applied::StatusSet {
            resource_id: drone_id.to_string(),
            status,
            vacated_mission_id: vacated,
        })
    }
}

/// Allocate the next zero-padded id for a prefix, e.g. P007 or PRJ012
fn next_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let max = existing
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|rest| rest.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:03}", prefix, max + 1)
}

/// Validate the structural roster invariants on a post-mutation state
///
/// Checks: unique ids; an Available resource holds no assignment and an
/// assignment reference implies Assigned status; every referenced mission
/// exists, is Assigned, and is referenced by exactly one pilot and one
/// drone; every Assigned mission has its reciprocal pair.
pub fn validate(snapshot: &RosterSnapshot) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for id in snapshot
        .pilots
        .iter()
        .map(|p| &p.id)
        .chain(snapshot.drones.iter().map(|d| &d.id))
        .chain(snapshot.missions.iter().map(|m| &m.id))
    {
        if !seen.insert(id.clone()) {
            return Err(StoreError::InvariantViolation(format!(
                "duplicate id {} in roster",
                id
            )));
        }
    }

    let missions: HashMap<&str, &Mission> = snapshot
        .missions
        .iter()
        .map(|m| (m.id.as_str(), m))
        .collect();

    let mut pilot_refs: HashMap<&str, Vec<&str>> = HashMap::new();
    for p in &snapshot.pilots {
        match (&p.current_assignment, p.status) {
            (Some(_), AvailabilityStatus::Available) => {
                return Err(StoreError::InvariantViolation(format!(
                    "pilot {} is Available but holds an assignment",
                    p.id
                )));
            }
            (Some(m), _) => pilot_refs.entry(m.as_str()).or_default().push(&p.id),
            (None, _) => {}
        }
        if p.status == AvailabilityStatus::Assigned && p.current_assignment.is_none() {
            return Err(StoreError::InvariantViolation(format!(
                "pilot {} is Assigned but references no mission",
                p.id
            )));
        }
    }

    let mut drone_refs: HashMap<&str, Vec<&str>> = HashMap::new();
    for d in &snapshot.drones {
        match (&d.current_assignment, d.status) {
            (Some(_), AvailabilityStatus::Available) => {
                return Err(StoreError::InvariantViolation(format!(
                    "drone {} is Available but holds an assignment",
                    d.id
                )));
            }
            (Some(m), _) => drone_refs.entry(m.as_str()).or_default().push(&d.id),
            (None, _) => {}
        }
        if d.status == AvailabilityStatus::Assigned && d.current_assignment.is_none() {
            return Err(StoreError::InvariantViolation(format!(
                "drone {} is Assigned but references no mission",
                d.id
            )));
        }
    }

    for (mission_id, pilots) in &pilot_refs {
        let Some(mission) = missions.get(mission_id) else {
            return Err(StoreError::InvariantViolation(format!(
                "pilot {} references unknown mission {}",
                pilots[0], mission_id
            )));
        };
        if pilots.len() > 1 {
            return Err(StoreError::InvariantViolation(format!(
                "mission {} is referenced by {} pilots",
                mission_id,
                pilots.len()
            )));
        }
        if mission.status != MissionStatus::Assigned {
            return Err(StoreError::InvariantViolation(format!(
                "mission {} is referenced but not Assigned",
                mission_id
            )));
        }
        if !drone_refs.contains_key(mission_id) {
            return Err(StoreError::InvariantViolation(format!(
                "mission {} has a pilot but no reciprocal drone",
                mission_id
            )));
        }
    }

    for (mission_id, drones) in &drone_refs {
        if !missions.contains_key(mission_id) {
            return Err(StoreError::InvariantViolation(format!(
                "drone {} references unknown mission {}",
                drones[0], mission_id
            )));
        }
        if drones.len() > 1 {
            return Err(StoreError::InvariantViolation(format!(
                "mission {} is referenced by {} drones",
                mission_id,
                drones.len()
            )));
        }
        if !pilot_refs.contains_key(mission_id) {
            return Err(StoreError::InvariantViolation(format!(
                "mission {} has a drone but no reciprocal pilot",
                mission_id
            )));
        }
    }

    for m in &snapshot.missions {
        if m.status == MissionStatus::Assigned
            && (!pilot_refs.contains_key(m.id.as_str()) || !drone_refs.contains_key(m.id.as_str()))
        {
            return Err(StoreError::InvariantViolation(format!(
                "mission {} is Assigned but lacks a full pilot/drone pair",
                m.id
            )));
        }
    }

    Ok(())
}
