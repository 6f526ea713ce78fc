//! Eligibility rules mapping mission requirements to resource predicates
//!
//! The mission-type to capability mapping is a fixed lookup table, applied
//! to drone capabilities directly and to pilot skills through the same
//! table. Location compatibility is exact match, no distance scoring, so a
//! result is always explainable from the roster data alone.

#![warn(missing_docs)]

use crate::model::{CapabilityTag, Drone, Mission, MissionType, Pilot, SkillTag};

/// Capability a mission type requires from its drone
pub fn required_capability(mission_type: MissionType) -> CapabilityTag {
    match mission_type {
        MissionType::Mapping | MissionType::Survey | MissionType::Inspection => CapabilityTag::Rgb,
        MissionType::Thermal => CapabilityTag::Thermal,
    }
}

/// Capability a pilot skill certifies for, same table as [`required_capability`]
pub fn skill_capability(skill: SkillTag) -> CapabilityTag {
    match skill {
        SkillTag::Mapping | SkillTag::Survey | SkillTag::Inspection => CapabilityTag::Rgb,
        SkillTag::Thermal => CapabilityTag::Thermal,
    }
}

/// Exact-match location compatibility
///
/// An empty location on either side means "not modeled" and is treated as
/// compatible; otherwise the strings must match ignoring case.
pub fn location_compatible(resource_location: &str, mission_location: &str) -> bool {
    let resource = resource_location.trim();
    let mission = mission_location.trim();
    resource.is_empty() || mission.is_empty() || resource.eq_ignore_ascii_case(mission)
}

/// Pilot skill set is non-empty and covers the mission's required capability
pub fn pilot_qualifies(pilot: &Pilot, mission: &Mission) -> bool {
    let required = required_capability(mission.mission_type);
    !pilot.skills.is_empty()
        && pilot.skills.iter().any(|s| skill_capability(*s) == required)
        && location_compatible(&pilot.location, &mission.location)
}

/// Drone carries the mission's required capability
pub fn drone_qualifies(drone: &Drone, mission: &Mission) -> bool {
    let required = required_capability(mission.mission_type);
    drone.capabilities.contains(&required)
        && location_compatible(&drone.location, &mission.location)
}

/// Pilot holds the skill named by the mission type itself, not just a skill
/// that maps to the same capability
pub fn pilot_has_exact_skill(pilot: &Pilot, mission: &Mission) -> bool {
    pilot.skills.contains(&SkillTag::from(mission.mission_type))
}

/// Drone carries exactly the required capability and nothing else
pub fn drone_has_exact_capability(drone: &Drone, mission: &Mission) -> bool {
    drone.capabilities == [required_capability(mission.mission_type)]
}

/// Full pair eligibility: capability, skill coverage, and location
pub fn is_eligible(pilot: &Pilot, drone: &Drone, mission: &Mission) -> bool {
    pilot_qualifies(pilot, mission) && drone_qualifies(drone, mission)
}
