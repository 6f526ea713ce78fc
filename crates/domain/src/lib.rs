//! Domain model and eligibility rules for SkyCoord.
//!
//! This crate defines pilots, drones, and missions along with the pure
//! predicates that decide whether a pilot/drone pair can serve a mission.
//! Nothing in here mutates state; the roster store owns all mutation.

pub mod eligibility;
pub mod error;
pub mod model;

pub use eligibility::{
    drone_has_exact_capability, drone_qualifies, is_eligible, location_compatible,
    pilot_has_exact_skill, pilot_qualifies, required_capability, skill_capability,
};
pub use error::DomainError;
pub use model::{
    Assignment, AvailabilityStatus, CapabilityTag, Drone, Mission, MissionStatus, MissionType,
    Pilot, Priority, ReassignmentProposal, SkillTag, TimeWindow,
};
