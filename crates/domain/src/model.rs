//! Roster entity types: pilots, drones, missions, and derived assignments
//!
//! Assignments are represented by id reference only: a pilot and a drone each
//! carry an optional mission id, and the pair referencing the same mission is
//! the assignment. There are no mutual object handles between entities.

#![warn(missing_docs)]

use crate::error::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Availability of a pilot or drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    /// Free for assignment
    Available,
    /// Currently serving a mission
    Assigned,
    /// Out of service (leave, maintenance, or otherwise withdrawn)
    Unavailable,
}

impl FromStr for AvailabilityStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "On Leave" and "Maintenance" come from the legacy roster sheets and
        // both mean the resource is out of service.
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "assigned" => Ok(Self::Assigned),
            "unavailable" | "on leave" | "maintenance" => Ok(Self::Unavailable),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Available => "Available",
            Self::Assigned => "Assigned",
            Self::Unavailable => "Unavailable",
        };
        write!(f, "{}", s)
    }
}

/// Mission type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionType {
    /// Aerial mapping
    Mapping,
    /// Site survey
    Survey,
    /// Structure inspection
    Inspection,
    /// Thermal imaging
    Thermal,
}

impl FromStr for MissionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mapping" => Ok(Self::Mapping),
            "survey" => Ok(Self::Survey),
            "inspection" => Ok(Self::Inspection),
            "thermal" => Ok(Self::Thermal),
            other => Err(DomainError::UnknownMissionType(other.to_string())),
        }
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mapping => "Mapping",
            Self::Survey => "Survey",
            Self::Inspection => "Inspection",
            Self::Thermal => "Thermal",
        };
        write!(f, "{}", s)
    }
}

/// Pilot skill tag, mirroring the mission types a pilot is trained for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillTag {
    /// Trained for mapping missions
    Mapping,
    /// Trained for survey missions
    Survey,
    /// Trained for inspection missions
    Inspection,
    /// Trained for thermal missions
    Thermal,
}

impl From<MissionType> for SkillTag {
    fn from(mission_type: MissionType) -> Self {
        match mission_type {
            MissionType::Mapping => Self::Mapping,
            MissionType::Survey => Self::Survey,
            MissionType::Inspection => Self::Inspection,
            MissionType::Thermal => Self::Thermal,
        }
    }
}

impl FromStr for SkillTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mapping" => Ok(Self::Mapping),
            "survey" => Ok(Self::Survey),
            "inspection" => Ok(Self::Inspection),
            "thermal" => Ok(Self::Thermal),
            other => Err(DomainError::UnknownSkill(other.to_string())),
        }
    }
}

impl fmt::Display for SkillTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mapping => "Mapping",
            Self::Survey => "Survey",
            Self::Inspection => "Inspection",
            Self::Thermal => "Thermal",
        };
        write!(f, "{}", s)
    }
}

/// Drone sensor capability tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityTag {
    /// Standard RGB camera
    Rgb,
    /// Thermal imaging sensor
    Thermal,
}

impl FromStr for CapabilityTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "thermal" => Ok(Self::Thermal),
            other => Err(DomainError::UnknownCapability(other.to_string())),
        }
    }
}

impl fmt::Display for CapabilityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Rgb => "RGB",
            Self::Thermal => "Thermal",
        };
        write!(f, "{}", s)
    }
}

/// Mission priority, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    /// Can wait indefinitely
    Low,
    /// Default priority
    Standard,
    /// Should be served before standard work
    High,
    /// Must be served, may preempt lower-priority assignments
    Urgent,
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "standard" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(DomainError::UnknownPriority(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Standard => "Standard",
            Self::High => "High",
            Self::Urgent => "Urgent",
        };
        write!(f, "{}", s)
    }
}

/// Mission lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionStatus {
    /// Waiting for resources
    Unassigned,
    /// Served by a pilot/drone pair
    Assigned,
    /// Finished
    Completed,
    /// Called off
    Cancelled,
}

impl FromStr for MissionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unassigned" => Ok(Self::Unassigned),
            "assigned" => Ok(Self::Assigned),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(DomainError::UnknownMissionStatus(other.to_string())),
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unassigned => "Unassigned",
            Self::Assigned => "Assigned",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Half-open mission time window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First day of the window
    pub start: NaiveDate,
    /// First day after the window
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Create a window, rejecting one whose start is not before its end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Two half-open windows overlap iff each starts before the other ends
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A pilot in the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pilot {
    /// Roster identifier (e.g. P001)
    pub id: String,
    /// Display name
    pub name: String,
    /// Home location
    pub location: String,
    /// Skill tags the pilot is trained for
    pub skills: Vec<SkillTag>,
    /// Availability status
    pub status: AvailabilityStatus,
    /// Mission id currently served, if any
    pub current_assignment: Option<String>,
}

impl Pilot {
    /// Free for assignment
    pub fn is_available(&self) -> bool {
        self.status == AvailabilityStatus::Available
    }
}

/// A drone in the fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drone {
    /// Fleet identifier (e.g. D001)
    pub id: String,
    /// Airframe model
    pub model: String,
    /// Home location
    pub location: String,
    /// Sensor capabilities
    pub capabilities: Vec<CapabilityTag>,
    /// Availability status
    pub status: AvailabilityStatus,
    /// Mission id currently served, if any
    pub current_assignment: Option<String>,
}

impl Drone {
    /// Free for assignment
    pub fn is_available(&self) -> bool {
        self.status == AvailabilityStatus::Available
    }
}

/// A mission to be served
///
/// Missions are authoritative: the engine never alters their declared
/// requirements or windows, only their lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Mission identifier (e.g. PRJ001)
    pub id: String,
    /// Mission type, from which the required capability is derived
    pub mission_type: MissionType,
    /// Operating location
    pub location: String,
    /// Scheduled window
    pub window: TimeWindow,
    /// Priority
    pub priority: Priority,
    /// Lifecycle status
    pub status: MissionStatus,
}

impl Mission {
    /// Mission is waiting for resources
    pub fn is_open(&self) -> bool {
        self.status == MissionStatus::Unassigned
    }
}

/// Derived pilot/drone/mission triple
///
/// Never stored: it is implied by the pilot and drone referencing the same
/// mission id, and reconstructed on demand from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned pilot id
    pub pilot_id: String,
    /// Assigned drone id
    pub drone_id: String,
    /// Served mission id
    pub mission_id: String,
}

/// Non-committed suggestion to preempt a lower-priority assignment
///
/// Ephemeral: constructed on demand, inspected or rejected by the caller,
/// and only applied through an explicit commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentProposal {
    /// Mission to be vacated
    pub vacate_mission_id: String,
    /// Pilot to preempt
    pub pilot_id: String,
    /// Drone to preempt
    pub drone_id: String,
    /// Blocked mission to be newly served
    pub serve_mission_id: String,
    /// Human-readable priority trade-off
    pub rationale: String,
}
