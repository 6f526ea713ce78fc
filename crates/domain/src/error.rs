//! Domain error types

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced while parsing roster field values into domain types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Mission type string outside the known set
    #[error("Unknown mission type: {0}")]
    UnknownMissionType(String),

    /// Mission status string outside the known set
    #[error("Unknown mission status: {0}")]
    UnknownMissionStatus(String),

    /// Priority string outside the known set
    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    /// Availability status string outside the known set
    #[error("Unknown availability status: {0}")]
    UnknownStatus(String),

    /// Capability tag string outside the known set
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// Skill tag string outside the known set
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    /// Date field that is not YYYY-MM-DD
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Mission window whose start is not strictly before its end
    #[error("Invalid time window: start {start} is not before end {end}")]
    InvalidWindow {
        /// Window start date
        start: NaiveDate,
        /// Window end date
        end: NaiveDate,
    },
}
