//! Configuration management for SkyCoord.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub roster: RosterConfig,
    pub service: ServiceConfig,
    #[serde(default = "MatchingConfig::default_config")]
    pub matching: MatchingConfig,
}

/// Paths of the tabular roster files the store loads from and writes back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub pilot_csv: String,
    pub drone_csv: String,
    pub mission_csv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub listen_port: u16,
    pub log_json: bool,
}

/// A single tie-break rule used when ordering candidate pairs.
///
/// The identifier order rule is always applied as the final comparison even
/// when it is not listed, so candidate ordering stays fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Pairs whose pilot and drone both sit at the mission location rank first
    LocationMatch,
    /// Pairs holding exactly the required tag rank before superset holders
    Specificity,
    /// Lexicographic (pilot id, drone id) order
    IdentifierOrder,
}

/// Ranking precedence for the matching engine.
///
/// The precedence between location match and tag specificity is a policy
/// choice, so it is configured rather than hard-coded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub tie_breaks: Vec<TieBreak>,
}

impl MatchingConfig {
    /// Default precedence: location match, then specificity, then identifiers.
    pub fn default_config() -> Self {
        Self {
            tie_breaks: vec![
                TieBreak::LocationMatch,
                TieBreak::Specificity,
                TieBreak::IdentifierOrder,
            ],
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content).map_err(|e| CoreError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            roster: RosterConfig {
                pilot_csv: "pilot_roster.csv".to_string(),
                drone_csv: "drone_fleet.csv".to_string(),
                mission_csv: "missions.csv".to_string(),
            },
            service: ServiceConfig {
                listen_port: 8080,
                log_json: false,
            },
            matching: MatchingConfig::default_config(),
        }
    }
}
