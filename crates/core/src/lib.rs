//! Core functionality for the SkyCoord fleet coordination system.
//!
//! This crate provides the ambient infrastructure shared by every other
//! workspace member: configuration loading, base error types, and logging
//! initialization.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, MatchingConfig, RosterConfig, ServiceConfig, TieBreak};
pub use error::{CoreError, Result};
