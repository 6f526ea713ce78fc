//! Core error types

use thiserror::Error;

/// Core error type for SkyCoord
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias using [`CoreError`]
pub type Result<T> = std::result::Result<T, CoreError>;
