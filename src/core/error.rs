use thiserror::Error;

use crate::core::types::Tick;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Consistency violation at tick {tick} in {subsystem}: {detail}")]
    ConsistencyViolation {
        tick: Tick,
        subsystem: &'static str,
        detail: String,
    },

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidPhase { from: String, to: String },

    #[error("Kernel is not running (phase: {0})")]
    NotRunning(String),

    #[error("Invalid trait: {0}")]
    InvalidTrait(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl SimError {
    /// True for errors that end the run rather than a single request
    pub fn is_fatal(&self) -> bool {
        matches!(self, SimError::Configuration(_) | SimError::ConsistencyViolation { .. })
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
