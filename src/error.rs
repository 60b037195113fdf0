//! Error type for the simulator's outer layers
//!
//! The reactor model itself is total and never fails. Errors only come from
//! the terminal, the config file, serialization and the simulation task.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Simulation channel closed")]
    ChannelClosed,

    #[error("Simulation task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, SimulatorError>;
