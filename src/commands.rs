//! Operator commands for the BWR simulation
//!
//! These are sent from the control panel to the simulation task over a
//! channel. The task answers every command and every tick with a
//! [`ReactorSnapshot`].

use serde::{Deserialize, Serialize};

use crate::reactor::ReactorState;

/// Command issued from the control panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Move the rod slider to a position in percent
    SetRods(f64),
    /// Move the rod slider by a signed step, relative to the current setting
    NudgeRods(f64),
    /// SCRAM button: initiate or reset
    ToggleScram,
    ToggleCirculation,
    ToggleAuto,
    /// Reset simulation to initial state
    Reset,
    /// Stop the simulation task
    Shutdown,
}

/// State published after each tick or command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorSnapshot {
    pub state: ReactorState,
    /// Commanded rod position, i.e. the slider value
    pub rod_input: f64,
}
