//! BWR Reactor Simulator Library
//!
//! A toy boiling-water reactor: a randomized tick-based model, a controller
//! task that drives it twice per second, and a terminal control panel.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod noise;
pub mod presenter;
pub mod reactor;
pub mod ui;

pub use commands::{ControlCommand, ReactorSnapshot};
pub use controller::{spawn_simulation, Controller, SimulationHandle};
pub use error::{Result, SimulatorError};
pub use reactor::{ReactorMode, ReactorModel, ReactorState};
