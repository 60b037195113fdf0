//! BWR Reactor Simulation State
//!
//! This module contains the reactor state and the per-tick update rules.
//! The "physics" is a short chain of randomized arithmetic on a dozen
//! scalar fields. All randomness comes from the injected [`NoiseSource`].

use log::{info, trace};
use serde::{Deserialize, Serialize};

use crate::noise::NoiseSource;

/// Fixed constants of the toy model
pub mod constants {
    pub const MIN_POWER_PERCENT: f64 = 0.0001;
    pub const MAX_POWER_PERCENT: f64 = 120.0;

    /// Power the automatic regulator steers toward [%]
    pub const AUTO_TARGET_POWER_PERCENT: f64 = 95.0;
    /// Rod travel per tick in auto mode [%]
    pub const AUTO_ROD_STEP: f64 = 0.5;
    /// Maximum random rod drift per tick in manual mode [%]
    pub const MANUAL_ROD_DRIFT: f64 = 0.1;

    pub const XENON_BASELINE_PERCENT: f64 = 10.1;
    pub const MAX_XENON_PERCENT: f64 = 35.0;

    pub const FUEL_BURN_PER_TICK: f64 = 0.0001;

    /// Below this circulation the core runs hotter
    pub const CIRCULATION_THRESHOLD_PERCENT: f64 = 50.0;
    pub const DEGRADED_COOLING_PENALTY_C: f64 = 2.0;

    pub const SCRAM_POWER_DECAY: f64 = 0.7;
    pub const SCRAM_COOLDOWN_C: f64 = 5.0;
    pub const SCRAM_PRESSURE_DECAY: f64 = 0.8;
    pub const SCRAM_TURBINE_DECAY: f64 = 0.9;

    /// Generator output per percent of thermal power [MW]
    pub const MW_PER_POWER_PERCENT: f64 = 12.0;

    pub const POWER_ALERT_PERCENT: f64 = 110.0;
}

use constants::*;

/// Operating mode of the reactor
///
/// Scrammed and auto can never be active together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReactorMode {
    #[default]
    Manual,
    Auto,
    Scrammed,
}

/// Complete reactor state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorState {
    /// Completed ticks since start or reset
    pub tick: u64,

    pub thermal_power_percent: f64,
    pub temperature_c: f64,
    pub pressure_kpa: i64,
    pub feedwater_flow: f64,     // [kg/s]
    pub turbine_speed_rpm: i64,
    pub generator_load_mw: i64,

    pub rods_position_percent: f64,    // 0 = withdrawn, 100 = inserted
    pub circulation_flow_percent: f64, // 0 or 100
    pub xenon_poisoning_percent: f64,
    pub fuel_remaining_percent: f64,

    pub mode: ReactorMode,
}

impl Default for ReactorState {
    fn default() -> Self {
        Self {
            tick: 0,
            thermal_power_percent: MIN_POWER_PERCENT,
            temperature_c: 31.0,
            pressure_kpa: 0,
            feedwater_flow: 0.0,
            turbine_speed_rpm: 0,
            generator_load_mw: 0,
            rods_position_percent: 0.0,
            circulation_flow_percent: 0.0,
            xenon_poisoning_percent: XENON_BASELINE_PERCENT,
            fuel_remaining_percent: 98.0,
            mode: ReactorMode::Manual,
        }
    }
}

impl ReactorState {
    pub fn is_scrammed(&self) -> bool {
        self.mode == ReactorMode::Scrammed
    }

    pub fn is_auto(&self) -> bool {
        self.mode == ReactorMode::Auto
    }

    pub fn circulation_degraded(&self) -> bool {
        self.circulation_flow_percent < CIRCULATION_THRESHOLD_PERCENT
    }

    /// Alerts for the current values
    ///
    /// Derived on demand, so they always agree with the mode and the
    /// circulation even right after a command.
    pub fn alerts(&self) -> Vec<String> {
        let mut alerts = Vec::new();
        if self.is_scrammed() {
            alerts.push("SCRAM ACTIVE: rods inserting".to_string());
        }
        if self.thermal_power_percent > POWER_ALERT_PERCENT {
            alerts.push("WARNING: Thermal power exceeds 110%".to_string());
        }
        if self.circulation_degraded() && !self.is_scrammed() {
            alerts.push("WARNING: Circulation pumps off, core cooling degraded".to_string());
        }
        if self.fuel_remaining_percent <= 0.0 {
            alerts.push("CRITICAL: Fuel exhausted".to_string());
        }
        alerts
    }
}

/// Clamp to [0, 100], mapping NaN to 0
fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Reactor simulation engine
pub struct ReactorModel {
    state: ReactorState,
    noise: Box<dyn NoiseSource>,
}

impl ReactorModel {
    pub fn new(noise: impl NoiseSource + 'static) -> Self {
        Self::with_state(ReactorState::default(), noise)
    }

    /// Start from an arbitrary state, e.g. to replay a scenario
    pub fn with_state(state: ReactorState, noise: impl NoiseSource + 'static) -> Self {
        Self {
            state,
            noise: Box::new(noise),
        }
    }

    pub fn state(&self) -> &ReactorState {
        &self.state
    }

    pub fn mode(&self) -> ReactorMode {
        self.state.mode
    }

    pub fn is_scrammed(&self) -> bool {
        self.state.is_scrammed()
    }

    pub fn is_auto(&self) -> bool {
        self.state.is_auto()
    }

    /// Advance the simulation by one tick
    ///
    /// `rods_input` is the operator's commanded rod position. It is ignored
    /// while scrammed.
    pub fn tick(&mut self, rods_input: f64) {
        if self.state.is_scrammed() {
            self.decay();
        } else {
            self.operate(rods_input);
        }

        self.state.tick += 1;

        trace!(
            "tick {} mode={:?} power={:.4}% rods={:.2}%",
            self.state.tick,
            self.state.mode,
            self.state.thermal_power_percent,
            self.state.rods_position_percent
        );
    }

    /// SCRAM tick: power and plant values fall off, rods stay put
    fn decay(&mut self) {
        let state = &mut self.state;

        state.thermal_power_percent =
            (state.thermal_power_percent * SCRAM_POWER_DECAY).max(MIN_POWER_PERCENT);
        state.temperature_c -= SCRAM_COOLDOWN_C;
        state.pressure_kpa = (state.pressure_kpa as f64 * SCRAM_PRESSURE_DECAY) as i64;
        state.turbine_speed_rpm = (state.turbine_speed_rpm as f64 * SCRAM_TURBINE_DECAY) as i64;
        state.generator_load_mw = (state.thermal_power_percent * MW_PER_POWER_PERCENT) as i64;
    }

    /// Normal tick, manual or auto
    fn operate(&mut self, rods_input: f64) {
        let state = &mut self.state;
        let noise = &mut self.noise;

        state.rods_position_percent = clamp_percent(rods_input);

        // Rod movement: regulator in auto, small drift in manual
        if state.mode == ReactorMode::Auto {
            state.rods_position_percent =
                if state.thermal_power_percent < AUTO_TARGET_POWER_PERCENT {
                    (state.rods_position_percent - AUTO_ROD_STEP).max(0.0)
                } else {
                    (state.rods_position_percent + AUTO_ROD_STEP).min(100.0)
                };
        } else {
            let drift = noise.uniform(-MANUAL_ROD_DRIFT, MANUAL_ROD_DRIFT);
            state.rods_position_percent = clamp_percent(state.rods_position_percent + drift);
        }

        let rod_effect = (100.0 - state.rods_position_percent) / 100.0;
        let power_change = rod_effect * noise.uniform(0.95, 1.05);
        state.thermal_power_percent = (state.thermal_power_percent * power_change)
            .clamp(MIN_POWER_PERCENT, MAX_POWER_PERCENT);

        let power = state.thermal_power_percent;
        state.temperature_c = 30.0 + power * 3.0 + noise.uniform(-2.0, 2.0);
        state.pressure_kpa = (power * 60.0 + noise.uniform(-100.0, 100.0)) as i64;
        state.feedwater_flow = power * 4.0 + noise.uniform(-10.0, 10.0);
        state.turbine_speed_rpm = (power * 22.0 + noise.uniform(-50.0, 50.0)) as i64;
        state.generator_load_mw = (power * MW_PER_POWER_PERCENT) as i64;

        state.circulation_flow_percent = clamp_percent(state.circulation_flow_percent);
        if state.circulation_degraded() {
            state.temperature_c += DEGRADED_COOLING_PENALTY_C;
        }

        // Xenon builds up with power
        state.xenon_poisoning_percent = (XENON_BASELINE_PERCENT
            + power / 5.0
            + noise.uniform(-0.5, 0.5))
        .clamp(0.0, MAX_XENON_PERCENT);

        state.fuel_remaining_percent = (state.fuel_remaining_percent - FUEL_BURN_PER_TICK).max(0.0);
    }

    /// Initiate emergency SCRAM; auto mode is dropped
    pub fn scram(&mut self) {
        if !self.state.is_scrammed() {
            info!(
                "SCRAM initiated at tick {} (power {:.4}%)",
                self.state.tick, self.state.thermal_power_percent
            );
            self.state.mode = ReactorMode::Scrammed;
        }
    }

    /// Leave SCRAM into manual control
    pub fn reset_scram(&mut self) {
        if self.state.is_scrammed() {
            info!("SCRAM reset at tick {}", self.state.tick);
            self.state.mode = ReactorMode::Manual;
        }
    }

    /// The SCRAM button: scram when running, reset when scrammed
    pub fn toggle_scram(&mut self) {
        if self.state.is_scrammed() {
            self.reset_scram();
        } else {
            self.scram();
        }
    }

    /// Switch between manual and auto
    ///
    /// Has no effect while scrammed. Returns whether the mode changed.
    pub fn toggle_auto(&mut self) -> bool {
        let next = match self.state.mode {
            ReactorMode::Manual => ReactorMode::Auto,
            ReactorMode::Auto => ReactorMode::Manual,
            ReactorMode::Scrammed => return false,
        };
        info!("Control mode {:?} -> {:?}", self.state.mode, next);
        self.state.mode = next;
        true
    }

    /// Two-state pump toggle: full flow when below threshold, otherwise off
    pub fn toggle_circulation(&mut self) {
        self.state.circulation_flow_percent =
            if self.state.circulation_flow_percent < CIRCULATION_THRESHOLD_PERCENT {
                100.0
            } else {
                0.0
            };
        info!(
            "Circulation set to {:.0}%",
            self.state.circulation_flow_percent
        );
    }

    /// Reset simulation to initial state
    pub fn reset(&mut self) {
        info!("Simulation reset at tick {}", self.state.tick);
        self.state = ReactorState::default();
    }
}
