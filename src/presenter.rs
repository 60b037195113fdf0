//! Panel view model
//!
//! Turns a [`ReactorSnapshot`] into display strings and control states.
//! Kept free of any terminal code so the formatting can be tested directly.

use crate::commands::ReactorSnapshot;
use crate::reactor::ReactorMode;

pub const PANEL_TITLE: &str = "BWR REACTOR SYSTEM V2";

pub const STATUS_SCRAMMED: &str = "SCRAMMED — RODS INSERTING";
pub const STATUS_AUTO: &str = "AUTO MODE ACTIVE";
pub const STATUS_MANUAL: &str = "MANUAL CONTROL";

pub const SCRAM_LABEL: &str = "SCRAM";
pub const RESET_SCRAM_LABEL: &str = "reset scram";

/// One numeric display: label, formatted value, unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readout {
    pub label: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Readout {
    fn new(label: &'static str, value: String, unit: &'static str) -> Self {
        Self { label, value, unit }
    }
}

/// Everything the panel needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub tick: u64,
    /// Power, temperature, pressure, feedwater, turbine
    pub left: Vec<Readout>,
    /// Generator, rods, circulation, xenon, fuel
    pub right: Vec<Readout>,
    pub status: &'static str,
    pub scram_label: &'static str,
    pub rod_slider: f64,
    pub rod_control_enabled: bool,
    pub circulation_enabled: bool,
    pub auto_enabled: bool,
    pub auto_active: bool,
    pub scrammed: bool,
    pub alerts: Vec<String>,
}

impl PanelView {
    pub fn from_snapshot(snapshot: &ReactorSnapshot) -> Self {
        let state = &snapshot.state;

        let left = vec![
            Readout::new("Reactor Thermal Power", format!("{:.4}", state.thermal_power_percent), "%"),
            Readout::new("Reactor Temperature", format!("{:.0}", state.temperature_c), "°C"),
            Readout::new("Reactor Pressure", state.pressure_kpa.to_string(), "kPa"),
            Readout::new("Feedwater flow", format!("{:.1}", state.feedwater_flow), "kg/s"),
            Readout::new("Turbine speed", state.turbine_speed_rpm.to_string(), "RPM"),
        ];
        let right = vec![
            Readout::new("Generator load", state.generator_load_mw.to_string(), "MW"),
            Readout::new("Rods position", format!("{:.2}", state.rods_position_percent), "%"),
            Readout::new("Circulation flow", format!("{:.0}", state.circulation_flow_percent), "%"),
            Readout::new("Xenon poisoning", format!("{:.1}", state.xenon_poisoning_percent), "%"),
            Readout::new("Fuel Remaining", format!("{:.1}", state.fuel_remaining_percent), "%"),
        ];

        let (status, scram_label) = match state.mode {
            ReactorMode::Scrammed => (STATUS_SCRAMMED, RESET_SCRAM_LABEL),
            ReactorMode::Auto => (STATUS_AUTO, SCRAM_LABEL),
            ReactorMode::Manual => (STATUS_MANUAL, SCRAM_LABEL),
        };
        let scrammed = state.is_scrammed();

        Self {
            tick: state.tick,
            left,
            right,
            status,
            scram_label,
            rod_slider: snapshot.rod_input,
            rod_control_enabled: !scrammed,
            circulation_enabled: !scrammed,
            auto_enabled: !scrammed,
            auto_active: state.is_auto(),
            scrammed,
            alerts: state.alerts(),
        }
    }

    /// All ten readouts, left column first
    pub fn readouts(&self) -> impl Iterator<Item = &Readout> {
        self.left.iter().chain(self.right.iter())
    }
}
