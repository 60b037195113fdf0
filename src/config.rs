//! Runtime configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags. None of them touch the physics: they only set the
//! tick cadence, the RNG seed, logging and the operator label.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulatorError};
use crate::noise::SeededNoise;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 500;
pub const DEFAULT_SNAPSHOT_BUFFER: usize = 16;
pub const DEFAULT_OPERATOR: &str = "Supervisor";

/// Simulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Time between simulation ticks
    pub tick_interval_ms: u64,
    /// Fixed RNG seed; a fresh one is drawn when absent
    pub seed: Option<u64>,
    /// Name shown in the panel header
    pub operator: String,
    /// Log destination. Without it logs go to stderr.
    pub log_file: Option<PathBuf>,
    /// Capacity of the snapshot channel to the display
    pub snapshot_buffer: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            seed: None,
            operator: DEFAULT_OPERATOR.to_string(),
            log_file: None,
            snapshot_buffer: DEFAULT_SNAPSHOT_BUFFER,
        }
    }
}

impl SimulatorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(SimulatorError::InvalidConfig(
                "tick_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.snapshot_buffer == 0 {
            return Err(SimulatorError::InvalidConfig(
                "snapshot_buffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Noise source for a new model
    pub fn noise(&self) -> SeededNoise {
        match self.seed {
            Some(seed) => SeededNoise::from_seed(seed),
            None => SeededNoise::from_entropy(),
        }
    }

    /// Apply command-line overrides on top of the file values
    pub fn apply_args(&mut self, args: &CliArgs) {
        if let Some(ms) = args.interval_ms {
            self.tick_interval_ms = ms;
        }
        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if let Some(operator) = &args.operator {
            self.operator = operator.clone();
        }
        if let Some(log_file) = &args.log_file {
            self.log_file = Some(log_file.clone());
        }
    }
}

/// BWR reactor console
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bwr-simulator")]
#[command(about = "Toy BWR reactor simulation with a terminal control panel")]
pub struct CliArgs {
    /// TOML config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Milliseconds between simulation ticks
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Operator name shown in the header
    #[arg(long)]
    pub operator: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Run without the panel and print JSON snapshots
    #[arg(long)]
    pub headless: bool,

    /// Number of ticks to run in headless mode
    #[arg(long, default_value_t = 20)]
    pub ticks: u64,
}

impl CliArgs {
    /// Resolve the effective config: file (if any), then flags
    pub fn resolve_config(&self) -> Result<SimulatorConfig> {
        let mut config = match &self.config {
            Some(path) => SimulatorConfig::load(path)?,
            None => SimulatorConfig::default(),
        };
        config.apply_args(self);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.operator, "Supervisor");
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulatorConfig::from_toml_str("seed = 7\noperator = \"Night Shift\"\n").unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.operator, "Night Shift");
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(config.snapshot_buffer, DEFAULT_SNAPSHOT_BUFFER);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = SimulatorConfig::from_toml_str("tick_interval_ms = 0").unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let err = SimulatorConfig::from_toml_str("snapshot_buffer = 0").unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SimulatorConfig::from_toml_str("target_power = 80.0").unwrap_err();
        assert!(matches!(err, SimulatorError::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_interval_ms = 250").unwrap();
        let config = SimulatorConfig::load(file.path()).unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_load_sample_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/bwr.toml");
        let config = SimulatorConfig::load(&path).expect("Should load sample config");
        assert_eq!(config, SimulatorConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimulatorConfig::load(Path::new("/nonexistent/bwr.toml")).unwrap_err();
        assert!(matches!(err, SimulatorError::Io(_)));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 1\ntick_interval_ms = 250").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let args = CliArgs::try_parse_from([
            "bwr-simulator",
            "--config",
            path.as_str(),
            "--seed",
            "99",
            "--operator",
            "Trainee",
        ])
        .unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.operator, "Trainee");
    }

    #[test]
    fn test_cli_zero_interval_rejected() {
        let args = CliArgs::try_parse_from(["bwr-simulator", "--interval-ms", "0"]).unwrap();
        assert!(args.resolve_config().is_err());
    }

    #[test]
    fn test_cli_headless_defaults() {
        let args = CliArgs::try_parse_from(["bwr-simulator", "--headless"]).unwrap();
        assert!(args.headless);
        assert_eq!(args.ticks, 20);
    }
}
