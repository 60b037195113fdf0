//! BWR Reactor Simulator - Main Entry Point
//!
//! Interactive terminal panel by default, JSON snapshot stream with
//! `--headless`.

use std::fs::File;
use std::io::{self, Write};

use bwr_simulator_lib::config::{CliArgs, SimulatorConfig};
use bwr_simulator_lib::presenter::PANEL_TITLE;
use bwr_simulator_lib::{spawn_simulation, Controller, ReactorModel, Result, SimulatorError};
use clap::Parser;
use log::info;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = args.resolve_config()?;

    init_logging(&config, args.headless)?;
    info!("{} starting (seed: {:?})", PANEL_TITLE, config.seed);

    let runtime = Runtime::new()?;
    let controller = Controller::new(ReactorModel::new(config.noise()));

    if args.headless {
        run_headless(&runtime, controller, &config, args.ticks)
    } else {
        run_interactive(&runtime, controller, &config)
    }
}

/// env_logger setup; RUST_LOG wins over the defaults
fn init_logging(config: &SimulatorConfig, headless: bool) -> Result<()> {
    // The panel owns the terminal, so keep stderr quiet unless asked
    let default_filter = if headless { "info" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    if let Some(path) = &config.log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn run_interactive(runtime: &Runtime, controller: Controller, config: &SimulatorConfig) -> Result<()> {
    let mut simulation = spawn_simulation(
        runtime.handle(),
        controller,
        config.tick_interval(),
        None,
        config.snapshot_buffer,
    );

    let panel_result = bwr_simulator_lib::ui::run_panel(&mut simulation, &config.operator);

    // Closing the command channel stops the task
    drop(simulation.commands);
    drop(simulation.snapshots);
    let controller = runtime
        .block_on(simulation.task)
        .map_err(|e| SimulatorError::TaskFailed(e.to_string()))?;
    info!("Shut down at tick {}", controller.model().state().tick);

    panel_result
}

fn run_headless(
    runtime: &Runtime,
    controller: Controller,
    config: &SimulatorConfig,
    ticks: u64,
) -> Result<()> {
    runtime.block_on(async {
        let mut simulation = spawn_simulation(
            runtime.handle(),
            controller,
            config.tick_interval(),
            Some(ticks),
            config.snapshot_buffer,
        );

        let mut stdout = io::stdout().lock();
        while let Some(snapshot) = simulation.snapshots.recv().await {
            serde_json::to_writer(&mut stdout, &snapshot)?;
            writeln!(stdout)?;
        }

        simulation
            .task
            .await
            .map_err(|e| SimulatorError::TaskFailed(e.to_string()))?;
        Ok::<(), SimulatorError>(())
    })
}
