//! Simulation controller
//!
//! The controller owns the reactor model and the commanded rod position.
//! It runs as one tokio task: an interval drives the ticks, operator
//! commands arrive on one channel and state snapshots leave on another.
//! Nothing else ever touches the model, so no locking is needed.

use std::time::Duration;

use log::{debug, info};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::commands::{ControlCommand, ReactorSnapshot};
use crate::reactor::ReactorModel;

/// Whether the simulation loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Reactor model plus the operator's rod setting
pub struct Controller {
    model: ReactorModel,
    rod_input: f64,
}

impl Controller {
    pub fn new(model: ReactorModel) -> Self {
        let rod_input = model.state().rods_position_percent;
        Self { model, rod_input }
    }

    pub fn model(&self) -> &ReactorModel {
        &self.model
    }

    /// Rod position the next tick will start from
    pub fn rod_input(&self) -> f64 {
        self.rod_input
    }

    /// Apply an operator command
    ///
    /// Rod, circulation and auto controls are locked out while scrammed.
    pub fn apply(&mut self, command: ControlCommand) -> Flow {
        let scrammed = self.model.is_scrammed();
        match command {
            ControlCommand::SetRods(position) if !scrammed => {
                self.rod_input = if position.is_nan() {
                    self.rod_input
                } else {
                    position.clamp(0.0, 100.0)
                };
            }
            ControlCommand::NudgeRods(delta) if !scrammed => {
                if !delta.is_nan() {
                    self.rod_input = (self.rod_input + delta).clamp(0.0, 100.0);
                }
            }
            ControlCommand::ToggleScram => self.model.toggle_scram(),
            ControlCommand::ToggleCirculation if !scrammed => self.model.toggle_circulation(),
            ControlCommand::ToggleAuto if !scrammed => {
                self.model.toggle_auto();
            }
            ControlCommand::Reset => {
                self.model.reset();
                self.rod_input = self.model.state().rods_position_percent;
            }
            ControlCommand::Shutdown => return Flow::Stop,
            ignored => debug!("Ignoring {:?} while scrammed", ignored),
        }
        Flow::Continue
    }

    /// Run one model tick with the current rod setting
    pub fn tick(&mut self) {
        self.model.tick(self.rod_input);

        // The rod control follows the model (drift, regulator) unless locked
        if !self.model.is_scrammed() {
            self.rod_input = self.model.state().rods_position_percent;
        }
    }

    pub fn snapshot(&self) -> ReactorSnapshot {
        ReactorSnapshot {
            state: self.model.state().clone(),
            rod_input: self.rod_input,
        }
    }

    /// Simulation loop
    ///
    /// Publishes the current state first, then one snapshot per tick or
    /// command. Ends when the command channel closes, on `Shutdown`, when
    /// the snapshot receiver is gone, or after `tick_limit` ticks.
    pub async fn run(
        mut self,
        interval: Duration,
        tick_limit: Option<u64>,
        mut commands: mpsc::UnboundedReceiver<ControlCommand>,
        snapshots: mpsc::Sender<ReactorSnapshot>,
    ) -> Self {
        info!("Simulation task started ({} ms per tick)", interval.as_millis());

        let mut ticks_run: u64 = 0;
        if snapshots.send(self.snapshot()).await.is_err() {
            info!("Display closed before the first snapshot");
            return self;
        }

        // The first interval tick completes at once, so tick 1 runs right
        // after the initial snapshot
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if tick_limit.is_some_and(|limit| ticks_run >= limit) {
                break;
            }

            // Queued commands go before a due tick
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => {
                        if self.apply(command) == Flow::Stop {
                            break;
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    self.tick();
                    ticks_run += 1;
                }
            }

            if snapshots.send(self.snapshot()).await.is_err() {
                debug!("Snapshot receiver dropped");
                break;
            }
        }

        info!("Simulation task stopped after {} ticks", ticks_run);
        self
    }
}

/// Channels and task of a running simulation
pub struct SimulationHandle {
    pub commands: mpsc::UnboundedSender<ControlCommand>,
    pub snapshots: mpsc::Receiver<ReactorSnapshot>,
    pub task: JoinHandle<Controller>,
}

/// Start the simulation loop on the given runtime
pub fn spawn_simulation(
    runtime: &Handle,
    controller: Controller,
    interval: Duration,
    tick_limit: Option<u64>,
    snapshot_buffer: usize,
) -> SimulationHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = mpsc::channel(snapshot_buffer.max(1));

    let task = runtime.spawn(controller.run(interval, tick_limit, command_rx, snapshot_tx));

    SimulationHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        task,
    }
}
