/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::BuildingConfig;
use crate::shared::Request;
use crate::simulation::Simulation;

/***************************************/
/*               Enums                 */
/***************************************/
/// User input for a running simulation, handled in the order it was sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Request(Request),
    /// Replaces the building and restarts the clock.
    Generate(BuildingConfig),
}

impl Command {
    /// Reads `floor direction` (e.g. `3 up`) or `generate <floors> <lifts>`.
    /// Hall calls are only accepted for buttons that exist in `building`.
    pub fn parse(line: &str, building: &BuildingConfig) -> Result<Command, String> {
        let mut words = line.split_whitespace();
        if words.next() == Some("generate") {
            let floors = words.next().unwrap_or("");
            let lifts = words.next().unwrap_or("");
            return BuildingConfig::parse(floors, lifts)
                .map(Command::Generate)
                .map_err(|e| e.to_string());
        }

        let request = line.parse::<Request>()?;
        if !building.has_hall_button(request.floor, request.direction) {
            return Err(format!(
                "floor {} has no {} button",
                request.floor, request.direction
            ));
        }
        Ok(Command::Request(request))
    }
}

enum Event {
    CommandReceived(Command),
    CommandsClosed,
    Tick,
    Terminate,
}

/**
 * Runs a simulation against the wall clock on its own thread.
 *
 * # Fields
 * - `simulation`:      The run being driven.
 * - `command_rx`:      Hall calls and new buildings from the user.
 * - `terminate_rx`:    Stops the runner.
 * - `tick`:            How often the virtual clock catches up with real time.
 * - `speed`:           Virtual milliseconds per real millisecond.
 */
pub struct SimulationRunner {
    simulation: Simulation,
    command_rx: cbc::Receiver<Command>,
    terminate_rx: cbc::Receiver<()>,
    tick: Duration,
    speed: u64,
}

impl SimulationRunner {
    pub fn new(
        simulation: Simulation,
        command_rx: cbc::Receiver<Command>,
        terminate_rx: cbc::Receiver<()>,
        tick: Duration,
        speed: u64,
    ) -> SimulationRunner {
        SimulationRunner {
            simulation,
            command_rx,
            terminate_rx,
            tick,
            speed: speed.max(1),
        }
    }

    /// Loops until terminated, or until the command channel is closed and the
    /// building has gone idle. Hands the simulation back for reporting.
    pub fn run(mut self) -> Simulation {
        let mut started = Instant::now();
        let mut commands_open = true;

        loop {
            match self.wait_for_event() {
                Event::CommandReceived(Command::Request(request)) => {
                    self.sync_clock(started);
                    if let Err(e) = self.simulation.request_lift(request.floor, request.direction) {
                        warn!("t={} rejected request: {}", self.simulation.now(), e);
                    }
                }

                Event::CommandReceived(Command::Generate(config)) => {
                    match self.simulation.reconfigure(&config) {
                        Ok(()) => {
                            started = Instant::now();
                            info!(
                                "Regenerated building with {} floors and {} lifts",
                                self.simulation.building().n_floors(),
                                self.simulation.building().n_lifts()
                            );
                        }
                        Err(e) => warn!("Kept the current building: {}", e),
                    }
                }

                Event::CommandsClosed => {
                    info!("Command channel closed, finishing pending work");
                    commands_open = false;
                    self.command_rx = cbc::never();
                }

                Event::Tick => {
                    self.sync_clock(started);
                    if !commands_open && self.simulation.is_idle() {
                        break;
                    }
                }

                Event::Terminate => {
                    info!("Simulation runner terminated");
                    break;
                }
            }
        }

        self.simulation
    }

    fn wait_for_event(&self) -> Event {
        cbc::select! {
            recv(self.command_rx) -> command => {
                match command {
                    Ok(command) => Event::CommandReceived(command),
                    Err(_) => Event::CommandsClosed,
                }
            },

            recv(self.terminate_rx) -> _ => Event::Terminate,

            default(self.tick) => Event::Tick,
        }
    }

    fn sync_clock(&mut self, started: Instant) {
        let elapsed = started.elapsed().as_millis() as u64;
        self.simulation.advance_to(elapsed.saturating_mul(self.speed));
    }
}
