/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Direction, SimError, SimResult};
use crate::simulation::Simulation;

/***************************************/
/*       Public data structures        */
/***************************************/
/// A scripted list of hall calls, e.g.
///
/// ```toml
/// [[requests]]
/// at = 0
/// floor = 5
/// direction = "up"
/// ```
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    #[serde(default)]
    pub requests: Vec<ScheduledRequest>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ScheduledRequest {
    #[serde(default)]
    pub at: u64,
    pub floor: u8,
    pub direction: Direction,
}

/***************************************/
/*             Public API              */
/***************************************/
impl Scenario {
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Scenario> {
        let scenario_str = fs::read_to_string(path)?;
        Scenario::parse(&scenario_str)
    }

    pub fn parse(scenario_str: &str) -> SimResult<Scenario> {
        toml::from_str(scenario_str).map_err(|e| SimError::Scenario(e.to_string()))
    }

    pub fn push(&mut self, at: u64, floor: u8, direction: Direction) {
        self.requests.push(ScheduledRequest {
            at,
            floor,
            direction,
        });
    }
}

/// Plays the scenario on the virtual clock, then lets the building drain.
/// Invalid requests are logged and skipped. Returns the final clock value.
pub fn run_scenario(simulation: &mut Simulation, scenario: &Scenario, max_time: u64) -> u64 {
    let mut requests = scenario.requests.clone();
    requests.sort_by_key(|request| request.at);

    for request in requests.iter().filter(|request| request.at <= max_time) {
        simulation.advance_to(request.at);
        match simulation.request_lift(request.floor, request.direction) {
            Ok(true) => {}
            Ok(false) => info!(
                "t={} floor {} going {} already requested",
                request.at, request.floor, request.direction
            ),
            Err(e) => warn!("t={} skipping request: {}", request.at, e),
        }
    }

    simulation.run_until_idle(max_time)
}
