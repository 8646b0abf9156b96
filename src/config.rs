/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::info;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Direction, SimError, SimResult};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub building: BuildingConfig,
    pub timing: TimingConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BuildingConfig {
    pub n_floors: u8,
    pub n_lifts: u8,
}

/// Simulation timings, all in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub dispatch_latency: u64,
    pub travel_time_per_floor: u64,
    pub door_open_time: u64,
    pub door_close_time: u64,
    pub retry_delay: u64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            n_floors: 5,
            n_lifts: 2,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            dispatch_latency: 1000,
            travel_time_per_floor: 2000,
            door_open_time: 2500,
            door_close_time: 500,
            retry_delay: 1000,
        }
    }
}

impl BuildingConfig {
    pub fn new(n_floors: u8, n_lifts: u8) -> SimResult<BuildingConfig> {
        let config = BuildingConfig { n_floors, n_lifts };
        config.validate()?;
        Ok(config)
    }

    /// Parses raw user input for the floor and lift counts.
    pub fn parse(floors: &str, lifts: &str) -> SimResult<BuildingConfig> {
        let n_floors = parse_count("floors", floors)?;
        let n_lifts = parse_count("lifts", lifts)?;
        BuildingConfig::new(n_floors, n_lifts)
    }

    /// The top floor has no up button and the ground floor no down button.
    pub fn has_hall_button(&self, floor: u8, direction: Direction) -> bool {
        if floor < 1 || floor > self.n_floors {
            return false;
        }
        match direction {
            Direction::Up => floor < self.n_floors,
            Direction::Down => floor > 1,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.n_floors < 2 {
            return Err(SimError::InvalidConfiguration(format!(
                "a building needs at least two floors, got {}",
                self.n_floors
            )));
        }
        if self.n_lifts < 1 {
            return Err(SimError::InvalidConfiguration(
                "a building needs at least one lift".to_string(),
            ));
        }
        Ok(())
    }
}

impl TimingConfig {
    pub fn validate(&self) -> SimResult<()> {
        // A zero backoff would spin at a single instant of virtual time
        if self.retry_delay == 0 {
            return Err(SimError::InvalidConfiguration(
                "retry_delay must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> SimResult<()> {
        self.building.validate()?;
        self.timing.validate()
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config<P: AsRef<Path>>(path: P) -> SimResult<Config> {
    let path = path.as_ref();
    let config_str = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No configuration at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(e) => return Err(SimError::Io(e)),
    };
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> SimResult<Config> {
    let config: Config = toml::from_str(config_str).map_err(|e| SimError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/***************************************/
/*          Private functions          */
/***************************************/
fn parse_count(name: &str, value: &str) -> SimResult<u8> {
    let value = value.trim();
    match value.parse::<i64>() {
        Ok(n) if n < 1 => Err(SimError::InvalidConfiguration(format!(
            "{} must be a positive number, got {}",
            name, n
        ))),
        Ok(n) => u8::try_from(n).map_err(|_| {
            SimError::InvalidConfiguration(format!("too many {}: {}", name, n))
        }),
        Err(_) => Err(SimError::InvalidConfiguration(format!(
            "{} must be a number, got '{}'",
            name, value
        ))),
    }
}
