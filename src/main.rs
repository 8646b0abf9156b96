/* 3rd party libraries */
use clap::{Arg, ArgMatches, Command};
use crossbeam_channel as cbc;
use log::{info, warn};
use std::io::{self, BufRead};
use std::thread::Builder;
use std::time::Duration;

/* Custom libraries */
use config::BuildingConfig;
use presenter::ConsolePresenter;
use shared::{Request, SimEvent};
use simulation::{run_scenario, Command as RunnerCommand, Scenario, Simulation, SimulationRunner, Stats};

/* Modules */
#[macro_use]
mod shared;
mod building;
mod config;
mod dispatcher;
mod elevator;
mod presenter;
mod requests;
mod scheduler;
mod simulation;

fn cli() -> Command<'static> {
    Command::new("lift-sim")
        .about("Simulates hall calls being dispatched to the lifts of a building")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .takes_value(true)
                .default_value("config.toml")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("floors")
                .long("floors")
                .takes_value(true)
                .help("Number of floors, overrides the configuration file"),
        )
        .arg(
            Arg::new("lifts")
                .long("lifts")
                .takes_value(true)
                .help("Number of lifts, overrides the configuration file"),
        )
        .arg(
            Arg::new("request")
                .long("request")
                .short('r')
                .takes_value(true)
                .multiple_occurrences(true)
                .help("Hall call at t=0 as floor:direction, e.g. 5:up"),
        )
        .arg(
            Arg::new("scenario")
                .long("scenario")
                .takes_value(true)
                .help("TOML file with timed hall calls"),
        )
        .arg(
            Arg::new("max-time")
                .long("max-time")
                .takes_value(true)
                .default_value("600000")
                .help("Virtual time limit in milliseconds"),
        )
        .arg(
            Arg::new("realtime")
                .long("realtime")
                .help("Run against the wall clock, reading 'floor direction' lines from stdin"),
        )
        .arg(
            Arg::new("speed")
                .long("speed")
                .takes_value(true)
                .default_value("1")
                .help("Real-time speed multiplier"),
        )
        .arg(Arg::new("json").long("json").help("Print events as JSON lines"))
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = cli().get_matches();

    // Load the configuration
    let mut config = unwrap_or_exit!(
        config::load_config(matches.value_of("config").unwrap_or("config.toml")),
        "Failed to load configuration"
    );
    if matches.is_present("floors") || matches.is_present("lifts") {
        let floors = matches
            .value_of("floors")
            .map(str::to_string)
            .unwrap_or_else(|| config.building.n_floors.to_string());
        let lifts = matches
            .value_of("lifts")
            .map(str::to_string)
            .unwrap_or_else(|| config.building.n_lifts.to_string());
        config.building = unwrap_or_exit!(
            BuildingConfig::parse(&floors, &lifts),
            "Cannot generate building"
        );
    }
    let json = matches.is_present("json");

    // Start the presenter
    let (event_tx, event_rx) = cbc::unbounded::<SimEvent>();
    let presenter = ConsolePresenter::new(event_rx, json);
    let presenter_thread = unwrap_or_exit!(
        Builder::new()
            .name("presenter".into())
            .spawn(move || presenter.run()),
        "Failed to start presenter thread"
    );

    // Generate the building
    let simulation = unwrap_or_exit!(
        Simulation::new(&config, event_tx),
        "Cannot generate building"
    );

    let stats = if matches.is_present("realtime") {
        run_realtime(simulation, config.building, &matches)
    } else {
        run_batch(simulation, config.building, &matches)
    };

    // The presenter stops once the simulation and its senders are gone
    if presenter_thread.join().is_err() {
        warn!("Presenter thread panicked");
    }
    report(&stats, json);
}

fn run_batch(mut simulation: Simulation, building: BuildingConfig, matches: &ArgMatches) -> Stats {
    let max_time = unwrap_or_exit!(
        matches.value_of("max-time").unwrap_or("600000").parse::<u64>(),
        "Invalid --max-time"
    );

    let mut scenario = match matches.value_of("scenario") {
        Some(path) => unwrap_or_exit!(Scenario::load(path), "Cannot read scenario"),
        None => Scenario::default(),
    };
    if let Some(values) = matches.values_of("request") {
        for value in values {
            let request = unwrap_or_exit!(value.parse::<Request>(), "Invalid --request");
            if !building.has_hall_button(request.floor, request.direction) {
                warn!("Floor {} has no {} button, ignoring", request.floor, request.direction);
                continue;
            }
            scenario.push(0, request.floor, request.direction);
        }
    }

    let end = run_scenario(&mut simulation, &scenario, max_time);
    info!("Simulation finished at t={} ms", end);
    simulation.stats()
}

fn run_realtime(simulation: Simulation, building: BuildingConfig, matches: &ArgMatches) -> Stats {
    let speed = unwrap_or_exit!(
        matches.value_of("speed").unwrap_or("1").parse::<u64>(),
        "Invalid --speed"
    );

    let (command_tx, command_rx) = cbc::unbounded::<RunnerCommand>();
    let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();

    let runner = SimulationRunner::new(
        simulation,
        command_rx,
        terminate_rx,
        Duration::from_millis(20),
        speed,
    );
    let runner_thread = unwrap_or_exit!(
        Builder::new()
            .name("simulation_runner".into())
            .spawn(move || runner.run()),
        "Failed to start simulation runner"
    );

    info!("Enter hall calls as 'floor direction' (e.g. '3 up'), 'generate <floors> <lifts>' for a new building, 'quit' to stop");
    let mut building = building;
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "q" {
            let _ = terminate_tx.send(());
            break;
        }

        let command = match RunnerCommand::parse(line, &building) {
            Ok(command) => command,
            Err(e) => {
                warn!("Could not read '{}': {}", line, e);
                continue;
            }
        };
        if let RunnerCommand::Generate(config) = command {
            building = config;
        }
        if command_tx.send(command).is_err() {
            break;
        }
    }
    drop(command_tx);

    match runner_thread.join() {
        Ok(simulation) => simulation.stats(),
        Err(_) => {
            warn!("Simulation runner panicked");
            Stats::default()
        }
    }
}

fn report(stats: &Stats, json: bool) {
    if json {
        match serde_json::to_string(stats) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to serialize statistics: {}", e),
        }
        return;
    }

    println!("Requests served: {}", stats.served);
    if let Some(average) = stats.average_wait_ms() {
        println!("Average wait:    {} ms", average);
        println!("Longest wait:    {} ms", stats.max_wait_ms);
    }
}
