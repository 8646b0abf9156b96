pub mod runner;
pub mod scenario;
pub mod simulation;
pub mod simulation_tests;
pub mod stats;

pub use runner::Command;
pub use runner::SimulationRunner;
pub use scenario::run_scenario;
pub use scenario::Scenario;
pub use simulation::Simulation;
pub use stats::Stats;
