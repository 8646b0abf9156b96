/*
 * Unit tests for the simulation module
 *
 * The unit tests follows the Arrange, Act, Assert pattern. Time is driven by
 * advancing the virtual clock, so no test sleeps except the runner test.
 *
 * Tests:
 * - test_simulation_boundary_configuration
 * - test_simulation_request_dedup
 * - test_simulation_rejects_invalid_request
 * - test_simulation_accepts_end_floor_calls
 * - test_simulation_idle_lift_assignment
 * - test_simulation_event_sequence
 * - test_simulation_round_trip
 * - test_simulation_two_requests_two_lifts
 * - test_simulation_direction_affinity
 * - test_simulation_release_reassigns_committed_lift
 * - test_simulation_release_drops_commitment
 * - test_simulation_starvation_free
 * - test_simulation_reconfigure
 * - test_scenario_run
 * - test_command_parse
 * - test_runner_serves_request
 * - test_runner_generates_new_building
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod simulation_tests {
    use crate::config::{BuildingConfig, Config, TimingConfig};
    use crate::shared::Behaviour::{DoorClosing, Idle, Moving};
    use crate::shared::Direction::{Down, Up};
    use crate::shared::{Request, SimError, SimEvent};
    use crate::simulation::{run_scenario, Command, Scenario, Simulation, SimulationRunner, Stats};
    use crossbeam_channel::{unbounded, Receiver};
    use std::thread::Builder;
    use std::time::Duration;

    fn setup_simulation(n_floors: u8, n_lifts: u8) -> (Simulation, Receiver<SimEvent>) {
        let (event_tx, event_rx) = unbounded::<SimEvent>();
        let config = Config {
            building: BuildingConfig { n_floors, n_lifts },
            timing: TimingConfig::default(),
        };
        (Simulation::new(&config, event_tx).unwrap(), event_rx)
    }

    #[test]
    fn test_simulation_boundary_configuration() {
        // Purpose: Verify that single-floor and lift-less buildings are rejected

        // Arrange
        let (event_tx, _event_rx) = unbounded::<SimEvent>();
        let single_floor = Config {
            building: BuildingConfig { n_floors: 1, n_lifts: 3 },
            timing: TimingConfig::default(),
        };
        let no_lifts = Config {
            building: BuildingConfig { n_floors: 5, n_lifts: 0 },
            timing: TimingConfig::default(),
        };

        // Act
        let single_floor = Simulation::new(&single_floor, event_tx.clone());
        let no_lifts = Simulation::new(&no_lifts, event_tx);

        // Assert
        assert!(matches!(single_floor, Err(SimError::InvalidConfiguration(_))));
        assert!(matches!(no_lifts, Err(SimError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_simulation_request_dedup() {
        // Purpose: Verify that pressing the same hall button twice queues one request

        // Arrange
        let (mut simulation, event_rx) = setup_simulation(5, 1);
        simulation.request_lift(2, Up).unwrap();

        // Act
        let first = simulation.request_lift(4, Up).unwrap();
        let second = simulation.request_lift(4, Up).unwrap();

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(simulation.queue().active_count(Up), 2);
        assert_eq!(simulation.queue().pending(Up).collect::<Vec<_>>(), vec![4]);
        let presses = event_rx
            .try_iter()
            .filter(|event| matches!(event, SimEvent::RequestButtonStateChanged { floor: 4, active: true, .. }))
            .count();
        assert_eq!(presses, 1);
    }

    #[test]
    fn test_simulation_rejects_invalid_request() {
        // Purpose: Verify that floors outside the building are rejected without touching the queue

        // Arrange
        let (mut simulation, event_rx) = setup_simulation(5, 1);

        // Act
        let results = vec![
            simulation.request_lift(0, Up),
            simulation.request_lift(6, Down),
            simulation.request_lift(200, Up),
        ];

        // Assert
        for result in results {
            assert!(matches!(result, Err(SimError::InvalidRequest { .. })));
        }
        assert!(simulation.queue().is_empty());
        assert!(simulation.is_idle());
        assert!(event_rx.try_recv().is_err());
    }

    #[test]
    fn test_simulation_accepts_end_floor_calls() {
        // Purpose: Verify that the core accepts any direction at the top and ground floors

        // Arrange
        let (mut simulation, _event_rx) = setup_simulation(5, 2);

        // Act
        let top_up = simulation.request_lift(5, Up);
        let ground_down = simulation.request_lift(1, Down);

        // Assert
        assert!(top_up.unwrap());
        assert!(ground_down.unwrap());
        let lifts = simulation.building().lifts();
        assert_eq!(lifts[0].target, Some(5));
        assert_eq!(lifts[1].target, Some(1));
    }

    #[test]
    fn test_simulation_idle_lift_assignment() {
        // Purpose: Verify that a request moves one idle lift and leaves the other alone

        // Arrange
        let (mut simulation, _event_rx) = setup_simulation(5, 2);

        // Act
        simulation.request_lift(5, Up).unwrap();

        // Assert
        let lifts = simulation.building().lifts();
        assert_eq!(lifts[0].behaviour, Moving);
        assert!(lifts[0].busy);
        assert_eq!(lifts[0].direction, Some(Up));
        assert_eq!(lifts[0].target, Some(5));
        assert_eq!(lifts[1].behaviour, Idle);
        assert!(!lifts[1].busy);
        assert_eq!(lifts[1].direction, None);
    }

    #[test]
    fn test_simulation_event_sequence() {
        // Purpose: Verify the timing of one trip from request to doors closing

        // Arrange
        let (mut simulation, event_rx) = setup_simulation(5, 1);

        // Act
        simulation.request_lift(3, Up).unwrap();
        let end = simulation.run_until_idle(60_000);

        // Assert
        let events: Vec<SimEvent> = event_rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                SimEvent::RequestButtonStateChanged { at_ms: 0, floor: 3, direction: Up, active: true },
                SimEvent::LiftPositionChanged { at_ms: 1000, lift: 0, floor: 3, duration_ms: 4000 },
                SimEvent::DoorStateChanged { at_ms: 5000, lift: 0, open: true },
                SimEvent::DoorStateChanged { at_ms: 7500, lift: 0, open: false },
                SimEvent::RequestButtonStateChanged { at_ms: 7500, floor: 3, direction: Up, active: false },
            ]
        );
        assert_eq!(end, 8000);
        assert_eq!(simulation.building().lifts()[0].floor, 3);
        assert_eq!(simulation.stats(), Stats { served: 1, total_wait_ms: 7500, max_wait_ms: 7500 });
    }

    #[test]
    fn test_simulation_round_trip() {
        // Purpose: Verify that a floor stays requested until its doors close, and can be requested again after

        // Arrange
        let (mut simulation, _event_rx) = setup_simulation(5, 1);
        simulation.request_lift(3, Up).unwrap();

        // Act
        simulation.advance_to(7499);
        let during_dwell = simulation.request_lift(3, Up).unwrap();
        simulation.advance_to(7500);
        let after_service = simulation.request_lift(3, Up).unwrap();

        // Assert
        assert!(!during_dwell);
        assert!(after_service);
        assert!(simulation.queue().is_active(3, Up));
        assert_eq!(simulation.building().lifts()[0].target, Some(3));
    }

    #[test]
    fn test_simulation_two_requests_two_lifts() {
        // Purpose: Verify that back-to-back requests are spread over both idle lifts

        // Arrange
        let (mut simulation, _event_rx) = setup_simulation(5, 2);

        // Act
        simulation.request_lift(5, Up).unwrap();
        simulation.request_lift(3, Up).unwrap();

        // Assert
        let lifts = simulation.building().lifts();
        assert_eq!(lifts[0].target, Some(5));
        assert_eq!(lifts[1].target, Some(3));

        // Act
        let end = simulation.run_until_idle(60_000);

        // Assert
        let lifts = simulation.building().lifts();
        assert_eq!(lifts[0].floor, 5);
        assert_eq!(lifts[1].floor, 3);
        assert!(lifts.iter().all(|lift| !lift.busy && lift.direction.is_none()));
        assert_eq!(end, 12_000);
        assert_eq!(simulation.stats(), Stats { served: 2, total_wait_ms: 19_000, max_wait_ms: 11_500 });
    }

    #[test]
    fn test_simulation_direction_affinity() {
        // Purpose: Verify that a down request waits while the only lift is committed to going up

        // Arrange
        let (mut simulation, _event_rx) = setup_simulation(6, 1);
        simulation.request_lift(5, Up).unwrap();

        // Act
        simulation.request_lift(3, Down).unwrap();
        simulation.advance_to(11_499);

        // Assert
        let lift = &simulation.building().lifts()[0];
        assert_eq!(lift.direction, Some(Up));
        assert_eq!(lift.target, Some(5));
        assert_eq!(simulation.queue().pending(Down).collect::<Vec<_>>(), vec![3]);

        // Act
        simulation.advance_by(501);

        // Assert
        let lift = &simulation.building().lifts()[0];
        assert!(lift.busy);
        assert_eq!(lift.direction, Some(Down));
        assert_eq!(lift.target, Some(3));
        assert_eq!(simulation.queue().pending_count(Down), 0);
    }

    #[test]
    fn test_simulation_release_reassigns_committed_lift() {
        // Purpose: Verify that a lift stays committed while the doors close and then takes the next floor in its direction

        // Arrange
        let (mut simulation, _event_rx) = setup_simulation(5, 1);
        simulation.request_lift(2, Up).unwrap();
        simulation.request_lift(4, Up).unwrap();

        // Act
        simulation.advance_to(5500);

        // Assert
        let lift = &simulation.building().lifts()[0];
        assert_eq!(lift.behaviour, DoorClosing);
        assert!(lift.busy);
        assert_eq!(lift.direction, Some(Up));
        assert_eq!(lift.floor, 2);

        // Act
        simulation.advance_to(6000);

        // Assert
        let lift = &simulation.building().lifts()[0];
        assert_eq!(lift.behaviour, Moving);
        assert!(lift.busy);
        assert_eq!(lift.direction, Some(Up));
        assert_eq!(lift.target, Some(4));
        assert_eq!(simulation.queue().pending_count(Up), 0);

        // Act
        simulation.run_until_idle(60_000);

        // Assert
        assert_eq!(simulation.stats().served, 2);
        assert_eq!(simulation.building().lifts()[0].floor, 4);
        assert_eq!(simulation.building().lifts()[0].direction, None);
    }

    #[test]
    fn test_simulation_release_drops_commitment() {
        // Purpose: Verify that a released lift drops its direction when another lift already serves the remaining floor

        // Arrange
        let (mut simulation, _event_rx) = setup_simulation(10, 2);
        simulation.request_lift(2, Up).unwrap();
        simulation.request_lift(9, Up).unwrap();

        // Act
        simulation.advance_to(5500);

        // Assert
        let lifts = simulation.building().lifts();
        assert_eq!(lifts[0].behaviour, DoorClosing);
        assert_eq!(lifts[0].direction, Some(Up));
        assert_eq!(lifts[1].target, Some(9));

        // Act
        simulation.advance_to(6000);

        // Assert
        let lifts = simulation.building().lifts();
        assert_eq!(lifts[0].behaviour, Idle);
        assert!(!lifts[0].busy);
        assert_eq!(lifts[0].direction, None);
        assert_eq!(lifts[0].target, None);
        assert!(lifts[1].busy);
        assert_eq!(lifts[1].direction, Some(Up));
        assert!(simulation.queue().is_active(9, Up));
    }

    #[test]
    fn test_simulation_starvation_free() {
        // Purpose: Verify that every accepted request is eventually served by a single lift

        // Arrange
        let (mut simulation, event_rx) = setup_simulation(6, 1);
        let requests = [(2, Up), (3, Up), (4, Up), (5, Down), (6, Down), (2, Down), (1, Up)];
        for (floor, direction) in requests {
            assert!(simulation.request_lift(floor, direction).unwrap());
        }

        // Act
        let end = simulation.run_until_idle(1_000_000);

        // Assert
        assert!(end < 1_000_000);
        assert!(simulation.is_idle());
        assert_eq!(simulation.stats().served, requests.len() as u64);
        let released = event_rx
            .try_iter()
            .filter(|event| matches!(event, SimEvent::RequestButtonStateChanged { active: false, .. }))
            .count();
        assert_eq!(released, requests.len());
        let lift = &simulation.building().lifts()[0];
        assert_eq!(lift.behaviour, Idle);
        assert_eq!(lift.direction, None);
    }

    #[test]
    fn test_simulation_reconfigure() {
        // Purpose: Verify that reconfiguring starts a fresh run and a bad configuration keeps the old one

        // Arrange
        let (mut simulation, _event_rx) = setup_simulation(5, 2);
        simulation.request_lift(4, Up).unwrap();
        simulation.advance_to(3000);

        // Act
        let rejected = simulation.reconfigure(&BuildingConfig { n_floors: 1, n_lifts: 2 });

        // Assert
        assert!(matches!(rejected, Err(SimError::InvalidConfiguration(_))));
        assert_eq!(simulation.now(), 3000);
        assert!(simulation.queue().is_active(4, Up));

        // Act
        simulation.reconfigure(&BuildingConfig { n_floors: 8, n_lifts: 3 }).unwrap();

        // Assert
        assert_eq!(simulation.now(), 0);
        assert_eq!(simulation.building().n_floors(), 8);
        assert_eq!(simulation.building().n_lifts(), 3);
        assert!(simulation.queue().is_empty());
        assert!(simulation.is_idle());
    }

    #[test]
    fn test_scenario_run() {
        // Purpose: Verify that a scripted scenario is played in time order and invalid calls are skipped

        // Arrange
        let (mut simulation, _event_rx) = setup_simulation(5, 2);
        let scenario = Scenario::parse(
            r#"
            [[requests]]
            at = 3000
            floor = 2
            direction = "down"

            [[requests]]
            at = 0
            floor = 4
            direction = "up"

            [[requests]]
            at = 3000
            floor = 5
            direction = "up"

            [[requests]]
            at = 3000
            floor = 9
            direction = "up"
            "#,
        )
        .unwrap();

        // Act
        let end = run_scenario(&mut simulation, &scenario, 600_000);

        // Assert
        assert!(simulation.is_idle());
        assert_eq!(simulation.stats().served, 3);
        let lifts = simulation.building().lifts();
        assert_eq!(lifts[0].floor, 4);
        assert_eq!(lifts[1].floor, 5);
        assert_eq!(end, 19_000);
    }

    #[test]
    fn test_command_parse() {
        // Purpose: Verify that user input only produces hall calls for buttons that exist

        // Arrange
        let building = BuildingConfig { n_floors: 5, n_lifts: 2 };

        // Act
        let call = Command::parse("3 up", &building);
        let generate = Command::parse("generate 8 3", &building);
        let top_up = Command::parse("5 up", &building);
        let ground_down = Command::parse("1:down", &building);
        let outside = Command::parse("7 down", &building);
        let bad_building = Command::parse("generate 1 3", &building);
        let garbage = Command::parse("lift please", &building);

        // Assert
        assert_eq!(call, Ok(Command::Request(Request { floor: 3, direction: Up })));
        assert_eq!(generate, Ok(Command::Generate(BuildingConfig { n_floors: 8, n_lifts: 3 })));
        assert!(top_up.is_err());
        assert!(ground_down.is_err());
        assert!(outside.is_err());
        assert!(bad_building.is_err());
        assert!(garbage.is_err());
    }

    #[test]
    fn test_runner_serves_request() {
        // Purpose: Verify that the real-time runner serves a request and stops once the input closes

        // Arrange
        let (event_tx, event_rx) = unbounded::<SimEvent>();
        let (command_tx, command_rx) = unbounded::<Command>();
        let (terminate_tx, terminate_rx) = unbounded::<()>();
        let simulation = Simulation::new(&Config::default(), event_tx).unwrap();
        let runner = SimulationRunner::new(
            simulation,
            command_rx,
            terminate_rx,
            Duration::from_millis(1),
            1000,
        );
        let runner_thread = Builder::new()
            .name("simulation_runner".into())
            .spawn(move || runner.run())
            .unwrap();

        // Act
        command_tx.send(Command::Request(Request { floor: 3, direction: Up })).unwrap();
        drop(command_tx);

        // Assert
        let mut doors_opened = false;
        while let Ok(event) = event_rx.recv_timeout(Duration::from_secs(5)) {
            if let SimEvent::DoorStateChanged { lift: 0, open: true, .. } = event {
                doors_opened = true;
                break;
            }
        }
        assert!(doors_opened, "Timed out waiting for the doors to open");

        let simulation = runner_thread.join().unwrap();
        assert_eq!(simulation.stats().served, 1);
        assert!(simulation.is_idle());

        // Cleanup
        drop(terminate_tx);
    }

    #[test]
    fn test_runner_generates_new_building() {
        // Purpose: Verify that a generate command replaces the building before later hall calls are handled

        // Arrange
        let (event_tx, event_rx) = unbounded::<SimEvent>();
        let (command_tx, command_rx) = unbounded::<Command>();
        let (terminate_tx, terminate_rx) = unbounded::<()>();
        let simulation = Simulation::new(&Config::default(), event_tx).unwrap();
        let runner = SimulationRunner::new(
            simulation,
            command_rx,
            terminate_rx,
            Duration::from_millis(1),
            1000,
        );
        let runner_thread = Builder::new()
            .name("simulation_runner".into())
            .spawn(move || runner.run())
            .unwrap();

        // Act
        command_tx.send(Command::Generate(BuildingConfig { n_floors: 1, n_lifts: 1 })).unwrap();
        command_tx.send(Command::Generate(BuildingConfig { n_floors: 8, n_lifts: 3 })).unwrap();
        command_tx.send(Command::Request(Request { floor: 7, direction: Up })).unwrap();
        drop(command_tx);

        // Assert
        let mut reached = false;
        while let Ok(event) = event_rx.recv_timeout(Duration::from_secs(5)) {
            if let SimEvent::LiftPositionChanged { lift: 0, floor: 7, .. } = event {
                reached = true;
                break;
            }
        }
        assert!(reached, "Timed out waiting for a lift to head to floor 7");

        let simulation = runner_thread.join().unwrap();
        assert_eq!(simulation.building().n_floors(), 8);
        assert_eq!(simulation.building().n_lifts(), 3);
        assert_eq!(simulation.stats().served, 1);

        // Cleanup
        drop(terminate_tx);
    }
}
