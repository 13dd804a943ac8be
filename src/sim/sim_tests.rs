/*
 * Scenario tests for the elevator controller on a virtual clock
 *
 * The tests follows the Arrange, Act, Assert pattern. Times are virtual seconds since start.
 *
 * Tests:
 * - test_door_self_test_on_start
 * - test_hall_call_travels_floor_by_floor
 * - test_duplicate_cab_calls
 * - test_idle_return_to_ground_floor
 * - test_request_before_idle_timeout_cancels_return
 * - test_hall_call_ignored_while_doors_open
 * - test_cab_call_while_closing_reopens_doors
 * - test_cab_call_during_dwell_keeps_stop_direction
 * - test_dispatch_order_is_fifo
 * - test_occupied_car_skips_opposite_hall_call
 * - test_occupied_car_may_change_direction_when_allowed
 * - test_invariants_under_load
 * - test_step_delivers_due_events_before_command
 * - test_step_status_and_quit
 * - test_recording_off_keeps_no_history
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod sim_tests {
    use crate::config::{DoorRef, ElevatorConfig};
    use crate::console::ConsoleCommand;
    use crossbeam_channel::unbounded;
    use crate::shared::Call::{Down, Inside, Up};
    use crate::shared::Direction;
    use crate::shared::ElevatorState::{self, DoorsClosed, DoorsClosing, DoorsOpen, DoorsOpening, MovingDown, MovingUp};
    use crate::shared::{Call, ExternalRequest, ServedRequest};
    use crate::sim::Simulation;
    use std::time::Duration;

    fn setup_simulation(heights: &[f64], door_self_test: bool) -> Simulation {
        let mut config = ElevatorConfig::with_heights(heights);
        config.door_self_test = door_self_test;
        let mut sim = Simulation::new(&config);
        sim.start();
        sim
    }

    /// Advances the simulation to `seconds` after start.
    fn run_until(sim: &mut Simulation, seconds: f64) {
        let target = Duration::from_secs_f64(seconds);
        sim.advance(target.saturating_sub(sim.now()));
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("object has a position");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    /// (seconds, state, floor) of every published transition.
    fn transitions(sim: &Simulation) -> Vec<(f64, ElevatorState, usize)> {
        sim.history()
            .iter()
            .map(|(at, status)| (at.as_secs_f64(), status.state, status.floor))
            .collect()
    }

    fn served(sim: &Simulation) -> Vec<ServedRequest> {
        sim.served().iter().map(|(_, request)| *request).collect()
    }

    fn hall(floor: usize, direction: Direction) -> ServedRequest {
        ServedRequest::External(ExternalRequest { floor, direction })
    }

    #[test]
    fn test_door_self_test_on_start() {
        // Purpose: The doors cycle once at startup and the car then rests closed at floor 0

        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0], true);

        // Act
        run_until(&mut sim, 20.0);

        // Assert
        assert_eq!(
            transitions(&sim),
            vec![
                (0.0, DoorsClosed, 0),
                (0.0, DoorsOpening, 0),
                (2.0, DoorsOpen, 0),
                (7.0, DoorsClosing, 0),
                (9.0, DoorsClosed, 0),
            ]
        );
        assert!(served(&sim).is_empty());
        assert_eq!(sim.pending_events(), 0);
    }

    #[test]
    fn test_hall_call_travels_floor_by_floor() {
        // Purpose: Up call to floor 2 from floor 0, one floor per move, then a full door cycle

        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0], false);

        // Act
        sim.call(Up(2));
        run_until(&mut sim, 0.5);
        assert_eq!(sim.controller().state(), MovingUp);
        assert_close(sim.car_height(), 2.0);

        run_until(&mut sim, 3.0);
        assert_eq!(sim.controller().state(), DoorsOpening);
        assert_close(sim.car_height(), 8.0);

        // Car and shaft doors move together, other floors stay shut
        assert_close(sim.door_offset(&DoorRef::new("car-left")), -1.0);
        assert_close(sim.door_offset(&DoorRef::new("shaft-2-left")), -1.0);
        assert_close(sim.door_offset(&DoorRef::new("car-right")), 1.0);
        assert_close(sim.door_offset(&DoorRef::new("shaft-2-right")), 1.0);
        assert_close(sim.door_offset(&DoorRef::new("shaft-0-left")), 0.0);

        run_until(&mut sim, 12.0);

        // Assert
        assert_eq!(
            transitions(&sim),
            vec![
                (0.0, DoorsClosed, 0),
                (0.0, MovingUp, 0),
                (1.0, DoorsClosed, 1),
                (1.0, MovingUp, 1),
                (2.0, DoorsClosed, 2),
                (2.0, DoorsOpening, 2),
                (4.0, DoorsOpen, 2),
                (9.0, DoorsClosing, 2),
                (11.0, DoorsClosed, 2),
            ]
        );
        assert_eq!(sim.controller().current_floor(), 2);
        assert!(sim.controller().requests().is_empty());
        assert_eq!(
            sim.served(),
            &[(Duration::from_secs(9), hall(2, Direction::Up))]
        );
        assert_close(sim.door_offset(&DoorRef::new("shaft-2-left")), 0.0);
    }

    #[test]
    fn test_duplicate_cab_calls() {
        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0], false);

        // Act
        sim.call(Inside(1));
        sim.call(Inside(1));

        // Assert
        assert_eq!(sim.controller().requests().internal(), &[1]);

        // Up and down calls at one floor are kept apart
        sim.call(Up(2));
        sim.call(Down(2));
        sim.call(Up(2));
        assert_eq!(sim.controller().requests().external().len(), 2);
    }

    /// Serves a cab call to floor 1, leaving the car idle there from t=10.
    fn rest_at_floor_one() -> Simulation {
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0], false);
        sim.call(Inside(1));
        run_until(&mut sim, 10.0);
        assert_eq!(sim.controller().current_floor(), 1);
        assert_eq!(sim.controller().state(), DoorsClosed);
        assert!(sim.controller().requests().is_empty());
        sim
    }

    #[test]
    fn test_idle_return_to_ground_floor() {
        // Arrange
        let mut sim = rest_at_floor_one();

        // Act & Assert
        run_until(&mut sim, 14.9);
        assert_eq!(sim.controller().state(), DoorsClosed);
        assert_eq!(sim.controller().current_floor(), 1);

        run_until(&mut sim, 15.5);
        assert_eq!(sim.controller().state(), MovingDown);

        run_until(&mut sim, 30.0);
        assert_eq!(sim.controller().current_floor(), 0);
        assert_eq!(sim.controller().state(), DoorsClosed);
        assert_eq!(
            served(&sim),
            vec![ServedRequest::Internal(1), ServedRequest::Internal(0)]
        );

        // Nothing left to do at the ground floor
        assert_eq!(sim.pending_events(), 0);
    }

    #[test]
    fn test_request_before_idle_timeout_cancels_return() {
        // Arrange
        let mut sim = rest_at_floor_one();

        // Act
        run_until(&mut sim, 12.0);
        sim.call(Inside(2));
        run_until(&mut sim, 15.5);

        // Assert
        assert_eq!(sim.controller().current_floor(), 2);
        assert_eq!(sim.controller().state(), DoorsOpen);

        run_until(&mut sim, 22.5);
        assert_eq!(sim.controller().current_floor(), 2);
        assert_eq!(sim.controller().state(), DoorsClosed);
        assert!(sim.controller().requests().is_empty());
        assert!(transitions(&sim)
            .iter()
            .all(|&(_, state, _)| state != MovingDown));

        // A fresh idle period still ends at the ground floor
        run_until(&mut sim, 27.5);
        assert_eq!(sim.controller().state(), MovingDown);
    }

    #[test]
    fn test_hall_call_ignored_while_doors_open() {
        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0], true);
        run_until(&mut sim, 3.0);
        assert_eq!(sim.controller().state(), DoorsOpen);

        // Act
        sim.call(Up(0));
        sim.call(Inside(0));

        // Assert
        assert!(sim.controller().requests().is_empty());
        run_until(&mut sim, 20.0);
        assert_eq!(sim.controller().state(), DoorsClosed);
        assert_eq!(sim.controller().current_floor(), 0);
        assert!(served(&sim).is_empty());
    }

    #[test]
    fn test_cab_call_while_closing_reopens_doors() {
        // Purpose: A cab call for the current floor made while the doors close is queued and
        // served by a second door cycle

        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0], false);
        sim.call(Inside(1));
        run_until(&mut sim, 9.0);
        assert_eq!(sim.controller().state(), DoorsClosing);

        // Act
        sim.call(Inside(1));

        // Assert
        assert_eq!(sim.controller().requests().internal(), &[1]);
        assert_eq!(sim.controller().state(), DoorsClosing);

        run_until(&mut sim, 19.5);
        assert_eq!(
            &transitions(&sim)[5..],
            &[
                (8.0, DoorsClosing, 1),
                (10.0, DoorsClosed, 1),
                (10.0, DoorsOpening, 1),
                (12.0, DoorsOpen, 1),
                (17.0, DoorsClosing, 1),
                (19.0, DoorsClosed, 1),
            ]
        );
        assert_eq!(
            sim.served(),
            &[
                (Duration::from_secs(8), ServedRequest::Internal(1)),
                (Duration::from_secs(17), ServedRequest::Internal(1)),
            ]
        );
        assert!(sim.controller().requests().is_empty());
    }

    #[test]
    fn test_cab_call_during_dwell_keeps_stop_direction() {
        // Purpose: The hall call cleared by a stop follows the heading the car had when it
        // stopped, not one set by a cab call made during the dwell

        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0, 12.0], false);
        sim.call(Inside(1));
        sim.call(Down(1));
        sim.call(Up(1));
        run_until(&mut sim, 5.0);
        assert_eq!(sim.controller().state(), DoorsOpen);
        assert_eq!(sim.controller().current_floor(), 1);

        // Act
        sim.call(Inside(3));
        assert_eq!(sim.controller().requests().internal(), &[1, 3]);

        // Assert
        run_until(&mut sim, 8.5);
        assert_eq!(
            sim.served(),
            &[
                (Duration::from_secs(8), ServedRequest::Internal(1)),
                (Duration::from_secs(8), hall(1, Direction::Down)),
            ]
        );
        assert_eq!(
            sim.controller().requests().external(),
            &[ExternalRequest {
                floor: 1,
                direction: Direction::Up,
            }]
        );

        // The up call is picked up by a second stop on the way to floor 3
        run_until(&mut sim, 30.5);
        assert_eq!(
            sim.served(),
            &[
                (Duration::from_secs(8), ServedRequest::Internal(1)),
                (Duration::from_secs(8), hall(1, Direction::Down)),
                (Duration::from_secs(17), hall(1, Direction::Up)),
                (Duration::from_secs(28), ServedRequest::Internal(3)),
            ]
        );
        assert_eq!(sim.controller().current_floor(), 3);
        assert!(sim.controller().requests().is_empty());
    }

    #[test]
    fn test_dispatch_order_is_fifo() {
        // Purpose: The oldest cab request is served first even when a later one is closer

        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0, 12.0], false);
        sim.call(Inside(2));
        run_until(&mut sim, 11.5);
        assert_eq!(sim.controller().current_floor(), 2);

        // Act
        sim.call(Inside(0));
        sim.call(Inside(3));

        // Assert
        assert_eq!(sim.controller().state(), MovingDown);
        run_until(&mut sim, 36.0);
        assert_eq!(
            served(&sim),
            vec![
                ServedRequest::Internal(2),
                ServedRequest::Internal(0),
                ServedRequest::Internal(3),
            ]
        );
        assert_eq!(sim.controller().current_floor(), 3);
    }

    #[test]
    fn test_occupied_car_skips_opposite_hall_call() {
        // Purpose: Passengers going up are not stopped for someone waiting to go down

        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0, 12.0], false);

        // Act
        sim.call(Inside(3));
        sim.call(Down(1));
        run_until(&mut sim, 25.0);

        // Assert
        assert_eq!(
            sim.served(),
            &[
                (Duration::from_secs(10), ServedRequest::Internal(3)),
                (Duration::from_secs(21), hall(1, Direction::Down)),
            ]
        );
        assert!(transitions(&sim)
            .iter()
            .all(|&(at, state, floor)| !(state == DoorsOpening && floor == 1 && at < 10.0)));
    }

    #[test]
    fn test_occupied_car_may_change_direction_when_allowed() {
        // Arrange
        let mut config = ElevatorConfig::with_heights(&[0.0, 4.0, 8.0, 12.0]);
        config.door_self_test = false;
        config.allow_changing_direction_when_occupied = true;
        let mut sim = Simulation::new(&config);
        sim.start();

        // Act
        sim.call(Inside(3));
        sim.call(Down(1));
        run_until(&mut sim, 25.0);

        // Assert
        assert_eq!(
            served(&sim),
            vec![hall(1, Direction::Down), ServedRequest::Internal(3)]
        );
    }

    #[test]
    fn test_invariants_under_load() {
        // Purpose: Check the state machine invariants over a busy, scripted run

        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0, 12.0, 16.0], true);
        let script: [(f64, Call); 9] = [
            (0.0, Inside(4)),
            (0.5, Up(2)),
            (1.5, Down(3)),
            (2.0, Inside(1)),
            (7.0, Up(0)),
            (7.0, Down(4)),
            (12.0, Inside(2)),
            (12.0, Inside(2)),
            (12.0, Inside(9)),
        ];

        // Act
        for (at, call) in script {
            run_until(&mut sim, at);
            sim.call(call);
        }
        run_until(&mut sim, 400.0);

        // Assert
        let history = sim.history();
        let mut previous = DoorsClosed;
        for (at, status) in history {
            assert!(status.floor < 5, "floor out of range at {:?}", at);
            if status.state.is_moving() {
                assert_eq!(previous, DoorsClosed, "started moving from {:?} at {:?}", previous, at);
            }
            if previous.is_moving() {
                assert_eq!(status.state, DoorsClosed, "left a move into {:?} at {:?}", status.state, at);
            }
            if status.state == DoorsOpen {
                assert_eq!(previous, DoorsOpening);
            }
            if status.state == DoorsClosing {
                assert_eq!(previous, DoorsOpen);
            }

            let mut internal = status.internal_requests.clone();
            internal.sort_unstable();
            internal.dedup();
            assert_eq!(internal.len(), status.internal_requests.len());
            let external = &status.external_requests;
            for (i, request) in external.iter().enumerate() {
                assert!(!external[i + 1..].contains(request));
            }

            previous = status.state;
        }

        // Everything was served and the car went home
        let served = served(&sim);
        for expected in [
            ServedRequest::Internal(4),
            ServedRequest::Internal(1),
            ServedRequest::Internal(2),
            hall(2, Direction::Up),
            hall(3, Direction::Down),
            hall(4, Direction::Down),
        ] {
            assert!(served.contains(&expected), "{:?} never served", expected);
        }
        assert!(sim.controller().requests().is_empty());
        assert_eq!(sim.controller().state(), DoorsClosed);
        assert_eq!(sim.controller().current_floor(), 0);
        assert_eq!(sim.pending_events(), 0);
    }

    #[test]
    fn test_step_delivers_due_events_before_command() {
        // Purpose: Events that fell due during the wait are handled before the command

        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0], false);
        let (status_tx, _status_rx) = unbounded();
        sim.call(Inside(2));

        // Act
        let running = sim.step(
            Duration::from_secs_f64(1.5),
            Some(ConsoleCommand::Call(Inside(1))),
            &status_tx,
        );

        // Assert
        assert!(running);
        assert_eq!(sim.now(), Duration::from_secs_f64(1.5));
        assert_eq!(sim.controller().state(), MovingUp);
        assert_eq!(sim.controller().requests().internal(), &[2, 1]);

        // The car had already passed floor 1, so floor 2 is served first
        run_until(&mut sim, 20.0);
        assert_eq!(
            sim.served(),
            &[
                (Duration::from_secs(9), ServedRequest::Internal(2)),
                (Duration::from_secs(19), ServedRequest::Internal(1)),
            ]
        );
    }

    #[test]
    fn test_step_status_and_quit() {
        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0], false);
        let (status_tx, status_rx) = unbounded();

        // Act & Assert
        assert!(sim.step(Duration::ZERO, None, &status_tx));
        assert!(status_rx.try_recv().is_err());

        assert!(sim.step(Duration::ZERO, Some(ConsoleCommand::Status), &status_tx));
        let status = status_rx.try_recv().unwrap();
        assert_eq!(status.state, DoorsClosed);
        assert_eq!(status.floor, 0);

        assert!(!sim.step(Duration::ZERO, Some(ConsoleCommand::Quit), &status_tx));
    }

    #[test]
    fn test_recording_off_keeps_no_history() {
        // Arrange
        let mut sim = setup_simulation(&[0.0, 4.0, 8.0], false);
        assert!(!sim.history().is_empty());

        // Act
        sim.set_recording(false);
        sim.call(Inside(1));
        run_until(&mut sim, 10.0);

        // Assert
        assert!(sim.history().is_empty());
        assert!(sim.served().is_empty());
        assert_eq!(sim.controller().current_floor(), 1);
        assert!(sim.controller().requests().is_empty());
    }
}
