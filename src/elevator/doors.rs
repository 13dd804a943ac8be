use log::{debug, warn};

use super::fsm::{ElevatorController, Event};
use super::scene::{Interpolator, SceneObject, TimerService};
use crate::shared::ElevatorState;

/// Joins the door halves started together. The door state only flips once all of them have
/// reported in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DoorBarrier {
    remaining: usize,
}

impl DoorBarrier {
    pub fn arm(&mut self, halves: usize) {
        self.remaining = halves;
    }

    /// Records one finished half. Returns `true` when it was the last one.
    pub fn arrive(&mut self) -> bool {
        match self.remaining {
            0 => false,
            1 => {
                self.remaining = 0;
                true
            }
            _ => {
                self.remaining -= 1;
                false
            }
        }
    }
}

impl<T: TimerService, A: Interpolator> ElevatorController<T, A> {
    /// Opens the doors, holds them for the dwell time, clears what was served here, closes
    /// and dispatches again.
    pub(crate) fn stop_and_serve(&mut self) {
        if self.serving || self.state != ElevatorState::DoorsClosed {
            return;
        }
        self.serving = true;
        self.serve_direction = self.current_direction();
        self.stop_count += 1;
        self.open_stop = Some(self.stop_count);
        self.open_doors();
    }

    pub(crate) fn open_doors(&mut self) {
        match self.state {
            ElevatorState::DoorsClosed => {}
            ElevatorState::DoorsOpen | ElevatorState::DoorsOpening => return,
            state => {
                debug!("Ignoring door open while {:?}", state);
                return;
            }
        }

        self.set_state(ElevatorState::DoorsOpening);
        self.slide_doors(self.door_open_width);
    }

    pub(crate) fn close_doors(&mut self) {
        match self.state {
            ElevatorState::DoorsOpen => {}
            ElevatorState::DoorsClosed | ElevatorState::DoorsClosing => return,
            state => {
                debug!("Ignoring door close while {:?}", state);
                return;
            }
        }

        self.set_state(ElevatorState::DoorsClosing);
        self.slide_doors(0.0);
    }

    pub(super) fn on_door_settled(&mut self) {
        if !self.doors.arrive() {
            return;
        }

        match self.state {
            ElevatorState::DoorsOpening => {
                self.set_state(ElevatorState::DoorsOpen);
                if let Some(stop) = self.open_stop {
                    self.timer.schedule_once(self.dwell, Event::DwellElapsed { stop });
                }
            }
            ElevatorState::DoorsClosing => {
                // A stop cut short by a move still counts as served
                self.clear_stop();
                self.set_state(ElevatorState::DoorsClosed);
                self.serving = false;
                match self.pending_move.take() {
                    Some(target) => self.move_toward(target),
                    None => self.dispatch(),
                }
            }
            state => warn!("Doors settled while {:?}", state),
        }
    }

    pub(super) fn on_dwell_elapsed(&mut self, stop: u64) {
        if self.open_stop != Some(stop) {
            debug!("Dwell of stop {} is stale, ignoring", stop);
            return;
        }
        if self.state != ElevatorState::DoorsOpen {
            warn!("Dwell elapsed while {:?}", self.state);
            return;
        }

        self.clear_stop();
        self.close_doors();
    }

    /// Removes and publishes what the open stop served. Does nothing once it has been cleared.
    fn clear_stop(&mut self) {
        if self.open_stop.take().is_none() {
            return;
        }

        // Cab calls made during the dwell must not change what this stop was for
        let direction = self.serve_direction;
        for served in self.requests.pop_served(self.current_floor, direction) {
            debug!("Served {:?} at floor {}", served, self.current_floor);
            let _ = self.served_tx.send(served);
        }
    }

    /// Moves both halves of the car doors and of the current floor's shaft doors so that each
    /// half sits `offset` away from the centre.
    fn slide_doors(&mut self, offset: f64) {
        let (car_left, car_right) = self.car_doors.clone();
        let (shaft_left, shaft_right) = self.shaft_doors[self.current_floor].clone();
        let halves = [
            (car_left, -offset),
            (car_right, offset),
            (shaft_left, -offset),
            (shaft_right, offset),
        ];

        self.doors.arm(halves.len());
        for (door, target) in halves {
            self.animator.animate_to(
                SceneObject::Door(door),
                target,
                self.door_travel_time,
                Event::DoorSettled,
            );
        }
    }
}
