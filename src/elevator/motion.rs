use log::{debug, warn};
use std::time::Duration;

use super::fsm::{ElevatorController, Event};
use super::scene::{Interpolator, SceneObject, TimerService};
use crate::config::saturating_secs;
use crate::shared::{Direction, ElevatorState};

/// Time to travel between two heights at `speed`. Validated configurations never saturate.
pub fn travel_time(from: f64, to: f64, speed: f64) -> Duration {
    saturating_secs((to - from).abs() / speed)
}

impl<T: TimerService, A: Interpolator> ElevatorController<T, A> {
    /// Travels one floor toward `target`. The car stops at every floor on the way so the
    /// dispatch policy can re-evaluate.
    pub(crate) fn move_toward(&mut self, target: usize) {
        if self.state.is_moving() {
            return;
        }
        if target >= self.floor_count() {
            warn!("Refusing to move toward nonexistent floor {}", target);
            return;
        }
        let direction = match Direction::between(self.current_floor, target) {
            Some(direction) => direction,
            None => return,
        };

        match self.state {
            ElevatorState::DoorsClosed => {}
            ElevatorState::DoorsOpen | ElevatorState::DoorsClosing => {
                // Travel resumes once the doors are shut
                self.pending_move = Some(target);
                self.close_doors();
                return;
            }
            _ => {
                debug!("Cannot move while doors are {:?}", self.state);
                return;
            }
        }

        let next = match direction {
            Direction::Up => self.current_floor + 1,
            Direction::Down => self.current_floor - 1,
        };
        let duration = travel_time(
            self.heights[self.current_floor],
            self.heights[next],
            self.speed,
        );

        self.set_state(ElevatorState::moving(direction));
        self.animator.animate_to(
            SceneObject::Car,
            self.heights[next],
            duration,
            Event::CarArrived { floor: next },
        );
    }

    pub(super) fn on_car_arrived(&mut self, floor: usize) {
        if !self.state.is_moving() || floor >= self.floor_count() {
            warn!("Unexpected arrival at floor {} while {:?}", floor, self.state);
            return;
        }

        self.current_floor = floor;
        self.set_state(ElevatorState::DoorsClosed);
        self.dispatch();
    }

    /// Snaps the car to the ground floor and closes every door.
    pub(super) fn place_scene(&mut self) {
        self.animator.place(SceneObject::Car, self.heights[0]);

        let (car_left, car_right) = self.car_doors.clone();
        self.animator.place(SceneObject::Door(car_left), 0.0);
        self.animator.place(SceneObject::Door(car_right), 0.0);
        for (left, right) in self.shaft_doors.clone() {
            self.animator.place(SceneObject::Door(left), 0.0);
            self.animator.place(SceneObject::Door(right), 0.0);
        }
    }
}
