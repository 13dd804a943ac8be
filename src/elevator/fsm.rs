/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, error, info};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use super::doors::DoorBarrier;
use super::requests::RequestQueue;
use super::scene::{Interpolator, TimerService};
use crate::config::{DoorRef, ElevatorConfig};
use crate::shared::{Call, Direction, ElevatorState, ElevatorStatus, ExternalRequest, ServedRequest};

/***************************************/
/*               Enums                 */
/***************************************/

/// Continuations handed to the collaborators and fed back through
/// [`ElevatorController::handle_event`] when they are due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The car finished travelling one floor.
    CarArrived { floor: usize },
    /// One door half finished sliding.
    DoorSettled,
    /// The doors of stop `stop` have been open for the dwell time.
    DwellElapsed { stop: u64 },
    /// The idle timer armed with `epoch` fired.
    IdleTimeout { epoch: u64 },
}

/**
 * Dispatch state machine of one elevator car.
 *
 * Calls enqueue requests and run the dispatch policy. Every wait (travel, door animation,
 * dwell, idle timer) is handed to a collaborator together with the `Event` that resumes it, so
 * the controller never blocks and is driven entirely by calls and events on one thread.
 *
 * # Fields
 * - `timer`:               One-shot timer collaborator.
 * - `animator`:            Position interpolation collaborator.
 * - `state_tx`:            Publishes a status snapshot on every state transition.
 * - `served_tx`:           Publishes every request removed after being served.
 * - `heights`:             Floor heights, ground floor first.
 * - `shaft_doors`:         Left/right shaft door pair of each floor.
 * - `car_doors`:           Left/right door pair of the car.
 * - `speed`:               Car travel speed.
 * - `door_open_width`:     Slide distance of each door half.
 * - `door_travel_time`:    Time a door half takes to open or close.
 * - `dwell`:               Time the doors stay open when serving.
 * - `idle_return_delay`:   Idle time before returning to the ground floor.
 * - `door_self_test`:      Cycle the doors once on start.
 * - `requests`:            Pending requests.
 * - `state`:               Current state.
 * - `current_floor`:       Floor the car is at, or departed from while moving.
 * - `serving`:             A stop-and-serve door cycle is in progress.
 * - `serve_direction`:     Heading of the occupants when the current stop began.
 * - `stop_count`:          Number of stops begun so far, used as the id of the latest one.
 * - `open_stop`:           Id of the stop whose served requests are not cleared yet.
 * - `pending_move`:        Travel target waiting for the doors to close.
 * - `doors`:               Join barrier over the door halves in motion.
 * - `idle_epoch`:          Bumped on every request and idle entry; stale idle timers are ignored.
 * - `inert`:               The configuration was rejected and all calls are ignored.
 */
pub struct ElevatorController<T: TimerService, A: Interpolator> {
    // Collaborators
    pub(super) timer: T,
    pub(super) animator: A,

    // Observer channels
    state_tx: cbc::Sender<ElevatorStatus>,
    pub(super) served_tx: cbc::Sender<ServedRequest>,

    // Configuration
    pub(super) heights: Vec<f64>,
    pub(super) shaft_doors: Vec<(DoorRef, DoorRef)>,
    pub(super) car_doors: (DoorRef, DoorRef),
    pub(super) speed: f64,
    pub(super) door_open_width: f64,
    pub(super) door_travel_time: Duration,
    pub(super) dwell: Duration,
    idle_return_delay: Duration,
    door_self_test: bool,

    // Private fields
    pub(super) requests: RequestQueue,
    pub(super) state: ElevatorState,
    pub(super) current_floor: usize,
    pub(super) serving: bool,
    pub(super) serve_direction: Option<Direction>,
    pub(super) stop_count: u64,
    pub(super) open_stop: Option<u64>,
    pub(super) pending_move: Option<usize>,
    pub(super) doors: DoorBarrier,
    idle_epoch: u64,
    inert: bool,
}

impl<T: TimerService, A: Interpolator> ElevatorController<T, A> {
    pub fn new(
        config: &ElevatorConfig,
        timer: T,
        animator: A,
        state_tx: cbc::Sender<ElevatorStatus>,
        served_tx: cbc::Sender<ServedRequest>,
    ) -> ElevatorController<T, A> {
        let inert = match config.validate() {
            Ok(()) => false,
            Err(e) => {
                error!("Elevator configuration rejected, controller disabled: {}", e);
                true
            }
        };

        // An inert controller never computes a duration, so these never see bad values
        let (door_travel_time, dwell, idle_return_delay) = if inert {
            (Duration::ZERO, Duration::ZERO, Duration::ZERO)
        } else {
            (
                config.door_travel_time(),
                config.dwell(),
                config.idle_return_delay(),
            )
        };

        ElevatorController {
            timer,
            animator,
            state_tx,
            served_tx,
            heights: config.floors.iter().map(|floor| floor.height).collect(),
            shaft_doors: config
                .floors
                .iter()
                .map(|floor| (floor.left_door.clone(), floor.right_door.clone()))
                .collect(),
            car_doors: (config.car_left_door.clone(), config.car_right_door.clone()),
            speed: config.speed,
            door_open_width: config.door_open_width,
            door_travel_time,
            dwell,
            idle_return_delay,
            door_self_test: config.door_self_test,
            requests: RequestQueue::new(config.allow_changing_direction_when_occupied),
            state: ElevatorState::DoorsClosed,
            current_floor: 0,
            serving: false,
            serve_direction: None,
            stop_count: 0,
            open_stop: None,
            pending_move: None,
            doors: DoorBarrier::default(),
            idle_epoch: 0,
            inert,
        }
    }

    /// Puts the car and all doors in their initial positions at the ground floor, then runs the
    /// door self-test if enabled.
    pub fn start(&mut self) {
        if self.inert {
            return;
        }

        self.place_scene();
        info!(
            "Elevator started at floor 0 with {} floors",
            self.floor_count()
        );
        self.publish_state();

        if self.door_self_test {
            self.stop_and_serve();
        } else {
            self.dispatch();
        }
    }

    /***************************************/
    /*             Public API              */
    /***************************************/
    pub fn call(&mut self, call: Call) {
        match call {
            Call::Inside(floor) => self.call_from_inside(floor),
            Call::Up(floor) => self.call_up_from_floor(floor),
            Call::Down(floor) => self.call_down_from_floor(floor),
        }
    }

    pub fn call_from_inside(&mut self, floor: usize) {
        if !self.accepts_floor(floor) {
            return;
        }

        if floor == self.current_floor && !self.state.is_moving() {
            match self.state {
                ElevatorState::DoorsClosed if !self.serving => {
                    // Already here, just open up
                    self.idle_epoch += 1;
                    self.stop_and_serve();
                    return;
                }
                ElevatorState::DoorsOpen | ElevatorState::DoorsOpening => {
                    debug!("Ignoring cab call for floor {}, doors already open", floor);
                    return;
                }
                _ => {}
            }
        }

        if !self.requests.push_internal(floor) {
            debug!("Cab call for floor {} already queued", floor);
            return;
        }
        debug!("Cab call queued for floor {}", floor);
        self.idle_epoch += 1;
        self.dispatch();
    }

    pub fn call_up_from_floor(&mut self, floor: usize) {
        self.call_from_floor(floor, Direction::Up);
    }

    pub fn call_down_from_floor(&mut self, floor: usize) {
        self.call_from_floor(floor, Direction::Down);
    }

    pub fn is_moving(&self) -> bool {
        self.state.is_moving()
    }

    pub fn state(&self) -> ElevatorState {
        self.state
    }

    pub fn current_floor(&self) -> usize {
        self.current_floor
    }

    pub fn floor_count(&self) -> usize {
        self.heights.len()
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    pub fn requests(&self) -> &RequestQueue {
        &self.requests
    }

    pub fn status(&self) -> ElevatorStatus {
        ElevatorStatus {
            state: self.state,
            floor: self.current_floor,
            internal_requests: self.requests.internal().to_vec(),
            external_requests: self.requests.external().to_vec(),
        }
    }

    /// Resumes whatever was waiting on `event`.
    pub fn handle_event(&mut self, event: Event) {
        if self.inert {
            return;
        }

        match event {
            Event::CarArrived { floor } => self.on_car_arrived(floor),
            Event::DoorSettled => self.on_door_settled(),
            Event::DwellElapsed { stop } => self.on_dwell_elapsed(stop),
            Event::IdleTimeout { epoch } => self.on_idle_timeout(epoch),
        }
    }

    /***************************************/
    /*           Dispatch policy           */
    /***************************************/
    pub(super) fn dispatch(&mut self) {
        // A move or door cycle is in flight and re-enters here when it completes
        if self.state != ElevatorState::DoorsClosed || self.serving {
            return;
        }

        let direction = self.current_direction();
        if self
            .requests
            .has_pending_for_floor(self.current_floor, direction)
        {
            self.stop_and_serve();
            return;
        }

        if let Some(target) = self.requests.next_target() {
            self.move_toward(target);
            return;
        }

        if self.current_floor != 0 {
            self.idle_epoch += 1;
            let handle = self.timer.schedule_once(
                self.idle_return_delay,
                Event::IdleTimeout {
                    epoch: self.idle_epoch,
                },
            );
            debug!(
                "Idle at floor {}, return timer {:?} armed",
                self.current_floor, handle
            );
        }
    }

    /// Direction used to decide whether a hall call at the current floor is on the way.
    pub(super) fn current_direction(&self) -> Option<Direction> {
        self.requests.heading(self.current_floor)
    }

    pub(super) fn set_state(&mut self, state: ElevatorState) {
        if self.state == state {
            return;
        }
        info!(
            "Floor {}: {:?} -> {:?}",
            self.current_floor, self.state, state
        );
        self.state = state;
        self.publish_state();
    }

    /***************************************/
    /*          Private functions          */
    /***************************************/
    fn call_from_floor(&mut self, floor: usize, direction: Direction) {
        if !self.accepts_floor(floor) {
            return;
        }

        if floor == self.current_floor && self.state.doors_opened() {
            debug!(
                "Ignoring hall call {:?} at floor {}, doors already open",
                direction, floor
            );
            return;
        }

        if !self.requests.push_external(ExternalRequest { floor, direction }) {
            debug!("Hall call {:?} at floor {} already queued", direction, floor);
            return;
        }
        debug!("Hall call {:?} queued at floor {}", direction, floor);
        self.idle_epoch += 1;
        self.dispatch();
    }

    fn accepts_floor(&self, floor: usize) -> bool {
        if self.inert {
            return false;
        }
        if floor >= self.floor_count() {
            debug!("Ignoring call for nonexistent floor {}", floor);
            return false;
        }
        true
    }

    fn on_idle_timeout(&mut self, epoch: u64) {
        let still_idle = epoch == self.idle_epoch
            && self.requests.is_empty()
            && self.state == ElevatorState::DoorsClosed
            && !self.serving
            && self.current_floor != 0;

        if !still_idle {
            debug!("Idle timer {} is stale, ignoring", epoch);
            return;
        }

        info!(
            "Idle at floor {}, returning to ground floor",
            self.current_floor
        );
        self.call_from_inside(0);
    }

    fn publish_state(&self) {
        let _ = self.state_tx.send(self.status());
    }
}
