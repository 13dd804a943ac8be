/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::info;
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use super::clock::{SimAnimator, SimClock, SimTimer};
use crate::config::{saturating_secs, DoorRef, ElevatorConfig};
use crate::console::ConsoleCommand;
use crate::elevator::{ElevatorController, SceneObject};
use crate::shared::{Call, ElevatorStatus, ServedRequest};

pub type SimController = ElevatorController<SimTimer, SimAnimator>;

/**
 * An elevator controller hosted on a virtual clock.
 *
 * Owns the controller and the clock, delivers due events in order and records every published
 * status and served request together with the virtual time it happened at.
 *
 * # Fields
 * - `controller`:  The controller under simulation.
 * - `clock`:       Virtual clock collecting the controller's timers and animations.
 * - `state_rx`:    Status snapshots published by the controller.
 * - `served_rx`:   Requests served by the controller.
 * - `history`:     Every status snapshot with its timestamp.
 * - `served`:      Every served request with its timestamp.
 * - `recording`:   Whether `history` and `served` are kept. Off in the long-running loop.
 */
pub struct Simulation {
    controller: SimController,
    clock: SimClock,
    state_rx: cbc::Receiver<ElevatorStatus>,
    served_rx: cbc::Receiver<ServedRequest>,
    history: Vec<(Duration, ElevatorStatus)>,
    served: Vec<(Duration, ServedRequest)>,
    recording: bool,
}

impl Simulation {
    pub fn new(config: &ElevatorConfig) -> Simulation {
        let (clock, timer, animator) = SimClock::new();
        let (state_tx, state_rx) = cbc::unbounded::<ElevatorStatus>();
        let (served_tx, served_rx) = cbc::unbounded::<ServedRequest>();

        Simulation {
            controller: ElevatorController::new(config, timer, animator, state_tx, served_tx),
            clock,
            state_rx,
            served_rx,
            history: Vec::new(),
            served: Vec::new(),
            recording: true,
        }
    }

    pub fn start(&mut self) {
        self.controller.start();
        self.collect();
    }

    pub fn call(&mut self, call: Call) {
        self.controller.call(call);
        self.collect();
    }

    /// Runs the simulation forward by `dt`, delivering every event that falls due.
    pub fn advance(&mut self, dt: Duration) {
        let deadline = self.clock.now().saturating_add(dt);
        while let Some(event) = self.clock.next_due(deadline) {
            self.controller.handle_event(event);
            self.collect();
        }
        self.clock.advance_to(deadline);
    }

    pub fn advance_secs(&mut self, seconds: f64) {
        self.advance(Duration::from_secs_f64(seconds));
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn controller(&self) -> &SimController {
        &self.controller
    }

    pub fn status(&self) -> ElevatorStatus {
        self.controller.status()
    }

    pub fn car_height(&self) -> Option<f64> {
        self.clock.position(&SceneObject::Car)
    }

    pub fn door_offset(&self, door: &DoorRef) -> Option<f64> {
        self.clock.position(&SceneObject::Door(door.clone()))
    }

    /// Events still waiting on the clock, idle timers included.
    pub fn pending_events(&mut self) -> usize {
        self.clock.pending()
    }

    pub fn history(&self) -> &[(Duration, ElevatorStatus)] {
        &self.history
    }

    pub fn served(&self) -> &[(Duration, ServedRequest)] {
        &self.served
    }

    /// Turns keeping `history` and `served` on or off. Turning it off clears both.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
        if !recording {
            self.history.clear();
            self.served.clear();
        }
    }

    /// Advances by `elapsed`, then applies `command`. Returns `false` once told to quit.
    pub fn step(
        &mut self,
        elapsed: Duration,
        command: Option<ConsoleCommand>,
        status_tx: &cbc::Sender<ElevatorStatus>,
    ) -> bool {
        // Events that fell due while waiting happened before the command arrived
        self.advance(elapsed);

        match command {
            Some(ConsoleCommand::Call(call)) => self.call(call),
            Some(ConsoleCommand::Status) => {
                let _ = status_tx.send(self.status());
            }
            Some(ConsoleCommand::Quit) => return false,
            None => {}
        }
        true
    }

    /**
     * Runs the simulation against the wall clock until told to quit.
     *
     * Commands arrive on `command_rx`. Virtual time advances by the elapsed wall-clock time
     * scaled by `time_scale`, at least once every `tick`. Status requests are answered on
     * `status_tx`.
     */
    pub fn run(
        mut self,
        command_rx: cbc::Receiver<ConsoleCommand>,
        status_tx: cbc::Sender<ElevatorStatus>,
        time_scale: f64,
        tick: Duration,
    ) {
        self.set_recording(false);
        let mut last = Instant::now();

        loop {
            let command = cbc::select! {
                recv(command_rx) -> command => Some(command.unwrap_or(ConsoleCommand::Quit)),
                default(tick) => None,
            };

            let elapsed = last.elapsed();
            last = Instant::now();
            let scaled = saturating_secs(elapsed.as_secs_f64() * time_scale);
            if !self.step(scaled, command, &status_tx) {
                info!("Elevator simulation stopping");
                return;
            }
        }
    }

    fn collect(&mut self) {
        let now = self.clock.now();
        for status in self.state_rx.try_iter() {
            if self.recording {
                self.history.push((now, status));
            }
        }
        for served in self.served_rx.try_iter() {
            if self.recording {
                self.served.push((now, served));
            }
        }
    }
}
