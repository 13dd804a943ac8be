/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::{Event, Interpolator, SceneObject, TimerHandle, TimerService};

/***************************************/
/*       Public data structures        */
/***************************************/

/// What the collaborators ask of the clock.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Schedule {
        handle: TimerHandle,
        delay: Duration,
        event: Event,
    },
    Animate {
        object: SceneObject,
        target: f64,
        duration: Duration,
        done: Event,
    },
    Place {
        object: SceneObject,
        position: f64,
    },
}

/// Timer collaborator that forwards every request to a [`SimClock`].
#[derive(Debug, Clone)]
pub struct SimTimer {
    command_tx: cbc::Sender<Command>,
    next_handle: u64,
}

impl SimTimer {
    pub fn new(command_tx: cbc::Sender<Command>) -> SimTimer {
        SimTimer {
            command_tx,
            next_handle: 0,
        }
    }
}

impl TimerService for SimTimer {
    fn schedule_once(&mut self, delay: Duration, event: Event) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        let _ = self.command_tx.send(Command::Schedule {
            handle,
            delay,
            event,
        });
        handle
    }
}

/// Interpolation collaborator that forwards every request to a [`SimClock`].
#[derive(Debug, Clone)]
pub struct SimAnimator {
    command_tx: cbc::Sender<Command>,
}

impl SimAnimator {
    pub fn new(command_tx: cbc::Sender<Command>) -> SimAnimator {
        SimAnimator { command_tx }
    }
}

impl Interpolator for SimAnimator {
    fn animate_to(&mut self, object: SceneObject, target: f64, duration: Duration, done: Event) {
        let _ = self.command_tx.send(Command::Animate {
            object,
            target,
            duration,
            done,
        });
    }

    fn place(&mut self, object: SceneObject, position: f64) {
        let _ = self.command_tx.send(Command::Place { object, position });
    }
}

#[derive(Debug)]
struct Pending {
    due: Duration,
    seq: u64,
    event: Event,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Linear slide of one object between two positions.
#[derive(Debug, Clone, Copy)]
struct Track {
    from: f64,
    to: f64,
    start: Duration,
    end: Duration,
}

impl Track {
    fn at(&self, now: Duration) -> f64 {
        if now >= self.end || self.end <= self.start {
            return self.to;
        }
        if now <= self.start {
            return self.from;
        }
        let t = (now - self.start).as_secs_f64() / (self.end - self.start).as_secs_f64();
        self.from + (self.to - self.from) * t
    }
}

/**
 * Virtual clock standing in for the game engine's frame loop.
 *
 * Collects commands from [`SimTimer`] and [`SimAnimator`], keeps the resulting events ordered by
 * due time (ties in the order they were issued) and tracks where every animated object is.
 *
 * # Fields
 * - `now`:         Current virtual time.
 * - `seq`:         Issue counter for tie-breaking.
 * - `command_rx`:  Commands from the collaborators.
 * - `queue`:       Events waiting for their due time.
 * - `tracks`:      Latest animation of every scene object.
 */
pub struct SimClock {
    now: Duration,
    seq: u64,
    command_rx: cbc::Receiver<Command>,
    queue: BinaryHeap<Reverse<Pending>>,
    tracks: HashMap<SceneObject, Track>,
}

impl SimClock {
    /// Creates a clock and the two collaborators feeding it.
    pub fn new() -> (SimClock, SimTimer, SimAnimator) {
        let (command_tx, command_rx) = cbc::unbounded::<Command>();
        let clock = SimClock {
            now: Duration::ZERO,
            seq: 0,
            command_rx,
            queue: BinaryHeap::new(),
            tracks: HashMap::new(),
        };
        (
            clock,
            SimTimer::new(command_tx.clone()),
            SimAnimator::new(command_tx),
        )
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Position of `object` at the current time, if it has ever been placed or animated.
    pub fn position(&self, object: &SceneObject) -> Option<f64> {
        self.tracks.get(object).map(|track| track.at(self.now))
    }

    /// Number of events not yet delivered.
    pub fn pending(&mut self) -> usize {
        self.drain_commands();
        self.queue.len()
    }

    /// Pops the earliest event due at or before `deadline`, moving the clock to its due time.
    pub fn next_due(&mut self, deadline: Duration) -> Option<Event> {
        self.drain_commands();

        let due = match self.queue.peek() {
            Some(Reverse(pending)) if pending.due <= deadline => pending.due,
            _ => return None,
        };
        let Reverse(pending) = self.queue.pop()?;
        self.now = self.now.max(due);
        Some(pending.event)
    }

    /// Moves the clock forward to `time`. Never moves backwards.
    pub fn advance_to(&mut self, time: Duration) {
        self.drain_commands();
        self.now = self.now.max(time);
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                Command::Schedule { delay, event, .. } => self.push(delay, event),
                Command::Animate {
                    object,
                    target,
                    duration,
                    done,
                } => {
                    let from = self.position(&object).unwrap_or(target);
                    self.tracks.insert(
                        object,
                        Track {
                            from,
                            to: target,
                            start: self.now,
                            end: self.now.saturating_add(duration),
                        },
                    );
                    self.push(duration, done);
                }
                Command::Place { object, position } => {
                    self.tracks.insert(
                        object,
                        Track {
                            from: position,
                            to: position,
                            start: self.now,
                            end: self.now,
                        },
                    );
                }
            }
        }
    }

    fn push(&mut self, delay: Duration, event: Event) {
        self.seq += 1;
        self.queue.push(Reverse(Pending {
            due: self.now.saturating_add(delay),
            seq: self.seq,
            event,
        }));
    }
}
