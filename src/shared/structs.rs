/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::cmp::Ordering;

/***************************************/
/*       Public data structures        */
/***************************************/

/// Direction a hall call wants to travel in, or a car is heading in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Direction of travel from `from` to `to`, `None` when they are the same floor.
    pub fn between(from: usize, to: usize) -> Option<Direction> {
        match to.cmp(&from) {
            Ordering::Greater => Some(Direction::Up),
            Ordering::Less => Some(Direction::Down),
            Ordering::Equal => None,
        }
    }
}

/**
 * State of the car.
 *
 * Exactly one variant holds at any time. The car only ever leaves `DoorsClosed` to start
 * moving, and every trip ends in `DoorsClosed` again.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ElevatorState {
    #[default]
    DoorsClosed,
    DoorsOpening,
    DoorsOpen,
    DoorsClosing,
    MovingUp,
    MovingDown,
}

impl ElevatorState {
    pub fn moving(direction: Direction) -> ElevatorState {
        match direction {
            Direction::Up => ElevatorState::MovingUp,
            Direction::Down => ElevatorState::MovingDown,
        }
    }

    pub fn is_moving(&self) -> bool {
        matches!(self, ElevatorState::MovingUp | ElevatorState::MovingDown)
    }

    /// True while the doors are open or on their way to open.
    pub fn doors_opened(&self) -> bool {
        matches!(self, ElevatorState::DoorsOpen | ElevatorState::DoorsOpening)
    }
}

/// A hall call: someone on `floor` wants to go `direction`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExternalRequest {
    pub floor: usize,
    pub direction: Direction,
}

/// A request removed from the queue after the car stopped for it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServedRequest {
    Internal(usize),
    External(ExternalRequest),
}

/// One of the three public calls, as it arrives from a button or the console.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Call {
    Inside(usize),
    Up(usize),
    Down(usize),
}

/// Snapshot of the controller, published on every state transition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ElevatorStatus {
    pub state: ElevatorState,
    pub floor: usize,
    #[serde(rename = "internalRequests")]
    pub internal_requests: Vec<usize>,
    #[serde(rename = "externalRequests")]
    pub external_requests: Vec<ExternalRequest>,
}
