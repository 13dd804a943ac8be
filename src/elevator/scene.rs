/***************************************/
/*           Local modules             */
/***************************************/
use super::fsm::Event;
use crate::config::DoorRef;
use std::time::Duration;

/***************************************/
/*       Public data structures        */
/***************************************/

/// Scene objects the controller moves. The car moves vertically, doors slide sideways.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneObject {
    Car,
    Door(DoorRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/***************************************/
/*            Collaborators            */
/***************************************/

/// One-shot timers. Nothing is ever cancelled; the controller checks whether an event is
/// still relevant when it comes back.
pub trait TimerService {
    /// Hands `event` back to the controller after `delay`.
    fn schedule_once(&mut self, delay: Duration, event: Event) -> TimerHandle;
}

/// Moves scene objects over time. Any number of animations may run at once.
pub trait Interpolator {
    /// Slides `object` from where it is to `target` over `duration`, then hands `done` back
    /// to the controller.
    fn animate_to(&mut self, object: SceneObject, target: f64, duration: Duration, done: Event);

    /// Puts `object` at `position` immediately.
    fn place(&mut self, object: SceneObject, position: f64);
}
