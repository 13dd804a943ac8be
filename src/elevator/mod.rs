pub mod doors;
pub mod fsm;
pub mod motion;
pub mod requests;
pub mod scene;


pub use fsm::ElevatorController;
pub use fsm::Event;
pub use requests::RequestQueue;
pub use scene::{Interpolator, SceneObject, TimerHandle, TimerService};
