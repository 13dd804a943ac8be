pub mod clock;
pub mod runner;

mod sim_tests;

pub use clock::{Command, SimAnimator, SimClock, SimTimer};
pub use runner::{SimController, Simulation};
