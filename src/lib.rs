/* Modules */
pub mod config;
pub mod console;
pub mod elevator;
pub mod shared;
pub mod sim;

/* Re-exports */
pub use config::{Config, ElevatorConfig};
pub use elevator::ElevatorController;
pub use shared::{Call, Direction, ElevatorState, ElevatorStatus};
pub use sim::Simulation;
