pub mod macros;
pub mod structs;

pub use structs::Call;
pub use structs::Direction;
pub use structs::ElevatorState;
pub use structs::ElevatorStatus;
pub use structs::ExternalRequest;
pub use structs::ServedRequest;
