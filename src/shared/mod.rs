pub mod error;
pub mod macros;
pub mod structs;

pub use error::SimError;
pub use error::SimResult;
pub use structs::Behaviour;
pub use structs::Direction;
pub use structs::LiftState;
pub use structs::Request;
pub use structs::SimEvent;
