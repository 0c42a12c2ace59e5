pub mod amount;
pub mod csv;
pub mod engine;
pub mod gateway;
pub mod model;

pub use amount::Amount;
pub use engine::{BookingError, Engine, EngineConfig};
pub use model::{BookingId, Command, Height, PropertyId};
