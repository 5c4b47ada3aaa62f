pub mod actuator;
pub mod publisher;

pub use actuator::{Actuator, LoggingActuator};
pub use publisher::StatePublisher;
