pub mod actuation;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod intake;
pub mod pipeline;

pub use crate::config::Configuration;
pub use coordinator::{ControlStats, Coordinator, CoordinatorBuilder};
pub use error::{AppError, ConfigurationError, DecisionError, MalformedDetection};
pub use pipeline::{
    BoundingBox, ClassId, CycleOutcome, DecisionEngine, Detection, EngineConfig, LabelTable,
    Point, Policy, PolicyRegistry, VehicleController, VehicleState,
};
