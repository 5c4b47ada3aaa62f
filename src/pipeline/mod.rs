pub mod controller;
pub mod services;
pub mod types;

pub use controller::{CycleOutcome, VehicleController};
pub use services::{DecisionEngine, EngineConfig, LabelTable, Policy, PolicyRegistry};
pub use types::{BoundingBox, ClassId, Detection, Point, VehicleState};
