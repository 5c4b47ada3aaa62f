mod detection;
mod vehicle_state;

pub use detection::{BoundingBox, ClassId, Detection, Point};
pub use vehicle_state::VehicleState;
