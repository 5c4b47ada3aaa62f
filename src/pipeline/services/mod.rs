pub mod decision_engine;
pub mod image;
pub mod labels;
pub mod policy;
pub mod proximity;

pub use decision_engine::{DecisionEngine, EngineConfig};
pub use self::image::{BoxOutlineAnnotator, FrameAnnotator};
pub use labels::LabelTable;
pub use policy::{Policy, PolicyEntry, PolicyRegistry};
pub use proximity::{is_actionable, ProximityFilter};
