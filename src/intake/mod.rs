pub mod detector;
pub mod scripted;
pub mod simulated;

pub use detector::{CandidateFilter, Detector};
pub use scripted::ScriptedDetector;
pub use simulated::SimulatedDetector;
