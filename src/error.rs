use crate::pipeline::types::ClassId;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Decision Error: {0}")]
    Decision(#[from] DecisionError),
    #[error("Detector Error: {0}")]
    Detector(#[from] DetectorError),
    #[error("Actuation Error: {0}")]
    Actuation(#[from] ActuationError),
    #[error("Pipeline Error: {0}")]
    Pipeline(String),
}

/// Failure of a single frame's decision pass.
///
/// The caller keeps the previously committed vehicle state when this happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    #[error("No policy registered for {0}")]
    UnknownClass(ClassId),
}

/// A detection that cannot be reasoned about. Dropped from the frame, never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedDetection {
    #[error("Bounding box bottom {bottom} is above top {top}")]
    InvertedBox { top: f32, bottom: f32 },
    #[error("Bounding box has a non-finite coordinate")]
    NonFiniteCoordinate,
    #[error("Confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f32),
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Failed to load labels: {0}")]
    Labels(#[from] LabelError),
    #[error("Label '{label}' ({class_id}) has no policy")]
    MissingPolicy { class_id: ClassId, label: String },
    #[error("Policy for {0} is defined more than once")]
    DuplicatePolicy(ClassId),
    #[error("Minimum height fraction {0} must be in (0, 1]")]
    InvalidMinHeightFraction(f32),
    #[error("Frame size {width}x{height} must be non-zero")]
    InvalidFrameSize { width: u32, height: u32 },
    #[error("Speed limit {0} must be finite and non-negative")]
    InvalidSpeedLimit(f32),
    #[error("Turn angle {0} must be finite")]
    InvalidTurnAngle(f32),
    #[error("Minimum confidence {0} must be in [0, 1]")]
    InvalidConfidence(f32),
    #[error("At least one detection per frame must be kept")]
    InvalidMaxDetections,
}

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Failed to read label file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: expected '<id> <name>', got '{content}'")]
    Malformed { line: usize, content: String },
    #[error("Line {line}: '{value}' is not a class id")]
    InvalidClassId { line: usize, value: String },
    #[error("Line {line}: {class_id} is already labelled")]
    Duplicate { line: usize, class_id: ClassId },
}

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("The detection source is closed.")]
    SourceClosed,
}

#[derive(Error, Debug)]
pub enum ActuationError {
    #[error("Command rejected: {0}")]
    Rejected(String),
    #[error("The actuator is disconnected.")]
    Disconnected,
}
