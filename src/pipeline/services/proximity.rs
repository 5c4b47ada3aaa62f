use crate::error::ConfigurationError;
use crate::pipeline::types::Detection;

pub const DEFAULT_MIN_HEIGHT_FRACTION: f32 = 0.05;

/// Whether `detection` is tall enough in the frame to be acted upon.
///
/// Distant objects look small; anything whose box covers no more than
/// `min_height_fraction` of the frame height is ignored. Zero-height boxes and
/// a zero `frame_height` are never actionable.
pub fn is_actionable(detection: &Detection, frame_height: u32, min_height_fraction: f32) -> bool {
    if frame_height == 0 {
        return false;
    }
    let object_height = detection.bounding_box.height();
    object_height / frame_height as f32 > min_height_fraction
}

/// Validated frame height and threshold the engine judges proximity with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityFilter {
    frame_height: u32,
    min_height_fraction: f32,
}

impl ProximityFilter {
    pub fn new(frame_height: u32, min_height_fraction: f32) -> Result<Self, ConfigurationError> {
        if frame_height == 0 {
            return Err(ConfigurationError::InvalidFrameSize {
                width: 0,
                height: frame_height,
            });
        }
        Self::check_fraction(min_height_fraction)?;
        Ok(Self {
            frame_height,
            min_height_fraction,
        })
    }

    pub fn check_fraction(min_height_fraction: f32) -> Result<(), ConfigurationError> {
        if min_height_fraction > 0.0 && min_height_fraction <= 1.0 {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidMinHeightFraction(
                min_height_fraction,
            ))
        }
    }

    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    pub fn min_height_fraction(&self) -> f32 {
        self.min_height_fraction
    }
}
