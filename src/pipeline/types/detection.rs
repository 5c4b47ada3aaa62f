use crate::error::MalformedDetection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a known traffic-object class, as emitted by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.0)
    }
}

/// Pixel coordinate, origin at the top-left of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box given by its top-left and bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: Point,
    pub bottom: Point,
}

impl BoundingBox {
    pub fn new(top: Point, bottom: Point) -> Self {
        Self { top, bottom }
    }

    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    pub fn width(&self) -> f32 {
        self.bottom.x - self.top.x
    }

    pub fn height(&self) -> f32 {
        self.bottom.y - self.top.y
    }

    pub fn validate(&self) -> Result<(), MalformedDetection> {
        let coords = [self.top.x, self.top.y, self.bottom.x, self.bottom.y];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(MalformedDetection::NonFiniteCoordinate);
        }
        if self.bottom.y < self.top.y {
            return Err(MalformedDetection::InvertedBox {
                top: self.top.y,
                bottom: self.bottom.y,
            });
        }
        Ok(())
    }
}

/// One classified, localized object reported by the detector for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: ClassId,
    pub bounding_box: BoundingBox,
    pub confidence: f32,
}

impl Detection {
    /// `class_id` is the raw label id produced by the detector.
    pub fn new(class_id: u32, bounding_box: BoundingBox, confidence: f32) -> Self {
        Self {
            class_id: ClassId(class_id),
            bounding_box,
            confidence,
        }
    }

    /// Checks the box geometry and that confidence lies in [0, 1].
    pub fn validate(&self) -> Result<(), MalformedDetection> {
        self.bounding_box.validate()?;
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(MalformedDetection::ConfidenceOutOfRange(self.confidence));
        }
        Ok(())
    }
}
