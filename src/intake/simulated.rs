use super::Detector;
use crate::common::Frame;
use crate::error::DetectorError;
use crate::pipeline::types::{BoundingBox, ClassId, Detection};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

const MAX_OBJECTS_PER_FRAME: usize = 4;

/// Emulates a road-object detector by fabricating plausible detections.
#[derive(Debug, Clone)]
pub struct SimulatedDetector {
    rng: StdRng,
    classes: Vec<ClassId>,
}

impl SimulatedDetector {
    pub fn new(classes: Vec<ClassId>, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            classes,
        }
    }

    fn fabricate(&mut self, width: f32, height: f32) -> Option<Detection> {
        if width < 2.0 || height < 2.0 {
            return None;
        }
        let ClassId(class_id) = *self.classes.choose(&mut self.rng)?;
        let box_height = self.rng.random_range(1.0..(height / 3.0).max(2.0));
        let box_width = self.rng.random_range(1.0..(width / 4.0).max(2.0));
        let x = self.rng.random_range(0.0..(width - box_width).max(1.0));
        let y = self.rng.random_range(0.0..(height - box_height).max(1.0));
        Some(Detection::new(
            class_id,
            BoundingBox::from_corners(x, y, x + box_width, y + box_height),
            self.rng.random_range(0.05..1.0),
        ))
    }
}

#[async_trait]
impl Detector for SimulatedDetector {
    async fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, DetectorError> {
        let (width, height) = (frame.width() as f32, frame.height() as f32);
        let count = self.rng.random_range(0..=MAX_OBJECTS_PER_FRAME);
        Ok((0..count)
            .filter_map(|_| self.fabricate(width, height))
            .collect())
    }

    fn name(&self) -> &'static str {
        "SimulatedDetector"
    }
}
