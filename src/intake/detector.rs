use crate::common::Frame;
use crate::config::Configuration;
use crate::error::DetectorError;
use crate::pipeline::types::Detection;
use async_trait::async_trait;

/// Object detector running on the frame, possibly on dedicated hardware.
///
/// The returned detections are fully materialized before any decision starts.
#[async_trait]
pub trait Detector: Send {
    async fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, DetectorError>;
    fn name(&self) -> &'static str;
}

/// Confidence threshold and top-k cut applied to raw detector output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateFilter {
    pub min_confidence: f32,
    pub max_detections: usize,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            min_confidence: 0.30,
            max_detections: 3,
        }
    }
}

impl CandidateFilter {
    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self {
            min_confidence: configuration.min_confidence,
            max_detections: configuration.max_detections,
        }
    }

    /// Keeps the `max_detections` most confident results at or above the
    /// threshold, most confident first.
    pub fn select(&self, mut detections: Vec<Detection>) -> Vec<Detection> {
        detections.retain(|d| d.confidence >= self.min_confidence);
        detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        detections.truncate(self.max_detections);
        detections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{BoundingBox, ClassId};

    fn with_confidence(class_id: u32, confidence: f32) -> Detection {
        Detection::new(
            class_id,
            BoundingBox::from_corners(0.0, 0.0, 10.0, 30.0),
            confidence,
        )
    }

    #[test]
    fn test_select_drops_low_confidence() {
        let filter = CandidateFilter::default();
        let selected = filter.select(vec![
            with_confidence(1, 0.1),
            with_confidence(2, 0.3),
            with_confidence(3, f32::NAN),
        ]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].class_id, ClassId(2));
    }

    #[test]
    fn test_select_keeps_top_k_by_confidence() {
        let filter = CandidateFilter::default();
        let selected = filter.select(vec![
            with_confidence(1, 0.5),
            with_confidence(2, 0.9),
            with_confidence(3, 0.4),
            with_confidence(4, 0.7),
        ]);
        let ids: Vec<_> = selected.iter().map(|d| d.class_id.0).collect();
        assert_eq!(ids, vec![2, 4, 1]);
    }

    #[test]
    fn test_select_empty() {
        assert!(CandidateFilter::default().select(Vec::new()).is_empty());
    }
}
