use super::Detector;
use crate::common::Frame;
use crate::error::DetectorError;
use crate::pipeline::types::Detection;
use async_trait::async_trait;
use std::collections::VecDeque;

/// Replays pre-recorded detections, one list per frame.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDetector {
    script: VecDeque<Result<Vec<Detection>, String>>,
}

impl ScriptedDetector {
    pub fn new(frames: impl IntoIterator<Item = Vec<Detection>>) -> Self {
        Self {
            script: frames.into_iter().map(Ok).collect(),
        }
    }

    pub fn then(mut self, detections: Vec<Detection>) -> Self {
        self.script.push_back(Ok(detections));
        self
    }

    /// Queues an inference failure for the next frame.
    pub fn then_fail(mut self, reason: impl Into<String>) -> Self {
        self.script.push_back(Err(reason.into()));
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    async fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, DetectorError> {
        match self.script.pop_front() {
            Some(Ok(detections)) => Ok(detections),
            Some(Err(reason)) => Err(DetectorError::Inference(reason)),
            None => Err(DetectorError::SourceClosed),
        }
    }

    fn name(&self) -> &'static str {
        "ScriptedDetector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::BoundingBox;

    #[tokio::test]
    async fn test_replays_in_order_then_closes() {
        let red = Detection::new(7, BoundingBox::from_corners(0.0, 0.0, 10.0, 30.0), 0.9);
        let mut detector = ScriptedDetector::new([vec![red]])
            .then_fail("tpu timeout")
            .then(Vec::new());
        let frame = Frame::blank(4, 4);

        assert_eq!(detector.detect(&frame).await.unwrap(), vec![red]);
        assert!(matches!(
            detector.detect(&frame).await,
            Err(DetectorError::Inference(_))
        ));
        assert!(detector.detect(&frame).await.unwrap().is_empty());
        assert_eq!(detector.remaining(), 0);
        assert!(matches!(
            detector.detect(&frame).await,
            Err(DetectorError::SourceClosed)
        ));
    }
}
