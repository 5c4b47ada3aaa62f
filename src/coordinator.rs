use crate::{
    actuation::{Actuator, LoggingActuator},
    common::Frame,
    config::Configuration,
    error::{AppError, DetectorError},
    intake::{CandidateFilter, Detector},
    pipeline::{
        services::{BoxOutlineAnnotator, FrameAnnotator},
        CycleOutcome, EngineConfig, VehicleController,
    },
};
use image::RgbImage;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

const ANNOTATED_FRAME_CAPACITY: usize = 4;

/// Counters reported once the control loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlStats {
    pub frames: u64,
    pub committed: u64,
    pub fallbacks: u64,
    pub detector_failures: u64,
    pub actuation_failures: u64,
}

/// One frame at a time: detect, annotate, decide, actuate.
struct ControlLoop {
    controller: VehicleController,
    detector: Box<dyn Detector>,
    actuator: Box<dyn Actuator>,
    annotator: Option<Box<dyn FrameAnnotator>>,
    candidate_filter: CandidateFilter,
    annotated_tx: broadcast::Sender<Arc<RgbImage>>,
    stats: ControlStats,
}

impl ControlLoop {
    async fn step(&mut self, frame: Frame) -> ControlFlow<()> {
        let cycle_start = Instant::now();
        self.stats.frames += 1;

        let raw = match self.detector.detect(&frame).await {
            Ok(raw) => raw,
            Err(DetectorError::SourceClosed) => {
                tracing::info!("Detector {} closed, stopping", self.detector.name());
                return ControlFlow::Break(());
            }
            Err(e) => {
                tracing::warn!("Detector {} failed: {}", self.detector.name(), e);
                self.stats.detector_failures += 1;
                // hold the last committed command
                let current = self.controller.current();
                self.actuate(&current);
                return ControlFlow::Continue(());
            }
        };
        let detections = self.candidate_filter.select(raw);

        if let Some(annotator) = &self.annotator {
            let annotated = annotator.annotate(&frame, &detections);
            // no subscribers is fine
            let _ = self.annotated_tx.send(Arc::new(annotated));
        }

        let outcome = self.controller.process(&detections);
        match &outcome {
            CycleOutcome::Committed(_) => self.stats.committed += 1,
            CycleOutcome::Fallback { .. } => self.stats.fallbacks += 1,
        }
        self.actuate(&outcome.state());

        let elapsed = cycle_start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            tracing::debug!("Frame {}: {:.1} FPS", frame.frame_id(), 1.0 / elapsed);
        }
        ControlFlow::Continue(())
    }

    fn actuate(&mut self, state: &crate::pipeline::VehicleState) {
        if let Err(e) = self.actuator.apply(state) {
            tracing::error!("Actuator {} failed: {}", self.actuator.name(), e);
            self.stats.actuation_failures += 1;
        }
    }

    #[instrument(skip_all, name = "control_loop")]
    async fn run(
        mut self,
        mut frame_rx: mpsc::Receiver<Frame>,
        cancel_token: CancellationToken,
    ) -> ControlStats {
        tracing::info!(
            "Control loop started with detector {}, actuator {} and annotator {}",
            self.detector.name(),
            self.actuator.name(),
            self.annotator.as_ref().map_or("none", |annotator| annotator.name())
        );
        loop {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => break,
                frame = frame_rx.recv() => match frame {
                    Some(frame) => {
                        if self.step(frame).await.is_break() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        tracing::info!("Control loop stopped: {:?}", self.stats);
        self.stats
    }
}

pub struct Coordinator {
    frame_tx: Option<mpsc::Sender<Frame>>,
    control_task: Option<tokio::task::JoinHandle<ControlStats>>,
    annotated_tx: broadcast::Sender<Arc<RgbImage>>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    fn new(frame_buffer_size: usize, control_loop: ControlLoop) -> Self {
        let cancel_token = CancellationToken::new();
        let (frame_tx, frame_rx) = mpsc::channel(frame_buffer_size.max(1));
        let annotated_tx = control_loop.annotated_tx.clone();
        let control_task = tokio::spawn(control_loop.run(frame_rx, cancel_token.clone()));

        Self {
            frame_tx: Some(frame_tx),
            control_task: Some(control_task),
            annotated_tx,
            cancel_token,
        }
    }

    /// Sender for camera frames. The loop drains until every sender is gone.
    pub fn frames(&self) -> Result<mpsc::Sender<Frame>, AppError> {
        self.frame_tx
            .clone()
            .ok_or_else(|| AppError::Pipeline("Frame intake is closed".to_string()))
    }

    pub fn annotated_frames(&self) -> broadcast::Receiver<Arc<RgbImage>> {
        self.annotated_tx.subscribe()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Aborts the loop without draining queued frames.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Closes intake, lets queued frames finish and returns the loop's stats.
    pub async fn shutdown(mut self) -> Result<ControlStats, AppError> {
        self.frame_tx.take();
        let control_task = self
            .control_task
            .take()
            .ok_or_else(|| AppError::Pipeline("Control loop already joined".to_string()))?;
        control_task
            .await
            .map_err(|e| AppError::Pipeline(format!("Control loop panicked: {e}")))
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    engine_config: Option<EngineConfig>,
    detector: Option<Box<dyn Detector>>,
    actuator: Option<Box<dyn Actuator>>,
    annotator: Option<Box<dyn FrameAnnotator>>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            engine_config: None,
            detector: None,
            actuator: None,
            annotator: None,
        }
    }

    // Adjusts the frame buffer size, this will override the configuration.
    pub fn frame_buffer_size(mut self, frame_buffer_size: usize) -> Self {
        self.configuration.frame_buffer_size = frame_buffer_size;
        self
    }

    // Skips loading labels and policies again when the caller already did.
    pub fn engine_config(mut self, engine_config: EngineConfig) -> Self {
        self.engine_config = Some(engine_config);
        self
    }

    pub fn detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    // Defaults to a LoggingActuator when unset.
    pub fn actuator(mut self, actuator: Box<dyn Actuator>) -> Self {
        self.actuator = Some(actuator);
        self
    }

    // Defaults to box outlines when `annotate_frames` is set.
    pub fn annotator(mut self, annotator: Box<dyn FrameAnnotator>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<Coordinator, AppError> {
        let detector = self
            .detector
            .ok_or(AppError::Pipeline("Detector not set".to_string()))?;
        let controller = match &self.engine_config {
            Some(engine_config) => {
                self.configuration.validate()?;
                VehicleController::from_engine_config(engine_config, &self.configuration)
            }
            None => VehicleController::from_configuration(&self.configuration)?,
        };
        let actuator = self
            .actuator
            .unwrap_or_else(|| Box::new(LoggingActuator::new()));
        let annotator = match self.annotator {
            Some(annotator) => Some(annotator),
            None if self.configuration.annotate_frames => {
                Some(Box::new(BoxOutlineAnnotator::default()) as Box<dyn FrameAnnotator>)
            }
            None => None,
        };
        let (annotated_tx, _) = broadcast::channel(ANNOTATED_FRAME_CAPACITY);

        let control_loop = ControlLoop {
            controller,
            detector,
            actuator,
            annotator,
            candidate_filter: CandidateFilter::from_configuration(&self.configuration),
            annotated_tx,
            stats: ControlStats::default(),
        };
        Ok(Coordinator::new(
            self.configuration.frame_buffer_size,
            control_loop,
        ))
    }
}
