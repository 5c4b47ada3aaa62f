use crate::config::Configuration;
use crate::error::{ConfigurationError, DecisionError};
use crate::pipeline::services::{DecisionEngine, EngineConfig};
use crate::pipeline::types::{Detection, VehicleState};

/// Result of one control cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The frame's decision became the new committed state.
    Committed(VehicleState),
    /// The decision failed; the previous committed state stays in effect.
    Fallback {
        state: VehicleState,
        error: DecisionError,
    },
}

impl CycleOutcome {
    /// The state actuation should act on after this cycle.
    pub fn state(&self) -> VehicleState {
        match self {
            CycleOutcome::Committed(state) => *state,
            CycleOutcome::Fallback { state, .. } => *state,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CycleOutcome::Fallback { .. })
    }
}

/// Owns the committed vehicle state across frames.
///
/// Every frame is decided from a fresh seed at the configured speed limit,
/// never from the committed state. The committed state is only what a failed
/// frame falls back to. It starts stopped, so a failure before the first
/// successful decision holds a stop.
#[derive(Debug, Clone)]
pub struct VehicleController {
    engine: DecisionEngine,
    current: VehicleState,
    speed_limit: f32,
}

impl VehicleController {
    /// Frames are judged against the engine's configured frame height.
    pub fn new(engine: DecisionEngine, speed_limit: f32) -> Self {
        Self {
            engine,
            current: VehicleState::stopped(),
            speed_limit,
        }
    }

    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigurationError> {
        let engine_config = EngineConfig::from_configuration(configuration)?;
        Ok(Self::from_engine_config(&engine_config, configuration))
    }

    /// Reuses an already loaded engine config; only the speed limit is read
    /// from `configuration`.
    pub fn from_engine_config(engine_config: &EngineConfig, configuration: &Configuration) -> Self {
        Self::new(DecisionEngine::new(engine_config), configuration.speed_limit)
    }

    pub fn current(&self) -> VehicleState {
        self.current
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn process(&mut self, detections: &[Detection]) -> CycleOutcome {
        let frame_height = self.engine.proximity().frame_height();
        match self
            .engine
            .decide(detections, frame_height, self.speed_limit)
        {
            Ok(state) => {
                tracing::debug!(
                    "Current Speed = {:.1}, New Speed = {:.1}, Heading = {:+.1}",
                    self.current.speed,
                    state.speed,
                    state.heading_delta
                );
                self.current = state;
                CycleOutcome::Committed(state)
            }
            Err(error) => {
                tracing::warn!(
                    "Decision failed ({}), keeping speed {:.1} and heading {:+.1}",
                    error,
                    self.current.speed,
                    self.current.heading_delta
                );
                CycleOutcome::Fallback {
                    state: self.current,
                    error,
                }
            }
        }
    }
}
