use crate::config::Configuration;
use crate::error::{ConfigurationError, DecisionError};
use crate::pipeline::services::labels::LabelTable;
use crate::pipeline::services::policy::PolicyRegistry;
use crate::pipeline::services::proximity::{is_actionable, ProximityFilter};
use crate::pipeline::types::{ClassId, Detection, VehicleState};
use tracing::{debug, warn};

/// Everything the engine needs, assembled and validated once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub registry: PolicyRegistry,
    pub labels: LabelTable,
    pub proximity: ProximityFilter,
}

impl EngineConfig {
    pub fn new(
        registry: PolicyRegistry,
        labels: LabelTable,
        proximity: ProximityFilter,
    ) -> Result<Self, ConfigurationError> {
        registry.validate_against(&labels)?;
        Ok(Self {
            registry,
            labels,
            proximity,
        })
    }

    /// Loads labels (from `label_path`, or the built-in names) and the
    /// configured policy table, then cross-checks them.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigurationError> {
        configuration.validate()?;
        let labels = match &configuration.label_path {
            Some(path) => LabelTable::load(path)?,
            None => LabelTable::builtin(),
        };
        let registry =
            PolicyRegistry::from_entries(&configuration.policies, configuration.turn_angle)?;
        let proximity = ProximityFilter::new(
            configuration.frame_height,
            configuration.min_height_fraction,
        )?;
        Self::new(registry, labels, proximity)
    }

    /// Labelled classes, in label-file order.
    pub fn classes(&self) -> Vec<ClassId> {
        self.labels.iter().map(|(class_id, _)| class_id).collect()
    }
}

/// Maps one frame's detections to a single vehicle state.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    registry: PolicyRegistry,
    labels: LabelTable,
    proximity: ProximityFilter,
}

impl DecisionEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            registry: config.registry.clone(),
            labels: config.labels.clone(),
            proximity: config.proximity,
        }
    }

    /// Folds `detections` in order starting from a "drive at the limit, go
    /// straight" seed. Each close-by detection replaces the working state with
    /// its policy applied to that seed, discarding whatever earlier detections
    /// set: the last applicable detection wins.
    ///
    /// Malformed detections are dropped. A detection of an unregistered class
    /// fails the whole frame, regardless of its distance.
    pub fn decide(
        &self,
        detections: &[Detection],
        frame_height: u32,
        base_speed_limit: f32,
    ) -> Result<VehicleState, DecisionError> {
        let seed = VehicleState::cruising(base_speed_limit).clamped(base_speed_limit);
        if detections.is_empty() {
            debug!("No objects detected, drive normally");
        }

        let state = detections.iter().try_fold(seed, |state, detection| {
            self.react(seed, state, detection, frame_height)
        })?;

        Ok(state.clamped(base_speed_limit))
    }

    fn react(
        &self,
        seed: VehicleState,
        state: VehicleState,
        detection: &Detection,
        frame_height: u32,
    ) -> Result<VehicleState, DecisionError> {
        let label = self.labels.display_name(detection.class_id);

        if let Err(reason) = detection.validate() {
            warn!("[{}] dropping malformed detection: {}", label, reason);
            return Ok(state);
        }

        let policy = self.registry.policy_for(detection.class_id)?;

        if !is_actionable(detection, frame_height, self.proximity.min_height_fraction()) {
            debug!("[{}] object detected, but it is too far, ignoring.", label);
            return Ok(state);
        }

        debug!(
            "[{}] {:.0}% h={:.0}: applying {}",
            label,
            detection.confidence * 100.0,
            detection.bounding_box.height(),
            policy.as_str()
        );
        Ok(self.registry.apply(policy, seed, detection))
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn proximity(&self) -> &ProximityFilter {
        &self.proximity
    }
}
