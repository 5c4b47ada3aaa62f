use crate::error::ConfigurationError;
use crate::pipeline::services::policy::PolicyEntry;
use crate::pipeline::services::proximity::{ProximityFilter, DEFAULT_MIN_HEIGHT_FRACTION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "ROADBOT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub frame_width: u32,
    pub frame_height: u32,
    pub speed_limit: f32,
    pub min_height_fraction: f32,
    /// Degrees requested by a turn sign.
    pub turn_angle: f32,
    pub min_confidence: f32,
    pub max_detections: usize,
    /// `<id> <name>` label file; the built-in names are used when unset.
    pub label_path: Option<PathBuf>,
    pub policies: Vec<PolicyEntry>,
    pub frame_buffer_size: usize,
    pub frame_interval_ms: u64,
    pub log_level: String,
    pub annotate_frames: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            frame_width: 320,
            frame_height: 240,
            speed_limit: 40.0,
            min_height_fraction: DEFAULT_MIN_HEIGHT_FRACTION,
            turn_angle: 90.0,
            min_confidence: 0.30,
            max_detections: 3,
            label_path: None,
            policies: PolicyEntry::builtin_table(),
            frame_buffer_size: 8,
            frame_interval_ms: 100,
            log_level: "info".to_string(),
            annotate_frames: false,
        }
    }
}

impl Configuration {
    /// Defaults, overlaid by the optional TOML file, overlaid by `ROADBOT_*`
    /// environment variables.
    ///
    /// A relative `label_path` is taken relative to the directory of the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let mut configuration: Configuration = settings.try_deserialize()?;
        if let Some(base) = path.and_then(Path::parent) {
            configuration.label_path = configuration
                .label_path
                .map(|label_path| base.join(label_path));
        }
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigurationError::InvalidFrameSize {
                width: self.frame_width,
                height: self.frame_height,
            });
        }
        ProximityFilter::check_fraction(self.min_height_fraction)?;
        if !self.speed_limit.is_finite() || self.speed_limit < 0.0 {
            return Err(ConfigurationError::InvalidSpeedLimit(self.speed_limit));
        }
        if !self.turn_angle.is_finite() {
            return Err(ConfigurationError::InvalidTurnAngle(self.turn_angle));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigurationError::InvalidConfidence(self.min_confidence));
        }
        if self.max_detections == 0 {
            return Err(ConfigurationError::InvalidMaxDetections);
        }
        Ok(())
    }

    // Overrides the frame size the detector works on.
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_width = width;
        self.frame_height = height;
        self
    }

    pub fn with_speed_limit(mut self, speed_limit: f32) -> Self {
        self.speed_limit = speed_limit;
        self
    }

    pub fn with_min_height_fraction(mut self, min_height_fraction: f32) -> Self {
        self.min_height_fraction = min_height_fraction;
        self
    }

    pub fn with_turn_angle(mut self, turn_angle: f32) -> Self {
        self.turn_angle = turn_angle;
        self
    }

    pub fn with_label_path(mut self, label_path: impl Into<PathBuf>) -> Self {
        self.label_path = Some(label_path.into());
        self
    }

    pub fn with_policies(mut self, policies: Vec<PolicyEntry>) -> Self {
        self.policies = policies;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::policy::Policy;
    use crate::pipeline::services::LabelTable;
    use crate::pipeline::types::ClassId;

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("roadbot-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_is_valid() {
        let configuration = Configuration::default();
        assert!(configuration.validate().is_ok());
        assert_eq!(configuration.frame_height, 240);
        assert_eq!(configuration.speed_limit, 40.0);
        assert_eq!(configuration.min_height_fraction, 0.05);
        assert_eq!(configuration.max_detections, 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = Configuration::default();
        assert!(matches!(
            base.clone().with_frame_size(320, 0).validate(),
            Err(ConfigurationError::InvalidFrameSize { .. })
        ));
        assert!(matches!(
            base.clone().with_min_height_fraction(0.0).validate(),
            Err(ConfigurationError::InvalidMinHeightFraction(_))
        ));
        assert!(matches!(
            base.clone().with_min_height_fraction(1.01).validate(),
            Err(ConfigurationError::InvalidMinHeightFraction(_))
        ));
        assert!(matches!(
            base.clone().with_speed_limit(-1.0).validate(),
            Err(ConfigurationError::InvalidSpeedLimit(_))
        ));
        assert!(matches!(
            base.clone().with_turn_angle(f32::INFINITY).validate(),
            Err(ConfigurationError::InvalidTurnAngle(_))
        ));

        let mut configuration = base.clone();
        configuration.min_confidence = 1.5;
        assert!(matches!(
            configuration.validate(),
            Err(ConfigurationError::InvalidConfidence(_))
        ));

        let mut configuration = base;
        configuration.max_detections = 0;
        assert!(matches!(
            configuration.validate(),
            Err(ConfigurationError::InvalidMaxDetections)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = write_temp(
            r#"
speed_limit = 25.0
min_height_fraction = 0.1
turn_angle = 45.0

[[policies]]
class_id = 7
policy = "stop"

[[policies]]
class_id = 2
policy = "continue"
"#,
        );
        let configuration = Configuration::load(Some(path.as_path())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(configuration.speed_limit, 25.0);
        assert_eq!(configuration.min_height_fraction, 0.1);
        assert_eq!(configuration.turn_angle, 45.0);
        assert_eq!(configuration.frame_height, 240);
        assert_eq!(
            configuration.policies,
            vec![
                PolicyEntry {
                    class_id: ClassId(7),
                    policy: Policy::Stop
                },
                PolicyEntry {
                    class_id: ClassId(2),
                    policy: Policy::Continue
                },
            ]
        );
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let path = write_temp("min_height_fraction = 2.0\n");
        let result = Configuration::load(Some(path.as_path()));
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidMinHeightFraction(_))
        ));
    }

    #[test]
    fn test_bundled_configuration_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/roadbot.toml");
        let configuration = Configuration::load(Some(path.as_path())).unwrap();
        assert_eq!(configuration.policies, PolicyEntry::builtin_table());
        assert_eq!(
            configuration.label_path.as_deref(),
            Some(Path::new(env!("CARGO_MANIFEST_DIR")).join("config/labels.txt").as_path())
        );

        let labels_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/labels.txt");
        let labels = LabelTable::load(labels_path).unwrap();
        assert_eq!(labels, LabelTable::builtin());
    }

    #[test]
    fn test_label_path_is_relative_to_config_file() {
        let dir = std::env::temp_dir().join(format!("roadbot-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("names.txt"), "1 box\n").unwrap();
        std::fs::write(dir.join("roadbot.toml"), "label_path = \"names.txt\"\n").unwrap();

        let configuration = Configuration::load(Some(dir.join("roadbot.toml").as_path())).unwrap();
        let label_path = configuration.label_path.clone().unwrap();
        let labels = LabelTable::load(&label_path);
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(label_path, dir.join("names.txt"));
        assert_eq!(labels.unwrap().name(ClassId(1)), Some("box"));
    }

    #[test]
    fn test_absolute_label_path_is_kept() {
        let path = write_temp("label_path = \"/etc/roadbot/labels.txt\"\n");
        let result = Configuration::load(Some(path.as_path()));
        std::fs::remove_file(&path).ok();
        assert_eq!(
            result.unwrap().label_path.as_deref(),
            Some(Path::new("/etc/roadbot/labels.txt"))
        );
    }

    // Only touches fields no other test in this module asserts after `load`.
    #[test]
    fn test_environment_overrides_file() {
        let path = write_temp("max_detections = 2\nframe_interval_ms = 200\nspeed_limit = 25.0\n");
        std::env::set_var("ROADBOT_MAX_DETECTIONS", "5");
        std::env::set_var("ROADBOT_FRAME_INTERVAL_MS", "50");
        let result = Configuration::load(Some(path.as_path()));
        std::env::remove_var("ROADBOT_MAX_DETECTIONS");
        std::env::remove_var("ROADBOT_FRAME_INTERVAL_MS");
        std::fs::remove_file(&path).ok();

        let configuration = result.unwrap();
        assert_eq!(configuration.max_detections, 5);
        assert_eq!(configuration.frame_interval_ms, 50);
        assert_eq!(configuration.speed_limit, 25.0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Configuration::load(Some(Path::new("/nonexistent/roadbot.toml")));
        assert!(matches!(result, Err(ConfigurationError::Load(_))));
    }
}
