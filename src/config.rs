//! Configuration for the gesture pointer
//!
//! Every tunable of the smoothing, projection and click detection stages is
//! a named option here. Missing fields fall back to their defaults, so a
//! config file only needs to list what it overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV: &str = "GESTURE_POINTER_CONFIG";

/// Environment variable naming a replay file, overriding `source.replayPath`
pub const REPLAY_ENV: &str = "GESTURE_POINTER_REPLAY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointerConfig {
    /// Frames averaged for the emitted cursor position
    pub position_window: usize,
    /// Frame-to-frame deltas averaged for the motion gate
    pub velocity_window: usize,
    /// Mean delta magnitude (pixels) required before a new position is admitted
    pub motion_threshold: f64,
    /// Frames of frozen cursor after a click gesture
    pub cooldown_frames: u32,
    pub projection: ProjectionMethod,
    pub recalibration: Recalibration,
    pub frustum: FrustumConfig,
    pub click: ClickConfig,
    pub source: SourceConfig,
    pub sink: SinkConfig,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            position_window: 30,
            velocity_window: 10,
            motion_threshold: 0.5,
            cooldown_frames: 30,
            projection: ProjectionMethod::default(),
            recalibration: Recalibration::default(),
            frustum: FrustumConfig::default(),
            click: ClickConfig::default(),
            source: SourceConfig::default(),
            sink: SinkConfig::default(),
        }
    }
}

/// How the hand is mapped onto the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionMethod {
    /// Cast a ray from the palm along the hand direction onto the screen plane
    #[default]
    PalmRay,
    /// Scale the palm position by its depth in front of the screen
    Frustum,
}

/// Affine correction of screen ratios around the screen centre.
///
/// `ratio' = (ratio - 0.5) * scale + offset` per axis. The defaults widen the
/// horizontal range by 70% and shift it left by 20%, and widen the vertical
/// range by 50%, which compensates for how people tend to point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recalibration {
    pub scale_x: f64,
    pub offset_x: f64,
    pub scale_y: f64,
    pub offset_y: f64,
}

impl Default for Recalibration {
    fn default() -> Self {
        Self {
            scale_x: 1.7,
            offset_x: 0.3,
            scale_y: 1.5,
            offset_y: 0.5,
        }
    }
}

impl Recalibration {
    /// No-op calibration
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            offset_x: 0.5,
            scale_y: 1.0,
            offset_y: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrustumConfig {
    /// Added to the palm-to-screen distance (mm)
    pub depth_offset: f64,
    /// Distance (mm) at which the frustum collapses to a point
    pub depth_range: f64,
}

impl Default for FrustumConfig {
    fn default() -> Self {
        Self {
            depth_offset: 100.0,
            depth_range: 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickStrategy {
    /// One fingertip moving vertically against the rest of the hand
    #[default]
    VelocityOutlier,
    /// Thumb and index fingertip closing in on each other
    Pinch,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickConfig {
    pub strategy: ClickStrategy,
    /// Standard deviation (mm/s) of fingertip vertical velocity that counts as a gesture
    pub velocity_deviation_threshold: f64,
    /// Normalised deviation a single finger needs to be the acting digit
    pub outlier_ratio: f64,
    /// Drop (mm) below the windowed thumb/index distance that presses the button
    pub pinch_trigger_distance: f64,
    /// Average thumb speed (mm/s) required for a pinch press or release
    pub pinch_thumb_speed: f64,
    pub pinch_window: usize,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            strategy: ClickStrategy::default(),
            velocity_deviation_threshold: 100.0,
            outlier_ratio: 0.5,
            pinch_trigger_distance: 0.5,
            pinch_thumb_speed: 30.0,
            pinch_window: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceConfig {
    /// JSON lines file of recorded frames
    pub replay_path: Option<PathBuf>,
    pub poll_interval_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            replay_path: None,
            poll_interval_ms: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkKind {
    /// Move the real system cursor
    #[default]
    System,
    /// Only log pointer commands
    Log,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// Directory to write the emitted pointer commands to on stop
    pub record_dir: Option<PathBuf>,
}

impl PointerConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PointerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `GESTURE_POINTER_CONFIG` if set, then apply `GESTURE_POINTER_REPLAY`
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(path) = std::env::var_os(REPLAY_ENV) {
            config.source.replay_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Check values are within acceptable ranges.
    /// Returns the first invalid field.
    pub fn validate(&self) -> ConfigResult<()> {
        let windows = [
            ("positionWindow", self.position_window),
            ("velocityWindow", self.velocity_window),
            ("click.pinchWindow", self.click.pinch_window),
        ];
        for (field, capacity) in windows {
            if capacity == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "window capacity must be at least 1".to_string(),
                });
            }
        }

        let thresholds = [
            ("motionThreshold", self.motion_threshold),
            ("click.velocityDeviationThreshold", self.click.velocity_deviation_threshold),
            ("click.outlierRatio", self.click.outlier_ratio),
            ("click.pinchTriggerDistance", self.click.pinch_trigger_distance),
            ("click.pinchThumbSpeed", self.click.pinch_thumb_speed),
        ];
        for (field, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("expected a non-negative number, got {}", value),
                });
            }
        }

        if !self.frustum.depth_range.is_finite() || self.frustum.depth_range <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "frustum.depthRange",
                reason: format!("must be positive, got {}", self.frustum.depth_range),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PointerConfig::default();
        assert_eq!(config.position_window, 30);
        assert_eq!(config.velocity_window, 10);
        assert_eq!(config.motion_threshold, 0.5);
        assert_eq!(config.cooldown_frames, 30);
        assert_eq!(config.projection, ProjectionMethod::PalmRay);
        assert_eq!(config.click.strategy, ClickStrategy::VelocityOutlier);
        assert_eq!(config.sink.kind, SinkKind::System);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "cooldownFrames": 12,
            "click": { "strategy": "pinch", "pinchTriggerDistance": 4.0 },
            "sink": { "kind": "log" }
        }"#;
        let config: PointerConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.cooldown_frames, 12);
        assert_eq!(config.click.strategy, ClickStrategy::Pinch);
        assert_eq!(config.click.pinch_trigger_distance, 4.0);
        assert_eq!(config.click.pinch_window, 10);
        assert_eq!(config.sink.kind, SinkKind::Log);
        assert_eq!(config.recalibration, Recalibration::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"projection": "frustum", "source": {{"pollIntervalMs": 16}}}}"#).unwrap();

        let config = PointerConfig::load(file.path()).unwrap();
        assert_eq!(config.projection, ProjectionMethod::Frustum);
        assert_eq!(config.source.poll_interval_ms, 16);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"positionWindow": 0}}"#).unwrap();

        match PointerConfig::load(file.path()) {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "positionWindow"),
            other => panic!("expected invalid value, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let mut config = PointerConfig::default();
        config.motion_threshold = -1.0;
        assert!(config.validate().is_err());

        let mut config = PointerConfig::default();
        config.frustum.depth_range = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            PointerConfig::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
