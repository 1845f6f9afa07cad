//! Deployment configuration loading and validation
//!
//! Everything here is tuned per deployment: the default pose that aligns the
//! model with the printed target, control step sizes, smoothing gain and the
//! parameters handed to the tracking provider.

use bevy_math::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;
use crate::material::MaterialTuning;
use crate::pose::Pose;
use crate::smoothing::SmoothingFactor;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub pose: PoseDefaults,
    #[serde(default)]
    pub controls: ControlSteps,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    #[serde(default)]
    pub scale: ScaleLimits,
    #[serde(default)]
    pub spin: SpinConfig,
    #[serde(default)]
    pub bob: crate::bob::Bobbing,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub material: MaterialTuning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// URL or asset path of the glTF/GLB model
    #[serde(default = "default_model_url")]
    pub url: String,
    /// Compiled image-target set handed to the tracking provider
    #[serde(default = "default_targets_url")]
    pub targets_url: String,
    /// Number of image targets; anchor 0 carries the primary object, the
    /// others carry replicas
    #[serde(default = "default_anchor_count")]
    pub anchors: u8,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: default_model_url(),
            targets_url: default_targets_url(),
            anchors: default_anchor_count(),
        }
    }
}

fn default_model_url() -> String {
    "models/statue.glb".to_string()
}

fn default_targets_url() -> String {
    "targets/targets.mind".to_string()
}

fn default_anchor_count() -> u8 {
    1
}

/// Pose an object gets when loaded and on reset, relative to its anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseDefaults {
    /// Offset from the target plane. Negative Z sits behind the target, away
    /// from the camera near plane.
    #[serde(default = "default_position")]
    pub position: [f32; 3],
    /// Yaw, pitch, roll in degrees (intrinsic Y-X-Z)
    #[serde(default)]
    pub rotation_deg: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: f32,
}

impl Default for PoseDefaults {
    fn default() -> Self {
        Self {
            position: default_position(),
            rotation_deg: [0.0, 0.0, 0.0],
            scale: default_scale(),
        }
    }
}

fn default_position() -> [f32; 3] {
    [0.0, 0.0, -0.5]
}

fn default_scale() -> f32 {
    0.5
}

impl PoseDefaults {
    pub fn to_pose(&self) -> Pose {
        let [yaw, pitch, roll] = self.rotation_deg;
        Pose::from_euler_degrees(Vec3::from_array(self.position), yaw, pitch, roll)
            .with_uniform_scale(self.scale)
    }
}

/// Step sizes of the on-screen controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSteps {
    /// Translation per move press, in anchor units
    #[serde(default = "default_move_step")]
    pub move_step: f32,
    /// Rotation per rotate/tilt press, in degrees
    #[serde(default = "default_rotate_step")]
    pub rotate_step_deg: f32,
    /// Scale change per scale press
    #[serde(default = "default_scale_step")]
    pub scale_step: f32,
}

impl Default for ControlSteps {
    fn default() -> Self {
        Self {
            move_step: default_move_step(),
            rotate_step_deg: default_rotate_step(),
            scale_step: default_scale_step(),
        }
    }
}

fn default_move_step() -> f32 {
    0.1
}

fn default_rotate_step() -> f32 {
    15.0
}

fn default_scale_step() -> f32 {
    0.2
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    #[serde(default)]
    pub factor: SmoothingFactor,
}

/// Smallest scale any deployment may allow; below it geometry degenerates
pub const MIN_SCALE: f32 = 0.1;

/// Bounds applied to every scale change, from buttons and from pinch alike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    #[serde(default = "default_scale_min")]
    pub min: f32,
    /// Upper bound; `inf` leaves scale unbounded above
    #[serde(default = "default_scale_max")]
    pub max: f32,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min: default_scale_min(),
            max: default_scale_max(),
        }
    }
}

fn default_scale_min() -> f32 {
    MIN_SCALE
}

fn default_scale_max() -> f32 {
    5.0
}

impl ScaleLimits {
    pub fn clamp(&self, scale: f32) -> f32 {
        scale.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinConfig {
    /// Whether auto-spin is on when the session starts
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Yaw rate in radians per second
    #[serde(default = "default_spin_speed")]
    pub speed: f32,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: default_spin_speed(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_spin_speed() -> f32 {
    0.6
}

/// Parameters of the tracking provider's own pose filter. Forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Higher values reduce jitter and add lag
    #[serde(default = "default_beta")]
    pub beta: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            beta: default_beta(),
        }
    }
}

fn default_min_confidence() -> f32 {
    0.001
}

fn default_beta() -> f32 {
    1000.0
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.anchors == 0 {
            return Err(ConfigError::Invalid("model.anchors must be at least 1".into()));
        }
        if !(self.scale.min >= MIN_SCALE) {
            return Err(ConfigError::Invalid(format!(
                "scale.min must be at least {MIN_SCALE}, got {}",
                self.scale.min
            )));
        }
        if !(self.scale.max >= self.scale.min) {
            return Err(ConfigError::Invalid(format!(
                "scale.max ({}) is below scale.min ({})",
                self.scale.max, self.scale.min
            )));
        }
        if self.pose.scale < self.scale.min || self.pose.scale > self.scale.max {
            return Err(ConfigError::Invalid(format!(
                "pose.scale {} is outside the scale limits",
                self.pose.scale
            )));
        }
        if !self.pose.to_pose().is_finite() {
            return Err(ConfigError::Invalid("pose defaults are not finite".into()));
        }
        let steps = &self.controls;
        if steps.move_step <= 0.0 || steps.scale_step <= 0.0 || steps.rotate_step_deg <= 0.0 {
            return Err(ConfigError::Invalid("control steps must be positive".into()));
        }
        if self.bob.period_secs <= 0.0 {
            return Err(ConfigError::Invalid("bob.period_secs must be positive".into()));
        }
        Ok(())
    }
}

/// Load configuration from file, falling back to defaults when it is missing
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = Config::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
