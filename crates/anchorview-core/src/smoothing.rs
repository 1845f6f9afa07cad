//! Per-frame low-pass smoothing of tracked poses
//!
//! Each frame the object's pose moves a fixed fraction of the way toward the
//! reference: `lerp` for translation, `slerp` for rotation. The effective time
//! constant is roughly `1 / factor` frames.
//!
//! After the step, [`SmoothingState`] resynchronizes its reference to the
//! post-smoothing pose. With the raw tracked pose fed in as the next reference
//! this reduces to a fixed-gain filter on the raw pose: it damps per-frame
//! jitter and does not predict motion.

use bevy_math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pose::Pose;

/// Interpolation weight per frame, in `(0, 1]`. `1.0` disables smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct SmoothingFactor(f32);

impl SmoothingFactor {
    pub const NONE: SmoothingFactor = SmoothingFactor(1.0);

    pub fn new(value: f32) -> Result<Self, ConfigError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::Invalid(format!(
                "smoothing factor must be in (0, 1], got {value}"
            )))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for SmoothingFactor {
    fn default() -> Self {
        Self(0.5)
    }
}

impl TryFrom<f32> for SmoothingFactor {
    type Error = ConfigError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SmoothingFactor> for f32 {
    fn from(f: SmoothingFactor) -> Self {
        f.0
    }
}

/// Move `pose` toward the target by `factor`. Scale is left untouched.
pub fn smooth(
    pose: &mut Pose,
    target_translation: Vec3,
    target_rotation: Quat,
    factor: SmoothingFactor,
) {
    let t = factor.get();
    pose.translation = pose.translation.lerp(target_translation, t);
    pose.rotation = pose.rotation.slerp(target_rotation, t).normalize();
}

/// Reference value of the filter for one visual object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingState {
    target_translation: Vec3,
    target_rotation: Quat,
}

impl Default for SmoothingState {
    fn default() -> Self {
        Self {
            target_translation: Vec3::ZERO,
            target_rotation: Quat::IDENTITY,
        }
    }
}

impl SmoothingState {
    /// State whose reference equals `pose`
    pub fn seeded(pose: &Pose) -> Self {
        Self {
            target_translation: pose.translation,
            target_rotation: pose.rotation,
        }
    }

    pub fn target_translation(&self) -> Vec3 {
        self.target_translation
    }

    pub fn target_rotation(&self) -> Quat {
        self.target_rotation
    }

    /// One filter step: take the raw tracked pose as the reference, smooth
    /// `pose` toward it, then resynchronize the reference to the result.
    pub fn step(
        &mut self,
        pose: &mut Pose,
        raw_translation: Vec3,
        raw_rotation: Quat,
        factor: SmoothingFactor,
    ) {
        self.target_translation = raw_translation;
        self.target_rotation = raw_rotation;
        smooth(pose, self.target_translation, self.target_rotation, factor);
        self.target_translation = pose.translation;
        self.target_rotation = pose.rotation;
    }
}
