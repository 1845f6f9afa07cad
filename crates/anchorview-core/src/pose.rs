//! Pose type and the project-wide rotation convention
//!
//! Orientation is always stored as a quaternion. Euler angles only appear at
//! the edges (configuration input and status display) and always use
//! [`ROTATION_ORDER`].

use bevy_math::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Euler order used everywhere angles are read or shown: intrinsic yaw (Y),
/// then pitch (X), then roll (Z).
pub const ROTATION_ORDER: EulerRot = EulerRot::YXZ;

/// Position, orientation and scale of an object relative to its parent frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Build a pose from yaw/pitch/roll given in degrees
    pub fn from_euler_degrees(translation: Vec3, yaw: f32, pitch: f32, roll: f32) -> Self {
        Self::from_translation(translation).with_rotation(Quat::from_euler(
            ROTATION_ORDER,
            yaw.to_radians(),
            pitch.to_radians(),
            roll.to_radians(),
        ))
    }

    /// (yaw, pitch, roll) in radians
    pub fn euler_angles(&self) -> (f32, f32, f32) {
        self.rotation.to_euler(ROTATION_ORDER)
    }

    /// Compose `self` (parent) with `child`, giving the child's pose in the
    /// parent's parent frame.
    pub fn mul_pose(&self, child: &Pose) -> Pose {
        Pose {
            translation: self.translation + self.rotation * (self.scale * child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }

    /// Translation distance plus rotation angle (radians) to `other`
    pub fn distance_to(&self, other: &Pose) -> f32 {
        self.translation.distance(other.translation) + self.rotation.angle_between(other.rotation)
    }

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// Uniform scale as shown to the user (x component; axes are kept equal)
    pub fn uniform_scale(&self) -> f32 {
        self.scale.x
    }
}

/// One of the three axes of an anchor frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Component of `v` along this axis
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Serializable form of a pose, used by config files and recorded traces.
/// Rotation is a quaternion `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    pub position: [f32; 3],
    #[serde(default = "identity_quat")]
    pub rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

fn identity_quat() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl From<PoseRecord> for Pose {
    fn from(r: PoseRecord) -> Self {
        let rotation = Quat::from_array(r.rotation);
        Pose {
            translation: Vec3::from_array(r.position),
            // Recorded quaternions are not guaranteed to be unit length
            rotation: if rotation.length_squared() > 0.0 {
                rotation.normalize()
            } else {
                rotation
            },
            scale: Vec3::from_array(r.scale),
        }
    }
}

impl From<Pose> for PoseRecord {
    fn from(p: Pose) -> Self {
        PoseRecord {
            position: p.translation.to_array(),
            rotation: p.rotation.to_array(),
            scale: p.scale.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_euler_degrees_round_trip_uses_project_order() {
        let pose = Pose::from_euler_degrees(Vec3::ZERO, 30.0, -20.0, 10.0);
        let (yaw, pitch, roll) = pose.euler_angles();
        assert!((yaw.to_degrees() - 30.0).abs() < 1e-3);
        assert!((pitch.to_degrees() + 20.0).abs() < 1e-3);
        assert!((roll.to_degrees() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_mul_pose_applies_parent_rotation_to_child_offset() {
        let parent = Pose::from_translation(Vec3::new(1.0, 0.0, 0.0))
            .with_rotation(Quat::from_rotation_y(FRAC_PI_2));
        let child = Pose::from_translation(Vec3::new(0.0, 0.0, 1.0));
        let world = parent.mul_pose(&child);
        assert!(world.translation.distance(Vec3::new(2.0, 0.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_record_keeps_zero_quaternion_unnormalized() {
        let record = PoseRecord {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        };
        let pose = Pose::from(record);
        assert_eq!(pose.rotation, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_record_defaults_fill_rotation_and_scale() {
        let record: PoseRecord = serde_json::from_str(r#"{"position":[0.1,0.2,0.3]}"#).unwrap();
        let pose = Pose::from(record);
        assert_eq!(pose.rotation, Quat::IDENTITY);
        assert_eq!(pose.scale, Vec3::ONE);
    }
}
