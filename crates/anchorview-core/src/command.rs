//! Pose edit commands and the on-screen control vocabulary

use bevy_math::Quat;
use serde::{Deserialize, Serialize};

use crate::config::{ControlSteps, ScaleLimits};
use crate::pose::{Axis, Pose};

/// A discrete pose change, applied identically to every object instance.
///
/// Axes are those of the anchor frame the object is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PoseEditCommand {
    Translate { axis: Axis, delta: f32 },
    /// Angle in radians
    Rotate { axis: Axis, angle: f32 },
    /// Additive change of the uniform scale
    Scale { delta: f32 },
    /// Multiplicative change of the uniform scale (pinch gestures)
    ScaleBy { factor: f32 },
    Reset,
}

impl PoseEditCommand {
    pub fn apply(&self, pose: &mut Pose, defaults: &Pose, limits: &ScaleLimits) {
        match *self {
            PoseEditCommand::Translate { axis, delta } => {
                pose.translation += axis.unit() * delta;
            }
            PoseEditCommand::Rotate { axis, angle } => {
                let turn = Quat::from_axis_angle(axis.unit(), angle);
                pose.rotation = (turn * pose.rotation).normalize();
            }
            PoseEditCommand::Scale { delta } => {
                pose.scale = bevy_math::Vec3::splat(limits.clamp(pose.uniform_scale() + delta));
            }
            PoseEditCommand::ScaleBy { factor } => {
                pose.scale = bevy_math::Vec3::splat(limits.clamp(pose.uniform_scale() * factor));
            }
            PoseEditCommand::Reset => {
                *pose = *defaults;
            }
        }
    }
}

/// Commands dispatched by the user interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCommand {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    /// Toward the viewer (+Z)
    MoveForward,
    MoveBack,
    RotateLeft,
    RotateRight,
    TiltUp,
    TiltDown,
    ScaleUp,
    ScaleDown,
    ToggleSpin,
    Reset,
    ShowInfo,
    HideInfo,
}

impl ControlCommand {
    /// Pose edit behind this control, or `None` for controls that only
    /// change session state.
    pub fn to_edit(self, steps: &ControlSteps) -> Option<PoseEditCommand> {
        let mv = steps.move_step;
        let rot = steps.rotate_step_deg.to_radians();
        let sc = steps.scale_step;
        let edit = match self {
            ControlCommand::MoveUp => PoseEditCommand::Translate { axis: Axis::Y, delta: mv },
            ControlCommand::MoveDown => PoseEditCommand::Translate { axis: Axis::Y, delta: -mv },
            ControlCommand::MoveLeft => PoseEditCommand::Translate { axis: Axis::X, delta: -mv },
            ControlCommand::MoveRight => PoseEditCommand::Translate { axis: Axis::X, delta: mv },
            ControlCommand::MoveForward => PoseEditCommand::Translate { axis: Axis::Z, delta: mv },
            ControlCommand::MoveBack => PoseEditCommand::Translate { axis: Axis::Z, delta: -mv },
            ControlCommand::RotateLeft => PoseEditCommand::Rotate { axis: Axis::Y, angle: rot },
            ControlCommand::RotateRight => PoseEditCommand::Rotate { axis: Axis::Y, angle: -rot },
            ControlCommand::TiltUp => PoseEditCommand::Rotate { axis: Axis::X, angle: -rot },
            ControlCommand::TiltDown => PoseEditCommand::Rotate { axis: Axis::X, angle: rot },
            ControlCommand::ScaleUp => PoseEditCommand::Scale { delta: sc },
            ControlCommand::ScaleDown => PoseEditCommand::Scale { delta: -sc },
            ControlCommand::Reset => PoseEditCommand::Reset,
            ControlCommand::ToggleSpin | ControlCommand::ShowInfo | ControlCommand::HideInfo => {
                return None;
            }
        };
        Some(edit)
    }

    /// Button label
    pub fn label(self) -> &'static str {
        match self {
            ControlCommand::MoveUp => "▲",
            ControlCommand::MoveDown => "▼",
            ControlCommand::MoveLeft => "◀",
            ControlCommand::MoveRight => "▶",
            ControlCommand::MoveForward => "Closer",
            ControlCommand::MoveBack => "Farther",
            ControlCommand::RotateLeft => "⟲",
            ControlCommand::RotateRight => "⟳",
            ControlCommand::TiltUp => "Tilt ▲",
            ControlCommand::TiltDown => "Tilt ▼",
            ControlCommand::ScaleUp => "＋",
            ControlCommand::ScaleDown => "－",
            ControlCommand::ToggleSpin => "Spin",
            ControlCommand::Reset => "Reset",
            ControlCommand::ShowInfo => "Info",
            ControlCommand::HideInfo => "✕",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_math::Vec3;

    fn limits() -> ScaleLimits {
        ScaleLimits::default()
    }

    #[test]
    fn test_translate_moves_along_axis() {
        let mut pose = Pose::IDENTITY;
        let edit = PoseEditCommand::Translate { axis: Axis::Z, delta: -0.25 };
        edit.apply(&mut pose, &Pose::IDENTITY, &limits());
        assert_eq!(pose.translation, Vec3::new(0.0, 0.0, -0.25));
    }

    #[test]
    fn test_rotate_is_about_frame_axis() {
        // A pose already tilted about X still yaws about the frame's Y axis
        let mut pose = Pose::IDENTITY.with_rotation(Quat::from_rotation_x(0.5));
        let edit = PoseEditCommand::Rotate { axis: Axis::Y, angle: 0.3 };
        edit.apply(&mut pose, &Pose::IDENTITY, &limits());
        let expected = Quat::from_rotation_y(0.3) * Quat::from_rotation_x(0.5);
        assert!(pose.rotation.angle_between(expected) < 1e-5);
    }

    #[test]
    fn test_scale_down_never_below_minimum() {
        let mut pose = Pose::IDENTITY.with_uniform_scale(0.5);
        for _ in 0..20 {
            PoseEditCommand::Scale { delta: -0.2 }.apply(&mut pose, &Pose::IDENTITY, &limits());
            assert!(pose.uniform_scale() >= 0.1);
        }
        assert_eq!(pose.scale, Vec3::splat(0.1));
    }

    #[test]
    fn test_pinch_and_buttons_share_ceiling() {
        let mut pose = Pose::IDENTITY.with_uniform_scale(4.0);
        PoseEditCommand::ScaleBy { factor: 3.0 }.apply(&mut pose, &Pose::IDENTITY, &limits());
        assert_eq!(pose.uniform_scale(), 5.0);
        PoseEditCommand::Scale { delta: 0.2 }.apply(&mut pose, &Pose::IDENTITY, &limits());
        assert_eq!(pose.uniform_scale(), 5.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let defaults = Pose::from_translation(Vec3::new(0.0, 0.0, -0.5)).with_uniform_scale(0.5);
        let mut pose = Pose::from_translation(Vec3::ONE).with_uniform_scale(2.0);
        PoseEditCommand::Reset.apply(&mut pose, &defaults, &limits());
        assert_eq!(pose, defaults);
    }

    #[test]
    fn test_control_mapping_uses_configured_steps() {
        let steps = ControlSteps {
            move_step: 0.05,
            rotate_step_deg: 90.0,
            scale_step: 0.25,
        };
        assert_eq!(
            ControlCommand::MoveUp.to_edit(&steps),
            Some(PoseEditCommand::Translate { axis: Axis::Y, delta: 0.05 })
        );
        assert_eq!(
            ControlCommand::ScaleDown.to_edit(&steps),
            Some(PoseEditCommand::Scale { delta: -0.25 })
        );
        match ControlCommand::RotateRight.to_edit(&steps) {
            Some(PoseEditCommand::Rotate { axis: Axis::Y, angle }) => {
                assert!((angle + std::f32::consts::FRAC_PI_2).abs() < 1e-6)
            }
            other => panic!("unexpected edit {other:?}"),
        }
        assert_eq!(ControlCommand::ToggleSpin.to_edit(&steps), None);
        assert_eq!(ControlCommand::HideInfo.to_edit(&steps), None);
    }

    #[test]
    fn test_control_names_in_traces() {
        let cmd: ControlCommand = serde_json::from_str(r#""move_forward""#).unwrap();
        assert_eq!(cmd, ControlCommand::MoveForward);
    }
}
