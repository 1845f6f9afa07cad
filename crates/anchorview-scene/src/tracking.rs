//! Per-frame tracking, control dispatch and anchor entity updates

use anchorview_core::{PoseEditCommand, TrackingState};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::types::{
    instance_transform, pose_to_transform, AnchorRoot, CameraReport, ControlMessage, ModelInstance,
    Session, TrackingFeed,
};

/// Plugin for the per-frame session update
pub struct TrackingPlugin;

impl Plugin for TrackingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                apply_camera_reports,
                apply_controls,
                pinch_to_scale,
                observe_tracking,
                sync_anchor_roots,
                sync_model_instances,
            )
                .chain(),
        );
    }
}

/// Forward the host's camera start-up outcome to the session
fn apply_camera_reports(feed: Res<TrackingFeed>, mut session: ResMut<Session>) {
    match feed.take_camera_report() {
        Some(CameraReport::Started) => session.camera_started(),
        Some(CameraReport::Failed(reason)) => {
            feed.clear();
            session.camera_failed(reason);
        }
        None => {}
    }
}

fn apply_controls(mut messages: MessageReader<ControlMessage>, mut session: ResMut<Session>) {
    for ControlMessage(command) in messages.read() {
        tracing::debug!(?command, "Control pressed");
        session.apply_control(*command);
    }
}

/// Ratio between the current and previous distance of a two-finger touch
pub fn pinch_factor(current: (Vec2, Vec2), previous: (Vec2, Vec2)) -> Option<f32> {
    let curr_dist = current.0.distance(current.1);
    let prev_dist = previous.0.distance(previous.1);
    // Fingers on top of each other give no usable ratio
    if prev_dist < 1.0 || curr_dist < 1.0 {
        return None;
    }
    let factor = curr_dist / prev_dist;
    ((factor - 1.0).abs() > f32::EPSILON).then_some(factor)
}

/// Two-finger pinch scales every model instance
fn pinch_to_scale(
    touch_input: Res<Touches>,
    mut contexts: EguiContexts,
    mut session: ResMut<Session>,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if egui_wants_pointer {
        return;
    }

    let touches: Vec<_> = touch_input.iter().collect();
    if let [t1, t2] = touches.as_slice() {
        let current = (t1.position(), t2.position());
        let previous = (t1.position() - t1.delta(), t2.position() - t2.delta());
        if let Some(factor) = pinch_factor(current, previous) {
            session.apply_edit(PoseEditCommand::ScaleBy { factor });
        }
    }
}

/// Feed the latest sample of every anchor to the session, once per frame
fn observe_tracking(time: Res<Time>, feed: Res<TrackingFeed>, mut session: ResMut<Session>) {
    let samples = feed.samples();
    let events = session.observe_frame(&samples, time.delta_secs());
    for event in events {
        tracing::debug!(?event, "Anchor transition");
    }
}

/// Anchor roots follow the stabilized frame and hide while frozen
fn sync_anchor_roots(
    session: Res<Session>,
    mut roots: Query<(&AnchorRoot, &mut Transform, &mut Visibility)>,
) {
    for (root, mut transform, mut visibility) in roots.iter_mut() {
        let object = session
            .synchronizer()
            .and_then(|sync| sync.object_for(root.anchor));
        let tracked = session
            .anchors()
            .iter()
            .any(|a| a.id() == root.anchor && a.state() == TrackingState::Tracked);

        match object {
            Some(object) if object.is_placed() => {
                *transform = pose_to_transform(object.frame());
            }
            // Before the model arrives the placeholder rides on the raw pose
            None => {
                if let Some(raw) = session
                    .anchors()
                    .iter()
                    .find(|a| a.id() == root.anchor)
                    .and_then(|a| a.raw_pose())
                {
                    *transform = pose_to_transform(&raw);
                }
            }
            Some(_) => {}
        }

        let wanted = if tracked {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}

/// Model instances carry the shared local pose plus the bobbing offset
fn sync_model_instances(
    session: Res<Session>,
    mut instances: Query<(&ModelInstance, &mut Transform), Without<AnchorRoot>>,
) {
    let Some(sync) = session.synchronizer() else {
        return;
    };
    let bob = session.bob_offset();
    for (instance, mut transform) in instances.iter_mut() {
        if let Some(object) = sync.object_for(instance.anchor) {
            *transform = instance_transform(&object.local, bob);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinch_spread_grows() {
        let factor = pinch_factor(
            (Vec2::new(0.0, 0.0), Vec2::new(200.0, 0.0)),
            (Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)),
        );
        assert_eq!(factor, Some(2.0));
    }

    #[test]
    fn test_pinch_without_motion_is_ignored() {
        let pair = (Vec2::new(10.0, 10.0), Vec2::new(60.0, 10.0));
        assert_eq!(pinch_factor(pair, pair), None);
    }

    #[test]
    fn test_pinch_with_stacked_fingers_is_ignored() {
        let stacked = (Vec2::splat(5.0), Vec2::splat(5.0));
        let apart = (Vec2::ZERO, Vec2::new(50.0, 0.0));
        assert_eq!(pinch_factor(apart, stacked), None);
    }
}
