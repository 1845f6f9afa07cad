//! JavaScript bridge to the tracking provider
//!
//! The page script owns the camera and the image-target tracker. It listens
//! for the [`START_EVENT`] window event, starts the camera with the tracker
//! parameters in the event detail, and then calls the exported functions
//! below from its own frame callback.

use anchorview_core::{AnchorId, Config, Pose};
use anchorview_scene::{CameraReport, ProjectionUpdate, TrackingFeed};
use bevy::math::Mat4;
use std::sync::OnceLock;
use wasm_bindgen::prelude::*;

/// Window event asking the page to start the camera and tracker
pub const START_EVENT: &str = "anchorview:start";

static FEED: OnceLock<TrackingFeed> = OnceLock::new();

/// Feed shared by the exported functions and the Bevy app
pub fn feed() -> &'static TrackingFeed {
    FEED.get_or_init(TrackingFeed::default)
}

/// Pose of a column-major anchor matrix.
///
/// Tracker matrices carry the target width as their scale. Dividing the
/// translation by it puts the target at one unit wide; scaling the scene
/// uniformly about the camera leaves the rendered image unchanged.
pub fn pose_from_matrix(matrix: &[f32]) -> Option<Pose> {
    if matrix.len() != 16 {
        return None;
    }
    let (scale, rotation, translation) =
        Mat4::from_cols_slice(matrix).to_scale_rotation_translation();
    let unit = scale.x;
    if !unit.is_finite() || unit <= f32::EPSILON {
        return None;
    }
    Some(Pose::from_translation(translation / unit).with_rotation(rotation))
}

/// Target `anchor` is visible with the given 4x4 column-major matrix
#[wasm_bindgen]
pub fn anchor_pose(anchor: u8, matrix: &[f32]) {
    match pose_from_matrix(matrix) {
        Some(pose) => feed().push_pose(AnchorId(anchor), Some(pose)),
        None => tracing::warn!(anchor, len = matrix.len(), "Ignoring malformed anchor matrix"),
    }
}

/// Target `anchor` went out of view
#[wasm_bindgen]
pub fn anchor_lost(anchor: u8) {
    feed().push_pose(AnchorId(anchor), None);
}

#[wasm_bindgen]
pub fn camera_started() {
    feed().report_camera(CameraReport::Started);
}

#[wasm_bindgen]
pub fn camera_failed(reason: String) {
    feed().report_camera(CameraReport::Failed(reason));
}

/// Vertical field of view of the tracker's camera model, in degrees
#[wasm_bindgen]
pub fn camera_fov(fov_y_deg: f32) {
    if !(fov_y_deg > 0.0 && fov_y_deg < 180.0) {
        tracing::warn!(fov_y_deg, "Ignoring invalid field of view");
        return;
    }
    feed().set_projection(ProjectionUpdate {
        fov_y: fov_y_deg.to_radians(),
        near: 0.01,
        far: 1000.0,
    });
}

/// Parameters the page hands to the tracker on start
pub fn start_detail(config: &Config) -> serde_json::Value {
    serde_json::json!({
        "targets": config.model.targets_url,
        "anchors": config.model.anchors,
        "filterMinCF": config.tracker.min_confidence,
        "filterBeta": config.tracker.beta,
    })
}

/// Ask the page to start the camera
pub fn dispatch_start(config: &Config) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window")?;
    let init = web_sys::CustomEventInit::new();
    init.set_detail(&JsValue::from_str(&start_detail(config).to_string()));
    let event = web_sys::CustomEvent::new_with_event_init_dict(START_EVENT, &init)
        .map_err(|e| format!("Failed to create start event: {:?}", e))?;
    window
        .dispatch_event(&event)
        .map_err(|e| format!("Failed to dispatch start event: {:?}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::{Quat, Vec3};

    #[test]
    fn test_matrix_normalized_to_unit_target() {
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::splat(500.0),
            Quat::from_rotation_y(0.4),
            Vec3::new(100.0, 0.0, -1000.0),
        );
        let pose = pose_from_matrix(&matrix.to_cols_array()).unwrap();
        assert!(pose.translation.distance(Vec3::new(0.2, 0.0, -2.0)) < 1e-4);
        assert!(pose.rotation.angle_between(Quat::from_rotation_y(0.4)) < 1e-4);
        assert_eq!(pose.scale, Vec3::ONE);
    }

    #[test]
    fn test_rejects_short_or_degenerate_matrix() {
        assert_eq!(pose_from_matrix(&[1.0; 12]), None);
        assert_eq!(pose_from_matrix(&Mat4::ZERO.to_cols_array()), None);
    }

    #[test]
    fn test_start_detail_carries_tracker_filter() {
        let detail = start_detail(&Config::default());
        assert_eq!(detail["targets"], "targets/targets.mind");
        assert_eq!(detail["anchors"], 1);
        assert_eq!(detail["filterBeta"], 1000.0);
    }
}
