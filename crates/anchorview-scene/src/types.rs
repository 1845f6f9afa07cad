//! Shared resources, messages and components

use anchorview_core::{AnchorId, AnchorSample, ArSession, ControlCommand, Pose};
use bevy::prelude::*;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// The AR session driven by the frame systems and the overlay
#[derive(Resource, Deref, DerefMut)]
pub struct Session(pub ArSession);

/// Outcome of the host's camera start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraReport {
    Started,
    Failed(String),
}

/// Camera projection reported by the tracking provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionUpdate {
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

/// Data pushed by the tracking provider between frames
#[derive(Debug, Default)]
pub struct FeedState {
    /// Latest raw pose per anchor, `None` while the target is out of view
    pub latest: BTreeMap<AnchorId, Option<Pose>>,
    pub camera: Option<CameraReport>,
    pub projection: Option<ProjectionUpdate>,
}

/// Shared handle the host writes to from outside the Bevy schedule
///
/// The provider may report at its own rate; every rendered frame replays the
/// latest known state of each anchor, so smoothing advances once per frame.
#[derive(Resource, Clone, Default)]
pub struct TrackingFeed(pub Arc<Mutex<FeedState>>);

impl TrackingFeed {
    pub fn push_pose(&self, anchor: AnchorId, pose: Option<Pose>) {
        if let Ok(mut state) = self.0.lock() {
            state.latest.insert(anchor, pose);
        }
    }

    pub fn report_camera(&self, report: CameraReport) {
        if let Ok(mut state) = self.0.lock() {
            state.camera = Some(report);
        }
    }

    pub fn set_projection(&self, projection: ProjectionUpdate) {
        if let Ok(mut state) = self.0.lock() {
            state.projection = Some(projection);
        }
    }

    /// One sample per anchor heard from so far, in anchor order
    pub fn samples(&self) -> Vec<AnchorSample> {
        let Ok(state) = self.0.lock() else {
            return Vec::new();
        };
        state
            .latest
            .iter()
            .map(|(&anchor, &pose)| AnchorSample { anchor, pose })
            .collect()
    }

    pub fn take_camera_report(&self) -> Option<CameraReport> {
        self.0.lock().ok().and_then(|mut state| state.camera.take())
    }

    pub fn take_projection(&self) -> Option<ProjectionUpdate> {
        self.0.lock().ok().and_then(|mut state| state.projection.take())
    }

    /// Forget every anchor, e.g. after the camera stopped
    pub fn clear(&self) {
        if let Ok(mut state) = self.0.lock() {
            state.latest.clear();
        }
    }
}

/// A control button was pressed
#[derive(Message, Debug, Clone, Copy)]
pub struct ControlMessage(pub ControlCommand);

/// The session accepted a start request; the host should start the camera
#[derive(Message, Debug, Clone, Copy)]
pub struct StartRequested;

/// The user asked to load the model again after a failure
#[derive(Message, Debug, Clone, Copy)]
pub struct RetryLoadRequested;

/// Root entity that follows an anchor's stabilized frame
#[derive(Component, Debug, Clone, Copy)]
pub struct AnchorRoot {
    pub anchor: AnchorId,
}

/// Model instance carrying the user-edited local pose
#[derive(Component, Debug, Clone, Copy)]
pub struct ModelInstance {
    pub anchor: AnchorId,
}

/// Stand-in shown on an anchor until the model has loaded
#[derive(Component, Debug, Clone, Copy)]
pub struct Placeholder;

/// Marker component for the AR camera
#[derive(Component)]
pub struct ArCamera;

/// UI layout state for responsive design
#[derive(Debug, Clone, Resource)]
pub struct UiLayout {
    /// Whether the control pad is expanded
    pub show_controls: bool,
    pub screen_width: f32,
    pub screen_height: f32,
    /// Whether we're on a small screen (mobile/tablet)
    pub is_mobile: bool,
    /// Scale factor for UI elements on mobile
    pub ui_scale: f32,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            show_controls: true,
            screen_width: 1920.0,
            screen_height: 1080.0,
            is_mobile: false,
            ui_scale: 1.0,
        }
    }
}

impl UiLayout {
    /// Update layout based on screen dimensions
    pub fn update_for_screen(&mut self, width: f32, height: f32) {
        self.screen_width = width;
        self.screen_height = height;

        // Phones in portrait and small tablets
        self.is_mobile = width < 800.0 || (width < height && width < 600.0);

        // Larger touch targets on mobile
        self.ui_scale = if self.is_mobile { 1.3 } else { 1.0 };
    }
}

/// Bevy transform of a pose
pub fn pose_to_transform(pose: &Pose) -> Transform {
    Transform {
        translation: pose.translation,
        rotation: pose.rotation,
        scale: pose.scale,
    }
}

/// Transform of a model instance: its local pose lifted by the display-only
/// bobbing offset
pub fn instance_transform(local: &Pose, bob_offset: f32) -> Transform {
    let mut transform = pose_to_transform(local);
    transform.translation.y += bob_offset;
    transform
}
