//! AR session context
//!
//! [`ArSession`] holds everything the frame callback and the control handlers
//! share: camera start phase, model load state, tracked anchors, the pose
//! synchronizer (present once the model has loaded), the spin flag, the info
//! panel flag and the status line. The host owns one session for the lifetime
//! of the page and drives it from a single thread.

use tracing::{debug, error, info, warn};

use crate::anchor::{AnchorEvent, AnchorId, AnchorSample, TrackedAnchor};
use crate::command::{ControlCommand, PoseEditCommand};
use crate::config::Config;
use crate::error::SessionError;
use crate::pose::Axis;
use crate::sync::{PoseSynchronizer, VisualObject};

pub const STATUS_IDLE: &str = "Tap start to begin";
pub const STATUS_STARTING: &str = "Starting camera…";
pub const STATUS_SCANNING: &str = "Scanning…";
pub const STATUS_FOUND: &str = "Target found";
pub const STATUS_RESET: &str = "Reset to default position";
pub const STATUS_LOADING: &str = "Loading model…";
pub const STATUS_CAMERA_FAILED: &str = "Could not start AR. Check camera permissions / HTTPS.";

/// Camera start-up phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Starting,
    Running,
    /// Camera or permission failure; the user may press start again
    Failed(String),
}

/// Model load state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSlot {
    Pending,
    Loaded,
    /// The user may retry the load
    Failed(String),
}

pub struct ArSession {
    config: Config,
    phase: SessionPhase,
    model: ModelSlot,
    anchors: Vec<TrackedAnchor>,
    sync: Option<PoseSynchronizer>,
    spinning: bool,
    info_panel: bool,
    status: String,
    elapsed: f32,
}

impl ArSession {
    pub fn new(config: Config) -> Self {
        let anchors = (0..config.model.anchors).map(|i| TrackedAnchor::new(AnchorId(i))).collect();
        let spinning = config.spin.enabled;
        Self {
            config,
            phase: SessionPhase::Idle,
            model: ModelSlot::Pending,
            anchors,
            sync: None,
            spinning,
            info_panel: false,
            status: STATUS_IDLE.to_string(),
            elapsed: 0.0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn model(&self) -> &ModelSlot {
        &self.model
    }

    pub fn anchors(&self) -> &[TrackedAnchor] {
        &self.anchors
    }

    pub fn synchronizer(&self) -> Option<&PoseSynchronizer> {
        self.sync.as_ref()
    }

    /// Model instances, empty until the model has loaded
    pub fn objects(&self) -> impl Iterator<Item = &VisualObject> {
        self.sync.iter().flat_map(|s| s.objects())
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn spin_label(&self) -> &'static str {
        if self.spinning {
            "Disable Spin"
        } else {
            "Enable Spin"
        }
    }

    pub fn info_panel_visible(&self) -> bool {
        self.info_panel
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Display-only vertical offset for the current frame
    pub fn bob_offset(&self) -> f32 {
        self.config.bob.offset(self.elapsed)
    }

    pub fn any_anchor_visible(&self) -> bool {
        self.anchors.iter().any(|a| a.is_visible())
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        debug!(status = %self.status, "Status changed");
    }

    /// User pressed start. Returns false if the camera is already starting or
    /// running.
    pub fn request_start(&mut self) -> bool {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Failed(_) => {
                self.phase = SessionPhase::Starting;
                self.set_status(STATUS_STARTING);
                info!("AR initialization started");
                true
            }
            SessionPhase::Starting | SessionPhase::Running => false,
        }
    }

    pub fn camera_started(&mut self) {
        if self.phase != SessionPhase::Starting {
            warn!(phase = ?self.phase, "Camera start reported outside of start-up");
        }
        self.phase = SessionPhase::Running;
        self.set_status(STATUS_SCANNING);
        info!("AR started, point the camera at the target");
    }

    pub fn camera_failed(&mut self, reason: impl Into<String>) -> SessionError {
        let err = SessionError::CameraUnavailable(reason.into());
        error!(%err, "Camera start failed");
        self.phase = SessionPhase::Failed(err.to_string());
        self.set_status(STATUS_CAMERA_FAILED);
        err
    }

    /// The model finished loading: create the primary object on anchor 0 and
    /// one replica per further anchor, all at the default pose.
    pub fn model_loaded(&mut self) {
        let defaults = self.config.pose.to_pose();
        let mut sync = PoseSynchronizer::new(
            AnchorId(0),
            self.anchors.iter().skip(1).map(|a| a.id()),
            defaults,
            self.config.smoothing.factor,
            self.config.scale,
        );
        for anchor in &self.anchors {
            sync.set_tracking_state(anchor.id(), anchor.state());
            if let (true, Some(raw)) = (anchor.is_visible(), anchor.raw_pose()) {
                sync.smooth_frame(anchor.id(), &raw);
            }
        }
        info!(instances = sync.len(), "Model loaded");
        self.sync = Some(sync);
        self.model = ModelSlot::Loaded;
        if self.status == STATUS_LOADING {
            let status = if self.any_anchor_visible() {
                STATUS_FOUND
            } else {
                STATUS_SCANNING
            };
            self.set_status(status);
        }
    }

    pub fn model_failed(
        &mut self,
        url: impl Into<String>,
        reason: impl Into<String>,
    ) -> SessionError {
        let err = SessionError::AssetLoad {
            url: url.into(),
            reason: reason.into(),
        };
        error!(%err, "Model load failed");
        self.sync = None;
        self.model = ModelSlot::Failed(err.to_string());
        self.set_status(err.to_string());
        err
    }

    /// User asked to load the model again. Only allowed after a failure.
    pub fn retry_load(&mut self) -> bool {
        if !matches!(self.model, ModelSlot::Failed(_)) {
            return false;
        }
        self.model = ModelSlot::Pending;
        self.set_status(STATUS_LOADING);
        info!("Retrying model load");
        true
    }

    /// Feed one frame of tracking output. Returns the found/lost transitions
    /// it caused, in sample order.
    pub fn observe_frame(&mut self, samples: &[AnchorSample], dt: f32) -> Vec<AnchorEvent> {
        let mut events = Vec::new();
        for sample in samples {
            let Some(anchor) = self.anchors.iter_mut().find(|a| a.id() == sample.anchor) else {
                warn!(anchor = %sample.anchor, "Sample for unconfigured anchor");
                continue;
            };
            let event = anchor.observe(sample.pose);
            let visible_pose = anchor.raw_pose().filter(|_| anchor.is_visible());
            let id = anchor.id();

            if let Some(event) = event {
                self.handle_event(event);
                events.push(event);
            }
            if let (Some(sync), Some(raw)) = (self.sync.as_mut(), visible_pose) {
                sync.smooth_frame(id, &raw);
            }
        }

        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
            if self.spinning {
                if let Some(sync) = self.sync.as_mut() {
                    sync.spin(self.config.spin.speed * dt);
                }
            }
        }
        events
    }

    fn handle_event(&mut self, event: AnchorEvent) {
        match event {
            AnchorEvent::Found(id) => {
                info!(anchor = %id, "Target found");
                if let Some(sync) = self.sync.as_mut() {
                    sync.set_tracking_state(id, crate::anchor::TrackingState::Tracked);
                }
                // A load failure stays on screen until the user retries
                if !matches!(self.model, ModelSlot::Failed(_)) {
                    self.set_status(STATUS_FOUND);
                }
                self.info_panel = true;
            }
            AnchorEvent::Lost(id) => {
                info!(anchor = %id, "Target lost");
                if let Some(sync) = self.sync.as_mut() {
                    sync.set_tracking_state(id, crate::anchor::TrackingState::Frozen);
                }
                if !self.any_anchor_visible() {
                    self.info_panel = false;
                    if !matches!(self.model, ModelSlot::Failed(_)) {
                        self.set_status(STATUS_SCANNING);
                    }
                }
            }
        }
    }

    pub fn toggle_spin(&mut self) -> bool {
        self.spinning = !self.spinning;
        info!(spinning = self.spinning, "Toggled spin");
        self.spinning
    }

    /// Dispatch one UI command
    pub fn apply_control(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::ToggleSpin => {
                self.toggle_spin();
            }
            ControlCommand::ShowInfo => self.info_panel = true,
            ControlCommand::HideInfo => self.info_panel = false,
            _ => {
                if let Some(edit) = command.to_edit(&self.config.controls) {
                    self.apply_edit(edit);
                }
            }
        }
    }

    /// Apply a pose edit to every model instance and report the new value.
    /// Ignored while no model is loaded.
    pub fn apply_edit(&mut self, edit: PoseEditCommand) {
        let Some(sync) = self.sync.as_mut() else {
            debug!(?edit, "No model loaded, ignoring edit");
            return;
        };
        sync.apply_edit(&edit);
        let local = *sync.shared();

        let status = match edit {
            PoseEditCommand::Translate { axis, .. } => {
                format!("Position {axis}: {:.2}", axis.component(local.translation))
            }
            PoseEditCommand::Rotate { axis, .. } => {
                let (yaw, pitch, roll) = local.euler_angles();
                let angle = match axis {
                    Axis::Y => yaw,
                    Axis::X => pitch,
                    Axis::Z => roll,
                };
                format!("Rotation {axis}: {:.1}°", angle.to_degrees())
            }
            PoseEditCommand::Scale { .. } | PoseEditCommand::ScaleBy { .. } => {
                format!("Scale: {:.2}", local.uniform_scale())
            }
            PoseEditCommand::Reset => STATUS_RESET.to_string(),
        };
        self.set_status(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Pose;
    use bevy_math::Vec3;

    fn seen(anchor: u8) -> AnchorSample {
        let pose = Pose::from_translation(Vec3::new(0.0, 0.0, -2.0));
        AnchorSample::visible(AnchorId(anchor), pose)
    }

    #[test]
    fn test_start_flow() {
        let mut session = ArSession::new(Config::default());
        assert_eq!(session.status(), STATUS_IDLE);
        assert!(session.request_start());
        assert!(!session.request_start());
        assert_eq!(session.status(), STATUS_STARTING);
        session.camera_started();
        assert_eq!(session.phase(), &SessionPhase::Running);
        assert_eq!(session.status(), STATUS_SCANNING);
    }

    #[test]
    fn test_camera_failure_allows_restart() {
        let mut session = ArSession::new(Config::default());
        session.request_start();
        let err = session.camera_failed("NotAllowedError");
        assert_eq!(err, SessionError::CameraUnavailable("NotAllowedError".into()));
        assert_eq!(session.status(), STATUS_CAMERA_FAILED);
        assert!(matches!(session.phase(), SessionPhase::Failed(_)));
        assert!(session.request_start());
    }

    #[test]
    fn test_model_failure_and_retry() {
        let mut session = ArSession::new(Config::default());
        assert!(!session.retry_load());
        session.model_failed("models/statue.glb", "404 Not Found");
        assert!(session.status().contains("404 Not Found"));
        assert_eq!(session.objects().count(), 0);

        // The frame loop keeps running without a model
        session.observe_frame(&[seen(0)], 0.016);
        session.apply_control(ControlCommand::MoveUp);
        assert!(session.status().contains("404 Not Found"));
        assert!(session.info_panel_visible());
        session.observe_frame(&[AnchorSample::hidden(AnchorId(0))], 0.016);
        assert!(session.status().contains("404 Not Found"));
        assert!(!session.info_panel_visible());
        session.observe_frame(&[seen(0)], 0.016);

        assert!(session.retry_load());
        assert_eq!(session.model(), &ModelSlot::Pending);
        assert_eq!(session.status(), STATUS_LOADING);
        session.model_loaded();
        assert_eq!(session.status(), STATUS_FOUND);
    }

    #[test]
    fn test_controls_without_model_are_ignored() {
        let mut session = ArSession::new(Config::default());
        session.apply_control(ControlCommand::ScaleUp);
        assert_eq!(session.status(), STATUS_IDLE);
    }

    #[test]
    fn test_lost_target_hides_panel_and_freezes() {
        let mut config = Config::default();
        config.spin.enabled = true;
        let mut session = ArSession::new(config);
        session.model_loaded();

        let events = session.observe_frame(&[seen(0)], 0.016);
        assert_eq!(events, vec![AnchorEvent::Found(AnchorId(0))]);
        assert!(session.info_panel_visible());

        session.observe_frame(&[AnchorSample::hidden(AnchorId(0))], 0.016);
        assert!(!session.info_panel_visible());
        assert_eq!(session.status(), STATUS_SCANNING);

        let frozen = session.synchronizer().unwrap().primary().clone();
        for _ in 0..10 {
            session.observe_frame(&[AnchorSample::hidden(AnchorId(0))], 0.016);
        }
        let after = session.synchronizer().unwrap().primary();
        assert_eq!(after.local, frozen.local);
        assert_eq!(after.frame(), frozen.frame());
    }

    #[test]
    fn test_spin_rotates_tracked_instances_only() {
        let mut config = Config::default();
        config.model.anchors = 2;
        let mut session = ArSession::new(config);
        session.model_loaded();
        session.observe_frame(&[seen(0), AnchorSample::hidden(AnchorId(1))], 0.5);

        let sync = session.synchronizer().unwrap();
        assert!(sync.in_parity());
        let (yaw, _, _) = sync.primary().local.euler_angles();
        assert!((yaw - 0.3).abs() < 1e-5);
        assert_eq!(sync.replicas()[0].local, session.config().pose.to_pose());

        assert!(!session.toggle_spin());
        assert_eq!(session.spin_label(), "Enable Spin");
    }

    #[test]
    fn test_second_anchor_keeps_status_found() {
        let mut config = Config::default();
        config.model.anchors = 2;
        let mut session = ArSession::new(config);
        session.observe_frame(&[seen(0), seen(1)], 0.016);
        session.observe_frame(&[seen(0), AnchorSample::hidden(AnchorId(1))], 0.016);
        assert_eq!(session.status(), STATUS_FOUND);
        assert!(session.info_panel_visible());
    }

    #[test]
    fn test_unknown_anchor_is_skipped() {
        let mut session = ArSession::new(Config::default());
        let events = session.observe_frame(&[seen(7)], 0.016);
        assert!(events.is_empty());
        assert!(!session.any_anchor_visible());
    }

    #[test]
    fn test_rotation_and_scale_status_text() {
        let mut session = ArSession::new(Config::default());
        session.model_loaded();
        session.apply_control(ControlCommand::RotateLeft);
        assert_eq!(session.status(), "Rotation Y: 15.0°");
        session.apply_control(ControlCommand::ScaleUp);
        assert_eq!(session.status(), "Scale: 0.70");
        session.apply_control(ControlCommand::Reset);
        assert_eq!(session.status(), STATUS_RESET);
    }

    #[test]
    fn test_info_panel_controls() {
        let mut session = ArSession::new(Config::default());
        session.apply_control(ControlCommand::ShowInfo);
        assert!(session.info_panel_visible());
        session.apply_control(ControlCommand::HideInfo);
        assert!(!session.info_panel_visible());
    }
}
