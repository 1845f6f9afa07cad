//! Pose Synchronizer
//!
//! Owns one [`VisualObject`] per anchor: the primary on the first anchor and
//! replicas on the others. Each object has two poses:
//!
//! - `frame`: the stabilized anchor frame, driven by smoothing of the raw
//!   tracked pose while the anchor is visible and frozen otherwise;
//! - `local`: the user-edited pose inside that frame, kept identical across
//!   all objects by replaying every edit on the primary and then on each
//!   replica.
//!
//! Auto-spin is the one exception to parity: it only turns tracked objects,
//! so a frozen object falls behind the shared pose while its target is lost
//! and is brought back to it on the next sighting.

use bevy_math::{Quat, Vec3};
use tracing::{debug, trace};

use crate::anchor::{AnchorId, TrackingState};
use crate::command::PoseEditCommand;
use crate::config::ScaleLimits;
use crate::pose::{Axis, Pose};
use crate::smoothing::{SmoothingFactor, SmoothingState};

/// A renderable instance of the model attached to one anchor
#[derive(Debug, Clone)]
pub struct VisualObject {
    anchor: AnchorId,
    /// User-edited pose relative to the stabilized anchor frame
    pub local: Pose,
    frame: Pose,
    smoothing: SmoothingState,
    state: TrackingState,
    /// Set once the frame has been placed at a real tracked pose
    placed: bool,
}

impl VisualObject {
    pub fn new(anchor: AnchorId, local: Pose) -> Self {
        Self {
            anchor,
            local,
            frame: Pose::IDENTITY,
            smoothing: SmoothingState::default(),
            state: TrackingState::Frozen,
            placed: false,
        }
    }

    pub fn anchor(&self) -> AnchorId {
        self.anchor
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Stabilized anchor frame in camera/world space
    pub fn frame(&self) -> &Pose {
        &self.frame
    }

    pub fn smoothing(&self) -> &SmoothingState {
        &self.smoothing
    }

    /// Whether the anchor has ever been seen
    pub fn is_placed(&self) -> bool {
        self.placed
    }

    /// Pose in camera/world space: stabilized frame composed with the local pose
    pub fn world_pose(&self) -> Pose {
        self.frame.mul_pose(&self.local)
    }

    pub fn set_state(&mut self, state: TrackingState) {
        self.state = state;
    }

    /// Smooth the anchor frame toward the raw tracked pose.
    ///
    /// No-op while frozen. The first sighting places the frame directly; after
    /// that the frame only moves by filter steps, so it never jumps while the
    /// anchor stays visible.
    pub fn smooth(&mut self, raw_translation: Vec3, raw_rotation: Quat, factor: SmoothingFactor) {
        if self.state == TrackingState::Frozen {
            return;
        }
        if !self.placed {
            self.frame = Pose::from_translation(raw_translation).with_rotation(raw_rotation);
            self.smoothing = SmoothingState::seeded(&self.frame);
            self.placed = true;
            return;
        }
        self.smoothing.step(&mut self.frame, raw_translation, raw_rotation, factor);
    }
}

/// Apply `command` to `primary`, then to every replica in order
pub fn apply_edit(
    command: &PoseEditCommand,
    primary: &mut VisualObject,
    replicas: &mut [VisualObject],
    defaults: &Pose,
    limits: &ScaleLimits,
) {
    command.apply(&mut primary.local, defaults, limits);
    for replica in replicas.iter_mut() {
        command.apply(&mut replica.local, defaults, limits);
    }
}

/// Put `object` back at the configured default pose
pub fn reset(object: &mut VisualObject, defaults: &Pose) {
    object.local = *defaults;
}

/// Stabilizes tracked poses and keeps every instance of the model in parity
#[derive(Debug, Clone)]
pub struct PoseSynchronizer {
    primary: VisualObject,
    replicas: Vec<VisualObject>,
    /// Local pose every tracked object agrees on
    shared: Pose,
    factor: SmoothingFactor,
    defaults: Pose,
    limits: ScaleLimits,
}

impl PoseSynchronizer {
    pub fn new(
        primary: AnchorId,
        replicas: impl IntoIterator<Item = AnchorId>,
        defaults: Pose,
        factor: SmoothingFactor,
        limits: ScaleLimits,
    ) -> Self {
        let primary = VisualObject::new(primary, defaults);
        let replicas: Vec<_> = replicas
            .into_iter()
            .map(|a| VisualObject::new(a, defaults))
            .collect();
        debug!(replicas = replicas.len(), "Created pose synchronizer");
        Self {
            primary,
            replicas,
            shared: defaults,
            factor,
            defaults,
            limits,
        }
    }

    pub fn primary(&self) -> &VisualObject {
        &self.primary
    }

    pub fn replicas(&self) -> &[VisualObject] {
        &self.replicas
    }

    /// Primary first, then replicas in anchor order
    pub fn objects(&self) -> impl Iterator<Item = &VisualObject> {
        std::iter::once(&self.primary).chain(self.replicas.iter())
    }

    fn objects_mut(&mut self) -> impl Iterator<Item = &mut VisualObject> {
        std::iter::once(&mut self.primary).chain(self.replicas.iter_mut())
    }

    pub fn len(&self) -> usize {
        1 + self.replicas.len()
    }

    pub fn object_for(&self, anchor: AnchorId) -> Option<&VisualObject> {
        self.objects().find(|o| o.anchor == anchor)
    }

    /// The edited local pose, as shown by every tracked object
    pub fn shared(&self) -> &Pose {
        &self.shared
    }

    /// Change the tracking state of the objects on `anchor`. An object that
    /// comes back into view picks up the shared pose it missed while frozen.
    pub fn set_tracking_state(&mut self, anchor: AnchorId, state: TrackingState) {
        let shared = self.shared;
        for object in self.objects_mut().filter(|o| o.anchor == anchor) {
            if state == TrackingState::Tracked && object.state == TrackingState::Frozen {
                object.local = shared;
            }
            object.set_state(state);
        }
    }

    /// Per-frame smoothing step for the objects on `anchor`
    pub fn smooth_frame(&mut self, anchor: AnchorId, raw: &Pose) {
        let factor = self.factor;
        for object in self.objects_mut().filter(|o| o.anchor == anchor) {
            object.smooth(raw.translation, raw.rotation, factor);
        }
        trace!(%anchor, "Smoothed anchor frame");
    }

    pub fn apply_edit(&mut self, command: &PoseEditCommand) {
        command.apply(&mut self.shared, &self.defaults, &self.limits);
        apply_edit(command, &mut self.primary, &mut self.replicas, &self.defaults, &self.limits);
        debug!(?command, local = ?self.shared, "Applied pose edit");
    }

    /// Auto-spin step: yaw the shared pose and every tracked object by
    /// `angle` radians. Frozen objects keep their pose. Returns false when
    /// nothing is tracked.
    pub fn spin(&mut self, angle: f32) -> bool {
        if !self.objects().any(|o| o.state == TrackingState::Tracked) {
            return false;
        }
        let command = PoseEditCommand::Rotate { axis: Axis::Y, angle };
        command.apply(&mut self.shared, &self.defaults, &self.limits);
        let (defaults, limits) = (self.defaults, self.limits);
        for object in self.objects_mut().filter(|o| o.state == TrackingState::Tracked) {
            command.apply(&mut object.local, &defaults, &limits);
        }
        true
    }

    pub fn reset(&mut self) {
        self.apply_edit(&PoseEditCommand::Reset);
    }

    /// Whether every tracked object shows the shared pose
    pub fn in_parity(&self) -> bool {
        self.objects()
            .filter(|o| o.state == TrackingState::Tracked)
            .all(|o| o.local == self.shared)
    }
}
