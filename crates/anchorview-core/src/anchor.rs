//! Tracked anchors and their found/lost transitions

use serde::{Deserialize, Serialize};

use crate::pose::{Pose, PoseRecord};

/// Index of an image target in the tracking provider's target set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(pub u8);

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anchor-{}", self.0)
    }
}

/// Whether an object follows its anchor or holds its last pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingState {
    Tracked,
    #[default]
    Frozen,
}

/// Found/lost transition reported by the tracking provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEvent {
    Found(AnchorId),
    Lost(AnchorId),
}

impl AnchorEvent {
    pub fn anchor(&self) -> AnchorId {
        match self {
            AnchorEvent::Found(id) | AnchorEvent::Lost(id) => *id,
        }
    }
}

/// What the tracking provider reports for one anchor in one frame.
/// `pose` is `None` while the target is not detected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSample {
    pub anchor: AnchorId,
    #[serde(default, with = "optional_pose")]
    pub pose: Option<Pose>,
}

impl AnchorSample {
    pub fn visible(anchor: AnchorId, pose: Pose) -> Self {
        Self {
            anchor,
            pose: Some(pose),
        }
    }

    pub fn hidden(anchor: AnchorId) -> Self {
        Self { anchor, pose: None }
    }
}

mod optional_pose {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pose: &Option<Pose>, s: S) -> Result<S::Ok, S::Error> {
        pose.map(PoseRecord::from).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Pose>, D::Error> {
        Ok(Option::<PoseRecord>::deserialize(d)?.map(Pose::from))
    }
}

/// Coordinate frame attached to one image target
#[derive(Debug, Clone)]
pub struct TrackedAnchor {
    id: AnchorId,
    visible: bool,
    raw_pose: Option<Pose>,
}

impl TrackedAnchor {
    pub fn new(id: AnchorId) -> Self {
        Self {
            id,
            visible: false,
            raw_pose: None,
        }
    }

    pub fn id(&self) -> AnchorId {
        self.id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> TrackingState {
        if self.visible {
            TrackingState::Tracked
        } else {
            TrackingState::Frozen
        }
    }

    /// Last raw pose reported while visible
    pub fn raw_pose(&self) -> Option<Pose> {
        self.raw_pose
    }

    /// Record this frame's sample and report a visibility transition, if any.
    ///
    /// A pose that is not finite or has a degenerate rotation counts as not
    /// visible.
    pub fn observe(&mut self, pose: Option<Pose>) -> Option<AnchorEvent> {
        let pose = pose.filter(|p| {
            let usable = p.is_finite() && p.rotation.length_squared() > 1e-6;
            if !usable {
                tracing::warn!(anchor = %self.id, "Discarding unusable tracked pose");
            }
            usable
        });

        let was_visible = self.visible;
        self.visible = pose.is_some();
        if let Some(p) = pose {
            self.raw_pose = Some(p);
        }

        match (was_visible, self.visible) {
            (false, true) => Some(AnchorEvent::Found(self.id)),
            (true, false) => Some(AnchorEvent::Lost(self.id)),
            _ => None,
        }
    }
}
