//! anchorview core - pose stabilization and edit replication for image-target AR
//!
//! This crate holds everything about the AR overlay that does not depend on a
//! renderer:
//! - Pose type and the project-wide rotation convention
//! - Per-frame smoothing of tracked anchor poses
//! - Tracked anchors with found/lost transitions
//! - Pose edit commands replicated across every anchor's model instance
//! - The session context driven by the frame loop and the UI
//! - Deployment configuration and recorded tracking traces

pub mod anchor;
pub mod bob;
pub mod command;
pub mod config;
pub mod error;
pub mod material;
pub mod pose;
pub mod session;
pub mod smoothing;
pub mod sync;
pub mod trace;

pub use anchor::{AnchorEvent, AnchorId, AnchorSample, TrackedAnchor, TrackingState};
pub use command::{ControlCommand, PoseEditCommand};
pub use config::{load_config, Config};
pub use error::{ConfigError, SessionError, TraceError};
pub use material::{MaterialSurface, MaterialTuning};
pub use pose::{Axis, Pose, PoseRecord, ROTATION_ORDER};
pub use session::{ArSession, ModelSlot, SessionPhase};
pub use smoothing::{smooth, SmoothingFactor, SmoothingState};
pub use sync::{PoseSynchronizer, VisualObject};
