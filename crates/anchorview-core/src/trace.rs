//! Recorded tracking traces
//!
//! A trace is a JSON-lines file, one frame per line:
//!
//! ```text
//! {"event":"model_loaded"}
//! {"dt":0.016,"anchors":[{"anchor":0,"pose":{"position":[0,0,-2]}}]}
//! {"dt":0.016,"anchors":[{"anchor":0}],"commands":["move_up"]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Replaying a trace
//! through an [`ArSession`] reproduces a live session without a camera.

use serde::{Deserialize, Serialize};
use std::io::BufRead;

use crate::anchor::{AnchorEvent, AnchorSample};
use crate::command::ControlCommand;
use crate::error::TraceError;
use crate::session::ArSession;

/// Session-level event recorded in a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Start,
    CameraStarted,
    CameraFailed(String),
    ModelLoaded,
    ModelFailed(String),
    RetryLoad,
}

/// One recorded frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    /// Frame duration in seconds
    #[serde(default)]
    pub dt: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<SessionEvent>,
    /// UI commands dispatched before this frame's tracking update
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<ControlCommand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<AnchorSample>,
}

impl TraceFrame {
    /// Replay this frame: session event, then commands, then tracking
    pub fn apply(&self, session: &mut ArSession) -> Vec<AnchorEvent> {
        if let Some(event) = &self.event {
            match event {
                SessionEvent::Start => {
                    session.request_start();
                }
                SessionEvent::CameraStarted => session.camera_started(),
                SessionEvent::CameraFailed(reason) => {
                    session.camera_failed(reason.clone());
                }
                SessionEvent::ModelLoaded => session.model_loaded(),
                SessionEvent::ModelFailed(reason) => {
                    let url = session.config().model.url.clone();
                    session.model_failed(url, reason.clone());
                }
                SessionEvent::RetryLoad => {
                    session.retry_load();
                }
            }
        }
        for command in &self.commands {
            session.apply_control(*command);
        }
        session.observe_frame(&self.anchors, self.dt)
    }
}

/// Parse a whole trace
pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<TraceFrame>, TraceError> {
    let mut frames = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let frame = serde_json::from_str(trimmed).map_err(|source| TraceError::Malformed {
            line: index + 1,
            source,
        })?;
        frames.push(frame);
    }
    Ok(frames)
}
