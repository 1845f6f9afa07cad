//! Per-frame summaries of a replayed session

use anchorview_core::{ArSession, PoseRecord, TrackingState};
use anyhow::Result;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct ObjectSummary {
    pub anchor: u8,
    pub state: &'static str,
    pub world: PoseRecord,
}

#[derive(Debug, Serialize)]
pub struct FrameSummary {
    pub frame: usize,
    pub status: String,
    pub spinning: bool,
    pub info_panel: bool,
    pub objects: Vec<ObjectSummary>,
}

impl FrameSummary {
    pub fn capture(frame: usize, session: &ArSession) -> Self {
        let objects = session
            .objects()
            .map(|object| ObjectSummary {
                anchor: object.anchor().0,
                state: match object.state() {
                    TrackingState::Tracked => "tracked",
                    TrackingState::Frozen => "frozen",
                },
                world: object.world_pose().into(),
            })
            .collect();
        Self {
            frame,
            status: session.status().to_string(),
            spinning: session.is_spinning(),
            info_panel: session.info_panel_visible(),
            objects,
        }
    }
}

impl fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:<5} {}", self.frame, self.status)?;
        if self.objects.is_empty() {
            return write!(f, " (no model)");
        }
        for object in &self.objects {
            let [x, y, z] = object.world.position;
            write!(
                f,
                "\n  anchor-{} {:<7} pos=({:.3}, {:.3}, {:.3}) scale={:.2}",
                object.anchor, object.state, x, y, z, object.world.scale[0]
            )?;
        }
        Ok(())
    }
}

pub fn print(summary: &FrameSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorview_core::{AnchorSample, Config};

    fn tracked_session() -> ArSession {
        let mut config = Config::default();
        config.spin.enabled = false;
        let mut session = ArSession::new(config);
        session.model_loaded();
        let sample: AnchorSample =
            serde_json::from_str(r#"{"anchor":0,"pose":{"position":[0,0,-2]}}"#).unwrap();
        session.observe_frame(&[sample], 0.016);
        session
    }

    #[test]
    fn test_summary_lists_world_pose() {
        let summary = FrameSummary::capture(3, &tracked_session());
        assert_eq!(summary.objects.len(), 1);
        assert_eq!(summary.objects[0].state, "tracked");
        assert!((summary.objects[0].world.position[2] + 2.5).abs() < 1e-5);

        let text = summary.to_string();
        assert!(text.starts_with("#3"));
        assert!(text.contains("anchor-0 tracked"));
    }

    #[test]
    fn test_summary_without_model() {
        let summary = FrameSummary::capture(1, &ArSession::new(Config::default()));
        assert!(summary.to_string().ends_with("(no model)"));
    }

    #[test]
    fn test_json_summary() {
        let summary = FrameSummary::capture(1, &tracked_session());
        let value: serde_json::Value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["status"], "Target found");
        assert_eq!(value["objects"][0]["anchor"], 0);
    }
}
