use anchorview_core::session::{STATUS_FOUND, STATUS_SCANNING};
use anchorview_core::{
    AnchorId, AnchorSample, ArSession, Config, ControlCommand, ModelSlot, Pose, TrackingState,
};
use bevy_math::{Quat, Vec3};

fn target_pose(x: f32) -> Pose {
    Pose::from_translation(Vec3::new(x, 0.0, -1.5)).with_rotation(Quat::from_rotation_x(-0.3))
}

#[test]
fn test_load_find_and_move_up() {
    let mut config = Config::default();
    config.controls.move_step = 0.05;
    config.spin.enabled = false;
    let mut session = ArSession::new(config);

    session.request_start();
    session.camera_started();
    assert_eq!(session.status(), STATUS_SCANNING);

    // Load still pending: no object, frames keep flowing
    assert_eq!(session.model(), &ModelSlot::Pending);
    session.observe_frame(&[AnchorSample::hidden(AnchorId(0))], 0.016);
    assert_eq!(session.objects().count(), 0);

    session.model_loaded();
    let defaults = session.config().pose.to_pose();
    let primary = session.synchronizer().unwrap().primary();
    assert_eq!(primary.local, defaults);
    assert_eq!(primary.state(), TrackingState::Frozen);

    session.observe_frame(&[AnchorSample::visible(AnchorId(0), target_pose(0.0))], 0.016);
    assert_eq!(session.status(), STATUS_FOUND);
    assert!(session.info_panel_visible());

    let before = session.synchronizer().unwrap().primary().local.translation.y;
    session.apply_control(ControlCommand::MoveUp);
    let after = session.synchronizer().unwrap().primary().local.translation.y;
    assert_eq!(after - before, 0.05);
    assert_eq!(session.status(), "Position Y: 0.05");
}

#[test]
fn test_pose_frozen_while_target_lost() {
    let mut session = ArSession::new(Config::default());
    session.model_loaded();

    let mut frame_at_loss = None;
    let pattern = [true, true, false, false, false, true, true, false, false];
    for (i, visible) in pattern.into_iter().enumerate() {
        let sample = if visible {
            AnchorSample::visible(AnchorId(0), target_pose(i as f32 * 0.1))
        } else {
            AnchorSample::hidden(AnchorId(0))
        };
        session.observe_frame(&[sample], 0.016);

        let object = session.synchronizer().unwrap().primary().clone();
        if visible {
            frame_at_loss = None;
            assert_eq!(object.state(), TrackingState::Tracked);
        } else {
            assert_eq!(object.state(), TrackingState::Frozen);
            match &frame_at_loss {
                None => frame_at_loss = Some(object),
                Some(frozen) => {
                    assert_eq!(object.frame(), frozen.frame());
                    assert_eq!(object.local, frozen.local);
                }
            }
        }
    }
}

#[test]
fn test_replicas_follow_their_own_anchor_but_share_edits() {
    let mut config = Config::default();
    config.model.anchors = 3;
    config.spin.enabled = false;
    let mut session = ArSession::new(config);
    session.model_loaded();

    session.observe_frame(
        &[
            AnchorSample::visible(AnchorId(0), target_pose(-1.0)),
            AnchorSample::visible(AnchorId(1), target_pose(0.0)),
            AnchorSample::hidden(AnchorId(2)),
        ],
        0.016,
    );
    for cmd in [ControlCommand::MoveLeft, ControlCommand::TiltUp, ControlCommand::ScaleDown] {
        session.apply_control(cmd);
    }

    let sync = session.synchronizer().unwrap();
    assert!(sync.in_parity());
    let frames: Vec<Vec3> = sync.objects().map(|o| o.frame().translation).collect();
    assert_eq!(frames[0].x, -1.0);
    assert_eq!(frames[1].x, 0.0);
    assert!(!sync.replicas()[1].is_placed());
}

#[test]
fn test_lost_replica_frozen_while_other_target_spins() {
    let mut config = Config::default();
    config.model.anchors = 2;
    config.spin.enabled = true;
    let mut session = ArSession::new(config);
    session.model_loaded();
    assert!(session.is_spinning());

    let both = [
        AnchorSample::visible(AnchorId(0), target_pose(-0.5)),
        AnchorSample::visible(AnchorId(1), target_pose(0.5)),
    ];
    session.observe_frame(&both, 0.016);
    let one = [
        AnchorSample::visible(AnchorId(0), target_pose(-0.5)),
        AnchorSample::hidden(AnchorId(1)),
    ];
    session.observe_frame(&one, 0.016);

    let sync = session.synchronizer().unwrap();
    assert_eq!(sync.replicas()[0].state(), TrackingState::Frozen);
    let frozen = sync.replicas()[0].world_pose();
    let primary_before = sync.primary().world_pose();

    for _ in 0..10 {
        session.observe_frame(&one, 0.016);
        assert_eq!(session.synchronizer().unwrap().replicas()[0].world_pose(), frozen);
    }
    let sync = session.synchronizer().unwrap();
    assert_ne!(sync.primary().world_pose().rotation, primary_before.rotation);
    assert!(sync.in_parity());

    // Seen again: the replica catches up with the spun pose
    session.observe_frame(&both, 0.016);
    let sync = session.synchronizer().unwrap();
    assert_eq!(sync.replicas()[0].local, *sync.shared());
    assert!(sync.in_parity());
}

#[test]
fn test_scale_down_floor_holds_through_session() {
    let mut session = ArSession::new(Config::default());
    session.model_loaded();
    for _ in 0..50 {
        session.apply_control(ControlCommand::ScaleDown);
    }
    assert!(session.objects().all(|o| o.local.uniform_scale() >= 0.1));
    assert_eq!(session.status(), "Scale: 0.10");
}

#[test]
fn test_demo_trace_replays_to_reset() {
    let trace = include_str!("../../../demos/statue.jsonl");
    let frames = anchorview_core::trace::read_trace(trace.as_bytes()).unwrap();
    let mut session = ArSession::new(Config::default());
    let mut frozen_frame = None;
    for frame in &frames {
        frame.apply(&mut session);
        let primary = session.synchronizer().map(|s| *s.primary().frame());
        if session.any_anchor_visible() {
            frozen_frame = None;
        } else if let Some(pose) = primary {
            // The anchor frame never moves while the target is lost
            assert_eq!(*frozen_frame.get_or_insert(pose), pose);
        }
    }
    assert!(!session.is_spinning());
    assert_eq!(session.status(), anchorview_core::session::STATUS_RESET);
    let sync = session.synchronizer().unwrap();
    assert_eq!(sync.primary().local, session.config().pose.to_pose());
}
