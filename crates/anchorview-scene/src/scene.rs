//! Scene setup - AR camera, lights and anchor roots

use bevy::prelude::*;

use crate::types::{AnchorRoot, ArCamera, Session, TrackingFeed};

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_scene, spawn_anchor_roots))
            .add_systems(Update, apply_projection);
    }
}

fn setup_scene(mut commands: Commands) {
    // The tracker reports anchor poses relative to the camera, so the camera
    // sits at the origin looking down -Z and never moves.
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::NONE),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            near: 0.01,
            far: 1000.0,
            ..default()
        }),
        Transform::IDENTITY,
        ArCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        ..default()
    });

    // Key light, above and to the right of the camera
    commands.spawn((
        DirectionalLight {
            illuminance: 6000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(1.0, 2.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Sky/ground fill: bright from above, dim grey bounce from below
    commands.spawn((
        DirectionalLight {
            illuminance: 2500.0,
            color: Color::WHITE,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(0.0, 1.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 800.0,
            color: Color::srgb(0.27, 0.27, 0.27),
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(0.0, -1.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));
}

/// One hidden root entity per configured anchor
fn spawn_anchor_roots(mut commands: Commands, session: Res<Session>) {
    for anchor in session.anchors() {
        commands.spawn((
            Transform::IDENTITY,
            Visibility::Hidden,
            AnchorRoot { anchor: anchor.id() },
            Name::new(anchor.id().to_string()),
        ));
    }
    tracing::info!(anchors = session.anchors().len(), "Spawned anchor roots");
}

/// Match the camera projection to the tracking provider's
fn apply_projection(feed: Res<TrackingFeed>, mut cameras: Query<&mut Projection, With<ArCamera>>) {
    let Some(update) = feed.take_projection() else {
        return;
    };
    let Ok(mut projection) = cameras.single_mut() else {
        return;
    };
    if let Projection::Perspective(perspective) = projection.as_mut() {
        perspective.fov = update.fov_y;
        perspective.near = update.near;
        perspective.far = update.far;
        tracing::debug!(fov_y = update.fov_y, "Updated camera projection");
    }
}
