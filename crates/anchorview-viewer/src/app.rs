//! Bevy application setup

use anchorview_core::Config;
use anchorview_scene::{AnchorViewPlugin, CameraReport, Session, StartRequested};
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;

use crate::bridge;

pub fn run(config: Config) {
    App::new()
        // Transparent so the camera video behind the canvas shows through
        .insert_resource(ClearColor(Color::NONE))
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "anchorview".to_string(),
                    canvas: Some("#anchorview-canvas".to_string()),
                    fit_canvas_to_parent: true,
                    transparent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Model URLs are relative to the page
                file_path: "".to_string(),
                // Don't look for .meta files - static hosting doesn't have them
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // Must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        // Shared with the exported bridge functions
        .insert_resource(bridge::feed().clone())
        .add_plugins(AnchorViewPlugin { config })
        .add_systems(Update, forward_start_requests)
        .run();
}

/// Hand accepted start requests to the page script
fn forward_start_requests(mut requests: MessageReader<StartRequested>, session: Res<Session>) {
    if requests.read().last().is_none() {
        return;
    }
    if let Err(e) = bridge::dispatch_start(session.config()) {
        tracing::error!(error = %e, "Could not request camera start");
        bridge::feed().report_camera(CameraReport::Failed(e));
    }
}
