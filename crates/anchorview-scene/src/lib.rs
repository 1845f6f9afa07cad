//! anchorview scene - Bevy systems and overlay UI for the AR viewer
//!
//! Wraps an [`ArSession`] in the Bevy world: tracking samples pushed by the
//! host are fed to the session once per rendered frame, anchor and model
//! entities follow the session's poses, and the egui overlay turns button
//! presses into control commands.

pub mod models;
pub mod scene;
pub mod tracking;
pub mod types;
pub mod ui;

use anchorview_core::{ArSession, Config};
use bevy::prelude::*;

/// Plugin that sets up the AR scene, model loading, tracking and overlay
pub struct AnchorViewPlugin {
    pub config: Config,
}

impl Plugin for AnchorViewPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Session(ArSession::new(self.config.clone())))
            .init_resource::<TrackingFeed>()
            .init_resource::<UiLayout>()
            .add_message::<ControlMessage>()
            .add_message::<StartRequested>()
            .add_message::<RetryLoadRequested>()
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(tracking::TrackingPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use types::*;
