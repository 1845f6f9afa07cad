//! anchorview viewer - browser entry point
//!
//! The page's tracking script (an image-target tracker running on the camera
//! feed) reports poses through the functions exported from [`bridge`]; the
//! Bevy app renders the synchronized model instances on a transparent canvas
//! layered over the video.

mod app;
pub mod bridge;
mod config_loader;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::INFO)
            .build(),
    );

    // Config is fetched before the app starts so startup systems see it
    wasm_bindgen_futures::spawn_local(async {
        let config = config_loader::fetch_config().await;
        app::run(config);
    });
}
