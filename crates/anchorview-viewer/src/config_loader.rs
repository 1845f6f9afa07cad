//! Deployment config fetched next to the page

use anchorview_core::Config;
use wasm_bindgen::JsCast;

const DEFAULT_CONFIG_URL: &str = "anchorview.toml";

/// `?config=` URL parameter, or the default file name
fn config_url() -> String {
    web_sys::window()
        .and_then(|window| window.location().href().ok())
        .and_then(|href| web_sys::Url::new(&href).ok())
        .and_then(|url| url.search_params().get("config"))
        .unwrap_or_else(|| DEFAULT_CONFIG_URL.to_string())
}

/// Fetch and parse the config, falling back to defaults on any failure
pub async fn fetch_config() -> Config {
    let url = config_url();
    match fetch_text(&url).await {
        Ok(content) => match Config::from_toml(&content) {
            Ok(config) => {
                tracing::info!(%url, "Loaded configuration");
                config
            }
            Err(e) => {
                tracing::error!(%url, error = %e, "Invalid configuration, using defaults");
                Config::default()
            }
        },
        Err(e) => {
            tracing::info!(%url, error = %e, "Configuration not available, using defaults");
            Config::default()
        }
    }
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or("No window")?;

    let resp = wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| format!("Fetch failed: {:?}", e))?;

    let resp: web_sys::Response = resp.dyn_into().map_err(|_| "Response cast failed")?;

    if !resp.ok() {
        return Err(format!("HTTP {}: {}", resp.status(), resp.status_text()));
    }

    let text = wasm_bindgen_futures::JsFuture::from(resp.text().map_err(|_| "Failed to get text")?)
        .await
        .map_err(|e| format!("Text extraction failed: {:?}", e))?;

    text.as_string().ok_or_else(|| "Response is not text".to_string())
}
