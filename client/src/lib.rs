use procam_common::AppConfig;
use wasm_bindgen::prelude::*;

pub mod app;
pub mod gallery;
pub mod media_recorder;
pub mod media_streams;
pub mod snapshot;
pub mod storage;
pub mod ui;
pub mod utils;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("ProCam client initialized");
}

/// Read the optional config object passed from the page
fn parse_config(value: JsValue) -> Result<AppConfig, JsValue> {
    let config = if value.is_undefined() || value.is_null() {
        AppConfig::default()
    } else {
        serde_wasm_bindgen::from_value(value)?
    };
    config.validate().map_err(utils::to_js)?;
    Ok(config)
}

/// Camera page entry point
#[wasm_bindgen]
pub async fn start(config: JsValue) -> Result<(), JsValue> {
    let config = parse_config(config)?;
    log::info!("Starting camera page");

    let app_state = app::AppState::new(config).await?;
    {
        let app = app_state.borrow();
        app.ui().register_event_listeners(app_state.clone())?;
    }
    app::watch_devices(&app_state);

    app_state.borrow_mut().initialize().await;
    log::info!("Camera page ready");
    Ok(())
}

/// Gallery page entry point
#[wasm_bindgen]
pub async fn start_gallery(config: JsValue) -> Result<(), JsValue> {
    let config = parse_config(config)?;
    log::info!("Starting gallery page");
    gallery::start(config).await
}
