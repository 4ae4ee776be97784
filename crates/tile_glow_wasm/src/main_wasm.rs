use wasm_bindgen::prelude::*;
use web_sys::console;

pub(crate) fn main_wasm() -> Result<(), JsValue> {
    console::log_1(&format!("Starting tile_glow {}", env!("CARGO_PKG_VERSION")).into());
    tile_glow::run();
    Ok(())
}
