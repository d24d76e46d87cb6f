//! Chat deck — WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the browser adapters, starts the session loop and exposes
//! the result to JavaScript as `ChatClient`.

mod app;

pub use app::ChatClient;

use gloo_utils::format::JsValueSerdeExt;
use wasm_bindgen::prelude::*;

use chatdeck_types::DeckError;

/// WASM entry point, runs once when the module is instantiated
#[wasm_bindgen(start)]
pub fn main() {
    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Chat deck WASM starting...");
}

/// Split a finished response into deck sections.
/// Returns `null` when the text has no usable structure.
#[wasm_bindgen(js_name = parseDeckSections)]
pub fn parse_deck_sections(text: &str) -> Result<JsValue, JsValue> {
    let sections = chatdeck_core::parse_deck_sections(text);
    JsValue::from_serde(&sections).map_err(|e| to_js(DeckError::from(e)))
}

pub(crate) fn to_js(err: DeckError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
