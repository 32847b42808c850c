pub mod composition;
pub mod dsp;
pub mod error;
#[cfg(feature = "export")]
pub mod export;
pub mod notation;
pub mod pitch;
pub mod preset;

use crate::composition::Composition;
use crate::dsp::buffer::StereoBuffer;
use crate::dsp::engine::AudioEngine;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the scorewalker-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Render a composition to a normalized stereo buffer.
pub fn render(composition: &Composition) -> StereoBuffer {
    AudioEngine::from_composition(composition).render(composition)
}

/// WASM-exposed: render a JSON composition to a WAV byte array.
#[wasm_bindgen]
pub fn render_composition_wav(json: &str) -> Result<Vec<u8>, JsValue> {
    let composition = Composition::from_json(json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(dsp::renderer::render_wav(&composition))
}

/// WASM-exposed: parse text notation into a tune object.
/// Errors carry a plain-text diagnostic pointing at the offending text.
#[wasm_bindgen]
pub fn parse_notation(source: &str) -> Result<JsValue, JsValue> {
    let tune = notation::parse_tune(source).map_err(|e| JsValue::from_str(&e.report("tune", source)))?;
    serde_wasm_bindgen::to_value(&tune).map_err(|e| JsValue::from_str(&format!("{e}")))
}
