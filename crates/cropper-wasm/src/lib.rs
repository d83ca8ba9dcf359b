//! Cropper WASM - WebAssembly bindings for the cropper engine
//!
//! This crate exposes cropper-core to JavaScript/TypeScript hosts. The host
//! owns the DOM: it reports container size and pointer positions, draws the
//! overlay from `getCrop()`, `handles()` and `gridLines()`, and asks for the
//! cropped result as a Blob, data URL or raw raster.
//!
//! # Module Structure
//!
//! - `cropper` - The `Cropper` class (state, gestures, callbacks, extraction)
//! - `types` - WASM-compatible wrapper types for raster data
//! - `decode` - Standalone image decoding
//! - `encode` - Standalone raster encoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { Cropper } from '@cropper/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const cropper = new Cropper({ image_format: 'image/png' });
//! cropper.setContainerSize(640, 480);
//! cropper.loadImage(new Uint8Array(await file.arrayBuffer()));
//! const url = await cropper.getCroppedImageBase64();
//! ```

use wasm_bindgen::prelude::*;

mod cropper;
mod decode;
mod encode;
mod types;

// Re-export public types
pub use cropper::JsCropper;
pub use decode::decode_image;
pub use encode::{encode_raster, to_data_url};
pub use types::JsRaster;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A host may load the module twice; keep the first logger
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Change how much the engine logs to the browser console.
///
/// Accepts `"error"`, `"warn"`, `"info"`, `"debug"` or `"trace"`.
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let level = parse_level(level).ok_or_else(|| {
        JsValue::from_str(&format!("Unknown log level: {}", level))
    })?;
    log::set_max_level(level);
    Ok(())
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn parse_level(level: &str) -> Option<log::LevelFilter> {
    level.parse::<log::Level>().ok().map(|l| l.to_level_filter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(log::LevelFilter::Debug));
        assert_eq!(parse_level("WARN"), Some(log::LevelFilter::Warn));
        assert_eq!(parse_level("loud"), None);
    }
}
