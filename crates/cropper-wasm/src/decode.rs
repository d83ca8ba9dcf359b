//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@cropper/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const raster = decode_image(bytes);
//! console.log(`Decoded ${raster.width}x${raster.height}`);
//! ```

use crate::types::JsRaster;
use cropper_core::decode;
use wasm_bindgen::prelude::*;

/// Decode PNG, JPEG or WebP bytes into an RGBA raster.
///
/// The format is detected from the leading bytes, not from a file name.
///
/// # Arguments
///
/// * `bytes` - The encoded file contents as a `Uint8Array`
///
/// # Returns
///
/// A `JsRaster` with 4 bytes per pixel, row-major.
///
/// # Errors
///
/// Returns an error if:
/// - The bytes are empty
/// - The format is not recognized
/// - The data is truncated or corrupted
///
/// # Example
///
/// ```typescript
/// const raster = decode_image(new Uint8Array(await file.arrayBuffer()));
/// const data = new ImageData(new Uint8ClampedArray(raster.pixels()), raster.width);
/// ```
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRaster, JsValue> {
    decode::decode_image(bytes)
        .map(JsRaster::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use cropper_core::encode::{encode_raster, OutputFormat};
    use cropper_core::image::{Rgba, RgbaImage};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_png() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        let png = encode_raster(&img, OutputFormat::Png, 1.0).unwrap();
        let raster = decode_image(&png.bytes).unwrap();
        assert_eq!((raster.width(), raster.height()), (3, 2));
    }

    #[wasm_bindgen_test]
    fn test_decode_garbage() {
        assert!(decode_image(&[1, 2, 3]).is_err());
    }
}
