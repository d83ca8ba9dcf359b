//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_raster`] - Encode a `JsRaster` as PNG, JPEG or WebP bytes
//! - [`to_data_url`] - Same, as a base64 data URL
//!
//! # Example
//!
//! ```typescript
//! import { encode_raster } from '@cropper/wasm';
//!
//! const bytes = encode_raster(raster, 'image/jpeg', 0.92);
//! const blob = new Blob([bytes], { type: 'image/jpeg' });
//! ```

use crate::types::JsRaster;
use cropper_core::encode::{self, EncodedImage, OutputFormat};
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag};

/// Encode an RGBA raster to PNG, JPEG or WebP bytes.
///
/// # Arguments
///
/// * `raster` - The RGBA raster to encode
/// * `format` - A MIME type (`"image/png"`, `"image/jpeg"`, `"image/webp"`) or
///   short name (`"png"`, `"jpg"`, `"jpeg"`, `"webp"`)
/// * `quality` - JPEG quality in `[0, 1]` (default 0.92). PNG and WebP are
///   lossless and ignore it
///
/// # Returns
///
/// A `Uint8Array` with the encoded bytes.
///
/// # Errors
///
/// Returns an error if:
/// - The format name is not recognized
/// - The pixel buffer length doesn't match width * height * 4
/// - Width or height is zero
/// - The encoder fails internally
///
/// # Example
///
/// ```typescript
/// const raster = new JsRaster(2, 2, new Uint8Array(16).fill(255));
/// const png = encode_raster(raster, 'png', 1.0);
/// console.log(`Encoded ${png.byteLength} bytes`);
/// ```
#[wasm_bindgen]
pub fn encode_raster(raster: &JsRaster, format: &str, quality: f32) -> Result<Vec<u8>, JsValue> {
    encode_js_raster(raster, format, quality).map(|encoded| encoded.bytes)
}

/// Encode an RGBA raster as a `data:<mime>;base64,...` URL.
///
/// Takes the same arguments as [`encode_raster`]. JPEG output has
/// transparent pixels flattened onto black.
///
/// # Example
///
/// ```typescript
/// img.src = to_data_url(raster, 'image/jpeg', 0.8);
/// ```
#[wasm_bindgen]
pub fn to_data_url(raster: &JsRaster, format: &str, quality: f32) -> Result<String, JsValue> {
    encode_js_raster(raster, format, quality).map(|encoded| encoded.to_data_url())
}

fn encode_js_raster(
    raster: &JsRaster,
    format: &str,
    quality: f32,
) -> Result<EncodedImage, JsValue> {
    let format: OutputFormat = format
        .parse()
        .map_err(|e: encode::EncodeError| JsValue::from_str(&e.to_string()))?;
    let raster = raster
        .to_raster()
        .ok_or_else(|| JsValue::from_str("Pixel buffer does not match width * height * 4"))?;
    encode::encode_raster(&raster, format, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Wrap encoded bytes in a `Blob` typed with their MIME type.
pub(crate) fn to_blob(encoded: &EncodedImage) -> Result<Blob, JsValue> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(encoded.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(encoded.mime_type());
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}
