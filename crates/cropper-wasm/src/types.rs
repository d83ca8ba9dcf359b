//! WASM-compatible wrapper types.
//!
//! [`JsRaster`] carries RGBA pixels across the boundary; the plain-data
//! structs here are what `serde-wasm-bindgen` turns into JS objects.

use cropper_core::image::RgbaImage;
use cropper_core::{Point, ResizeHandle};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// An RGBA raster for JavaScript.
///
/// Pixel data stays in WASM memory until `pixels()` copies it out as a
/// `Uint8Array`, which can be wrapped in an `ImageData` directly:
///
/// ```typescript
/// const raster = await cropper.getCroppedImageRaster();
/// const data = new ImageData(new Uint8ClampedArray(raster.pixels()), raster.width);
/// ```
#[wasm_bindgen]
pub struct JsRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRaster {
    /// Create a raster from RGBA pixel data (4 bytes per pixel, row-major).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsRaster {
        JsRaster {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsRaster {
    pub(crate) fn from_raster(raster: RgbaImage) -> Self {
        let (width, height) = raster.dimensions();
        Self {
            width,
            height,
            pixels: raster.into_raw(),
        }
    }

    /// `None` when the buffer length does not match the dimensions.
    pub(crate) fn to_raster(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }
}

/// A visible resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct HandleJs {
    pub handle: ResizeHandle,
    pub x: f64,
    pub y: f64,
}

impl From<(ResizeHandle, Point)> for HandleJs {
    fn from((handle, anchor): (ResizeHandle, Point)) -> Self {
        Self {
            handle,
            x: anchor.x,
            y: anchor.y,
        }
    }
}
