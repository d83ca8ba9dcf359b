//! Extraction snapshots and their rendered output.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::sampler::{sample_bilinear, RotatedCanvas};
use super::{ExtractError, MAX_SURFACE_SIDE};
use crate::encode::{encode_raster, EncodedImage, OutputFormat};
use crate::geometry::{clamp_zoom, normalize_degrees, ContainerMetrics, ImageMetrics, Point, Rect};

/// Everything extraction needs, captured at one instant.
///
/// A request is a plain value: later changes to the cropper never reach a
/// request already taken, so a slow render always reflects the state at the
/// time it was requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    rect: Rect,
    zoom: f64,
    rotation: f64,
    image: ImageMetrics,
    container: ContainerMetrics,
}

impl ExtractionRequest {
    /// Zoom is clamped and rotation normalized the same way the cropper does.
    pub fn new(
        rect: Rect,
        zoom: f64,
        rotation: f64,
        image: ImageMetrics,
        container: ContainerMetrics,
    ) -> Self {
        let rotation = if rotation.is_finite() {
            normalize_degrees(rotation)
        } else {
            0.0
        };
        Self {
            rect,
            zoom: clamp_zoom(zoom),
            rotation,
            image,
            container,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn image(&self) -> ImageMetrics {
        self.image
    }

    pub fn container(&self) -> ContainerMetrics {
        self.container
    }

    /// Native pixels per container pixel, per axis.
    pub fn scale(&self) -> (f64, f64) {
        (
            self.image.natural_width as f64 / self.container.width,
            self.image.natural_height as f64 / self.container.height,
        )
    }

    /// The crop rectangle in native pixels, before rotation.
    pub fn source_region(&self) -> Rect {
        let (sx, sy) = self.scale();
        self.rect.scale(sx / self.zoom, sy / self.zoom)
    }

    /// Output raster size: the crop rectangle's size in container pixels.
    pub fn output_size(&self) -> (u32, u32) {
        (to_pixels(self.rect.width), to_pixels(self.rect.height))
    }

    /// Render the crop from `source`, the decoded native image.
    ///
    /// When `source` does not have the size recorded in the request, its
    /// actual size is used for the source mapping.
    pub fn render(&self, source: &RgbaImage) -> Result<CroppedImage, ExtractError> {
        if source.width() == 0 || source.height() == 0 {
            return Err(ExtractError::NoImage);
        }
        if self.container.is_empty() {
            return Err(ExtractError::NothingToExtract);
        }

        let (out_w, out_h) = self.output_size();
        if out_w == 0 || out_h == 0 {
            return Err(ExtractError::NothingToExtract);
        }
        if out_w > MAX_SURFACE_SIDE || out_h > MAX_SURFACE_SIDE {
            return Err(ExtractError::RenderContext {
                width: out_w,
                height: out_h,
            });
        }

        let request = self.matching(source);
        let region = request.source_region();
        let step_x = region.width / out_w as f64;
        let step_y = region.height / out_h as f64;
        let source_point = |u: u32, v: u32| {
            Point::new(
                region.x + (u as f64 + 0.5) * step_x,
                region.y + (v as f64 + 0.5) * step_y,
            )
        };

        let mut raster = RgbaImage::new(out_w, out_h);
        if request.rotation == 0.0 {
            for (u, v, pixel) in raster.enumerate_pixels_mut() {
                let p = source_point(u, v);
                *pixel = sample_bilinear(source, p.x, p.y);
            }
        } else {
            let canvas = RotatedCanvas::new(source, request.rotation);
            for (u, v, pixel) in raster.enumerate_pixels_mut() {
                *pixel = canvas.sample(canvas.to_canvas(source_point(u, v)));
            }
        }

        log::debug!(
            "rendered {}x{} crop from region {:?} at {} deg",
            out_w,
            out_h,
            region,
            request.rotation
        );
        Ok(CroppedImage { raster })
    }

    fn matching(&self, source: &RgbaImage) -> Self {
        let actual = ImageMetrics::new(source.width(), source.height());
        if actual == self.image {
            return *self;
        }
        log::warn!(
            "source is {}x{}, request expected {}x{}",
            actual.natural_width,
            actual.natural_height,
            self.image.natural_width,
            self.image.natural_height
        );
        Self {
            image: actual,
            ..*self
        }
    }
}

/// Round a container extent to whole output pixels; non-finite or negative
/// extents become zero.
fn to_pixels(extent: f64) -> u32 {
    if extent.is_finite() && extent > 0.0 {
        extent.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// A rendered crop, not yet encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedImage {
    raster: RgbaImage,
}

impl CroppedImage {
    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn into_raster(self) -> RgbaImage {
        self.raster
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Encoded bytes with their MIME type, the blob equivalent.
    pub fn encode(&self, format: OutputFormat, quality: f32) -> Result<EncodedImage, ExtractError> {
        Ok(encode_raster(&self.raster, format, quality)?)
    }

    /// Base64 data URL of the encoded crop.
    pub fn to_data_url(&self, format: OutputFormat, quality: f32) -> Result<String, ExtractError> {
        Ok(self.encode(format, quality)?.to_data_url())
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
