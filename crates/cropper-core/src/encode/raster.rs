//! Raster encoding for extracted crops.
//!
//! PNG and WebP are lossless and keep the alpha channel. JPEG has no alpha, so
//! transparent pixels are composited over black first, the same result a
//! browser canvas produces for `image/jpeg`.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;

use super::format::{OutputFormat, DEFAULT_QUALITY};

/// Errors that can occur while encoding a crop.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The codec rejected the raster
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },
}

/// Encoded bytes tagged with their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Standard (padded) base64 of the encoded bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }
}

/// Map a `[0, 1]` quality onto the JPEG encoder's `1..=100` scale.
///
/// Non-finite input falls back to [`DEFAULT_QUALITY`].
pub fn jpeg_quality(quality: f32) -> u8 {
    let quality = if quality.is_finite() {
        quality
    } else {
        DEFAULT_QUALITY
    };
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode an RGBA raster. `quality` only affects lossy formats.
pub fn encode_raster(
    raster: &RgbaImage,
    format: OutputFormat,
    quality: f32,
) -> Result<EncodedImage, EncodeError> {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let mut buffer = Cursor::new(Vec::new());
    let result = match format {
        OutputFormat::Png => PngEncoder::new(&mut buffer).write_image(
            raster.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        OutputFormat::Webp => WebPEncoder::new_lossless(&mut buffer).write_image(
            raster.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        OutputFormat::Jpeg => {
            let rgb = flatten_onto_black(raster);
            JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality)).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };

    result.map_err(|e| EncodeError::EncodingFailed {
        format,
        message: e.to_string(),
    })?;

    Ok(EncodedImage {
        bytes: buffer.into_inner(),
        format,
    })
}

/// Composite RGBA over opaque black into packed RGB.
fn flatten_onto_black(raster: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(raster.width() as usize * raster.height() as usize * 3);
    for pixel in raster.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        rgb.push(((r as u32 * alpha + 127) / 255) as u8);
        rgb.push(((g as u32 * alpha + 127) / 255) as u8);
        rgb.push(((b as u32 * alpha + 127) / 255) as u8);
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gray(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
    }

    #[test]
    fn test_encode_jpeg_markers() {
        let out = encode_raster(&gray(16, 16), OutputFormat::Jpeg, 0.9).unwrap();
        assert_eq!(&out.bytes[0..2], &[0xFF, 0xD8]);
        let len = out.bytes.len();
        assert_eq!(&out.bytes[len - 2..], &[0xFF, 0xD9]);
        assert_eq!(out.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_encode_png_signature() {
        let out = encode_raster(&gray(8, 4), OutputFormat::Png, 0.5).unwrap();
        assert_eq!(&out.bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_encode_webp_riff_header() {
        let out = encode_raster(&gray(8, 8), OutputFormat::Webp, 0.5).unwrap();
        assert_eq!(&out.bytes[0..4], b"RIFF");
        assert_eq!(&out.bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_png_keeps_alpha() {
        let mut raster = gray(2, 1);
        raster.put_pixel(1, 0, Rgba([10, 20, 30, 0]));
        let out = encode_raster(&raster, OutputFormat::Png, 1.0).unwrap();

        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(1, 0), &Rgba([10, 20, 30, 0]));
    }

    #[test]
    fn test_encode_zero_size() {
        let result = encode_raster(&RgbaImage::new(0, 5), OutputFormat::Png, 1.0);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidDimensions {
                width: 0,
                height: 5
            })
        ));
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.92), 92);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(7.0), 100);
        assert_eq!(jpeg_quality(f32::NAN), 92);
    }

    #[test]
    fn test_flatten_onto_black() {
        let mut raster = RgbaImage::new(3, 1);
        raster.put_pixel(0, 0, Rgba([200, 100, 50, 255]));
        raster.put_pixel(1, 0, Rgba([200, 100, 50, 0]));
        raster.put_pixel(2, 0, Rgba([255, 255, 255, 128]));
        assert_eq!(
            flatten_onto_black(&raster),
            vec![200, 100, 50, 0, 0, 0, 128, 128, 128]
        );
    }

    #[test]
    fn test_data_url() {
        let encoded = EncodedImage {
            bytes: b"hi".to_vec(),
            format: OutputFormat::Png,
        };
        assert_eq!(encoded.to_base64(), "aGk=");
        assert_eq!(encoded.to_data_url(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let mut raster = RgbaImage::new(40, 40);
        for (x, y, pixel) in raster.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 6) as u8, (y * 6) as u8, ((x + y) * 3) as u8, 255]);
        }
        let low = encode_raster(&raster, OutputFormat::Jpeg, 0.1).unwrap();
        let high = encode_raster(&raster, OutputFormat::Jpeg, 1.0).unwrap();
        assert!(low.bytes.len() < high.bytes.len());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
