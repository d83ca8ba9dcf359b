//! Format-sniffing decoder for PNG, JPEG and WebP sources.

use std::io::Cursor;

use image::{ImageReader, RgbaImage};
use thiserror::Error;

/// Error types for source decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// Decoded successfully but has no pixels.
    #[error("Image has zero width or height")]
    EmptyImage,
}

/// Decode `bytes` into an RGBA raster, guessing the format from its signature.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let raster = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?
        .into_rgba8();

    if raster.width() == 0 || raster.height() == 0 {
        return Err(DecodeError::EmptyImage);
    }

    log::debug!("decoded {}x{} source", raster.width(), raster.height());
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_raster, OutputFormat};
    use image::Rgba;

    fn sample() -> RgbaImage {
        let mut raster = RgbaImage::new(4, 3);
        for (x, y, pixel) in raster.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 60) as u8, (y * 80) as u8, 7, 255]);
        }
        raster
    }

    #[test]
    fn test_decode_png() {
        let encoded = encode_raster(&sample(), OutputFormat::Png, 1.0).unwrap();
        let decoded = decode_image(&encoded.bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_decode_jpeg_dimensions() {
        let encoded = encode_raster(&sample(), OutputFormat::Jpeg, 0.9).unwrap();
        let decoded = decode_image(&encoded.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        // JPEG has no alpha; decoded pixels are opaque
        assert!(decoded.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_decode_webp() {
        let encoded = encode_raster(&sample(), OutputFormat::Webp, 1.0).unwrap();
        let decoded = decode_image(&encoded.bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_unknown_bytes() {
        let result = decode_image(b"definitely not an image");
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let encoded = encode_raster(&sample(), OutputFormat::Png, 1.0).unwrap();
        let truncated = &encoded.bytes[..encoded.bytes.len() / 2];
        assert!(matches!(
            decode_image(truncated),
            Err(DecodeError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_decode_error_display() {
        assert_eq!(
            DecodeError::InvalidFormat.to_string(),
            "Invalid or unsupported image format"
        );
    }
}
