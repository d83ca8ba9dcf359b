//! Cropper Core - Crop geometry engine
//!
//! This crate provides the framework-independent core of an interactive image
//! cropper: constraint solving for the crop rectangle, the pointer gesture
//! state machine, feature flags, change notifications and rendering of the
//! selected region from the source image.
//!
//! # Module Structure
//!
//! - `geometry` - Points, rectangles, metrics and rotation math
//! - `constraints` - Min/max size, aspect ratio and container solver
//! - `gesture` - Move, resize, create, freehand and cursor-follow gestures
//! - `features` - Named feature flags with legacy fallbacks
//! - `events` - Observer interface for committed changes
//! - `cropper` - The controller owning all state
//! - `extract` - Source-region mapping and rendering
//! - `decode` / `encode` - Image bytes in and out

pub mod constraints;
pub mod cropper;
pub mod decode;
pub mod encode;
pub mod events;
pub mod extract;
pub mod features;
pub mod geometry;
pub mod gesture;

pub use constraints::{resolve, Constraints, DEFAULT_MIN_SIZE};
pub use cropper::{default_rect, Cropper, CropperOptions, GridLine};
pub use decode::{decode_image, DecodeError};
pub use encode::{encode_raster, EncodeError, EncodedImage, OutputFormat, DEFAULT_QUALITY};
pub use events::{CropEvent, CropObserver};
pub use extract::{CroppedImage, ExtractError, ExtractionRequest, MAX_SURFACE_SIDE};
pub use features::{Feature, FeatureConfig, Features, LegacyToggles, UnknownFeature};
pub use geometry::{ContainerMetrics, ImageMetrics, Point, Rect, MAX_ZOOM, MIN_ZOOM};
pub use gesture::{FreehandPath, GestureMode, ResizeHandle};

/// Re-exported so hosts can build source rasters without a direct dependency.
pub use image;

#[cfg(test)]
mod tests {
    use super::*;

    /// Load, crop and extract through the public API only.
    #[test]
    fn test_end_to_end_extraction() {
        let source = image::RgbaImage::from_fn(40, 30, |x, y| {
            image::Rgba([(x * 6) as u8, (y * 8) as u8, 50, 255])
        });

        let mut cropper = Cropper::new(CropperOptions {
            initial_crop: Some(Rect::new(5.0, 5.0, 10.0, 8.0)),
            constraints: Constraints::unconstrained(),
            ..CropperOptions::default()
        });
        cropper.set_container_metrics(ContainerMetrics::new(40.0, 30.0));
        cropper.set_image_metrics(ImageMetrics::new(40, 30));

        let request = cropper.extraction_request().unwrap();
        let cropped = request.render(&source).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (10, 8));
        assert_eq!(cropped.raster().get_pixel(0, 0), source.get_pixel(5, 5));

        let encoded = cropped
            .encode(cropper.image_format(), cropper.image_quality())
            .unwrap();
        assert_eq!(encoded.mime_type(), "image/jpeg");
        let decoded = decode_image(&encoded.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (10, 8));
    }

    #[test]
    fn test_defaults_match_widget_defaults() {
        let options = CropperOptions::default();
        assert_eq!(options.constraints.min_width, 50.0);
        assert_eq!(options.constraints.min_height, 50.0);
        assert_eq!(options.zoom, 1.0);
        assert_eq!(options.rotation, 0.0);
        assert_eq!(options.image_format, OutputFormat::Jpeg);

        let features = Cropper::new(options).features();
        assert!(features.drag && features.resize && features.zoom);
        assert!(features.rotation && features.grid);
        assert!(!features.free_style && !features.cursor_follow);
        assert!(!features.photoshop_style && !features.freehand);
    }
}
