//! Extraction renderer: crop rectangle plus zoom and rotation to output raster.
//!
//! # Pipeline
//!
//! 1. [`ExtractionRequest`] snapshots rect, zoom, rotation and both metrics
//! 2. The crop maps to a native-pixel source region (`rect * scale / zoom`)
//! 3. Each output pixel samples that region, through a [`RotatedCanvas`] when
//!    the rotation is non-zero
//! 4. [`CroppedImage::encode`] produces bytes on demand

mod request;
mod sampler;

pub use request::{CroppedImage, ExtractionRequest};
pub use sampler::{sample_bilinear, RotatedCanvas, TRANSPARENT};

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Largest output side a browser canvas will allocate.
pub const MAX_SURFACE_SIDE: u32 = 32767;

/// Error types for extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No source image is loaded.
    #[error("No image loaded")]
    NoImage,

    /// The crop rectangle has no area; nothing was rendered.
    #[error("Nothing to extract: crop rectangle is empty")]
    NothingToExtract,

    /// The output surface could not be created.
    #[error("Cannot create a {width}x{height} output surface")]
    RenderContext { width: u32, height: u32 },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl ExtractError {
    /// True for failures that leave nothing to report to the user but are not
    /// errors in the usual sense.
    pub fn is_nothing_to_extract(&self) -> bool {
        matches!(self, ExtractError::NothingToExtract)
    }
}
