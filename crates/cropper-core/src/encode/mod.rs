//! Encoding extracted crops for hand-off to the host.
//!
//! This module provides:
//! - [`OutputFormat`]: PNG, JPEG or WebP, named by MIME type
//! - [`encode_raster`]: RGBA raster to encoded bytes
//! - [`EncodedImage`]: the bytes plus base64 and data URL views
//!
//! # Examples
//!
//! ```ignore
//! use cropper_core::encode::{encode_raster, OutputFormat};
//!
//! let encoded = encode_raster(&raster, OutputFormat::Jpeg, 0.92)?;
//! let url = encoded.to_data_url();
//! ```

mod format;
mod raster;

pub use format::{OutputFormat, DEFAULT_QUALITY};
pub use raster::{encode_raster, jpeg_quality, EncodeError, EncodedImage};
