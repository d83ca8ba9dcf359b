//! Decoding host-supplied image bytes into the RGBA source raster.
//!
//! The cropper itself never touches files; hosts that only have encoded bytes
//! (an upload, a fetch response) decode them here before extraction.

mod source;

pub use source::{decode_image, DecodeError};
