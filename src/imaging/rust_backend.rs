//! Pure Rust image processing backend — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::load_from_memory` (pure Rust decoders) |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ResizeParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image blob, inferring the format from its magic bytes.
fn load_image(blob: &[u8]) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(blob).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Encode a raster as JPEG at the given quality.
fn encode_jpeg(img: &DynamicImage, quality: u32) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), quality as u8);
    // JPEG has no alpha channel; flatten before encoding
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(out)
}

impl ImageBackend for RustBackend {
    fn identify(&self, blob: &[u8]) -> Result<Dimensions, BackendError> {
        let img = load_image(blob)?;
        let (width, height) = img.dimensions();
        Ok(Dimensions { width, height })
    }

    fn resize(&self, blob: &[u8], params: &ResizeParams) -> Result<Vec<u8>, BackendError> {
        let img = load_image(blob)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        encode_jpeg(&resized, params.quality.value())
    }
}
