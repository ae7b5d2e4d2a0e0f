//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take a source blob, compute parameters, and call the backend.

use super::DERIVED_EDGES;
use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_derived_dimensions;
use super::params::{Quality, ResizeParams};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, blob: &[u8]) -> Result<(u32, u32)> {
    let dims = backend.identify(blob)?;
    Ok((dims.width, dims.height))
}

/// A derived raster produced from a source image.
#[derive(Debug, Clone)]
pub struct DerivedBlob {
    /// Target edge length this variant was derived for.
    pub edge: u32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Create the full derived set for a source image: one JPEG per entry in
/// [`DERIVED_EDGES`], smallest first.
///
/// The source is identified once; each variant preserves aspect ratio with
/// the longer edge scaled to the target. An undecodable source fails on the
/// identify step, before any resize runs.
pub fn create_derived_set(
    backend: &impl ImageBackend,
    source: &[u8],
    quality: Quality,
) -> Result<Vec<DerivedBlob>> {
    let dims = backend.identify(source)?;
    let original = (dims.width, dims.height);

    let mut variants = Vec::with_capacity(DERIVED_EDGES.len());
    for edge in DERIVED_EDGES {
        let (width, height) = calculate_derived_dimensions(original, edge);
        let data = backend.resize(
            source,
            &ResizeParams {
                width,
                height,
                quality,
            },
        )?;
        variants.push(DerivedBlob {
            edge,
            width,
            height,
            data,
        });
    }

    Ok(variants)
}
