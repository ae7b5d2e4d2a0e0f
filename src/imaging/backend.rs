//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and resize, both over in-memory blobs.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, statically
//! linked, no system dependencies.

use super::params::ResizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Both operations take the source as a byte slice and are pure with respect
/// to shared state, so they may run on any thread.
pub trait ImageBackend: Sync {
    /// Get the dimensions of an encoded image.
    fn identify(&self, blob: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode, resize to the exact dimensions in `params`, and re-encode
    /// as JPEG. Returns the encoded output blob.
    fn resize(&self, blob: &[u8], params: &ResizeParams) -> Result<Vec<u8>, BackendError>;
}
