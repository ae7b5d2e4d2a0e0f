//! Image operations on a painting's multi-resolution set.
//!
//! The three operations here — attach, detach, toggle rendered — are the
//! only writers of a painting's image set. Each is a strictly sequential
//! pipeline over external collaborators:
//!
//! ```text
//! attach:  decode → resize ×3 → upload ×4 → append entry → persist
//! detach:  find by original URL → delete ×4 (best effort) → splice → persist
//! ```
//!
//! Two guarantees the pipeline enforces:
//!
//! - **All-or-nothing append.** A persisted record never carries a partial
//!   entry. If any of the four uploads fails, the already-uploaded objects
//!   are deleted best-effort and the record is left untouched.
//! - **No lost updates.** The read-modify-write over the record runs under
//!   the store's optimistic version and retries a bounded number of times
//!   on conflict, so two concurrent attaches both land.
//!
//! CDN deletes on the detach path are best-effort: a failure (including
//! not-found for objects already gone) is logged and the detach proceeds,
//! keeping the record's alignment invariant independent of remote state.

use crate::catalog::image_set::{CatalogImage, ImageRef};
use crate::catalog::record::{Painting, Record};
use crate::catalog::store::{JsonStore, StoreError};
use crate::catalog::update::Invalidator;
use crate::cdn::{self, CdnError, CdnStore, UploadedFile};
use crate::imaging::{DERIVED_EDGES, ImageBackend, Quality, create_derived_set};
use thiserror::Error;
use tracing::{info, warn};

/// Attempts for the optimistic read-modify-write before giving up.
const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error(transparent)]
    Imaging(#[from] crate::imaging::BackendError),
    #[error("upload failed before any object was stored: {0}")]
    Upload(#[source] CdnError),
    #[error("upload failed after {uploaded} of 4 objects were stored: {source}")]
    PartialUpload {
        uploaded: usize,
        #[source]
        source: CdnError,
    },
    #[error("no image with original URL '{0}' on this painting")]
    UrlNotFound(String),
    #[error("image index {index} out of range (painting has {len} images)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// CDN folder for one resolution of one painting's images.
fn resolution_folder(painting_id: &str, edge: Option<u32>) -> String {
    match edge {
        None => format!("/paintings/full/{painting_id}"),
        Some(edge) => format!("/paintings/{edge}/{painting_id}"),
    }
}

/// Attach a new image to a painting and return its index in the set.
///
/// The source is decoded and resized before anything leaves the process; an
/// undecodable blob fails without a single upload. Uploads go original
/// first, then the three derived sizes smallest first, each into its
/// resolution folder namespaced by the painting's business key.
pub fn attach_image(
    store: &JsonStore,
    cdn_store: &dyn CdnStore,
    backend: &impl ImageBackend,
    invalidator: &dyn Invalidator,
    painting_id: &str,
    blob: &[u8],
    file_name: &str,
) -> Result<usize, MediaError> {
    // Fail fast on an unknown painting before doing any pixel or network work
    store.get_required::<Painting>(painting_id)?;

    let derived = create_derived_set(backend, blob, Quality::default())?;

    // Upload all four objects; on failure, roll back the ones that made it
    let mut uploaded: Vec<UploadedFile> = Vec::with_capacity(1 + DERIVED_EDGES.len());

    let original = upload_or_rollback(
        cdn_store,
        blob,
        &resolution_folder(painting_id, None),
        file_name,
        &mut uploaded,
    )?;
    uploaded.push(original);

    for variant in &derived {
        let derived_name = format!("{}_{file_name}", variant.edge);
        let file = upload_or_rollback(
            cdn_store,
            &variant.data,
            &resolution_folder(painting_id, Some(variant.edge)),
            &derived_name,
            &mut uploaded,
        )?;
        uploaded.push(file);
    }

    let to_ref = |f: &UploadedFile| ImageRef::new(f.url.clone(), f.file_id.clone());
    let entry = CatalogImage {
        original: to_ref(&uploaded[0]),
        small: to_ref(&uploaded[1]),
        medium: to_ref(&uploaded[2]),
        large: to_ref(&uploaded[3]),
        rendered: false,
    };

    // Optimistic append; all four objects exist by now, so a lost race just
    // re-reads and re-appends
    let mut attempts = 0;
    let index = loop {
        attempts += 1;
        let envelope = match store.get_required::<Painting>(painting_id) {
            Ok(e) => e,
            Err(e) => {
                rollback_uploads(cdn_store, &uploaded);
                return Err(e.into());
            }
        };
        let mut painting = envelope.record;
        let index = painting.images.push(entry.clone());
        match store.put(painting, envelope.version) {
            Ok(_) => break index,
            Err(StoreError::VersionConflict { .. }) if attempts < MAX_WRITE_ATTEMPTS => continue,
            Err(e) => {
                rollback_uploads(cdn_store, &uploaded);
                return Err(e.into());
            }
        }
    };

    invalidator.list_changed(Painting::COLLECTION);
    invalidator.record_changed(Painting::COLLECTION, painting_id);
    info!(painting_id, index, "image attached");
    Ok(index)
}

/// Upload one object, deleting everything in `already_uploaded` on failure.
fn upload_or_rollback(
    cdn_store: &dyn CdnStore,
    blob: &[u8],
    folder: &str,
    file_name: &str,
    already_uploaded: &mut Vec<UploadedFile>,
) -> Result<UploadedFile, MediaError> {
    match cdn_store.upload(blob, folder, file_name) {
        Ok(file) => Ok(file),
        Err(e) => {
            let uploaded = already_uploaded.len();
            rollback_uploads(cdn_store, already_uploaded);
            if uploaded == 0 {
                Err(MediaError::Upload(e))
            } else {
                Err(MediaError::PartialUpload { uploaded, source: e })
            }
        }
    }
}

fn rollback_uploads(cdn_store: &dyn CdnStore, uploaded: &[UploadedFile]) {
    if uploaded.is_empty() {
        return;
    }
    warn!(count = uploaded.len(), "rolling back uploaded CDN objects");
    for file in uploaded {
        cdn::best_effort_delete(cdn_store, &file.file_id);
    }
}

/// Detach the image whose *original* URL matches, deleting its four CDN
/// objects best-effort before splicing the entry out and persisting.
pub fn detach_image(
    store: &JsonStore,
    cdn_store: &dyn CdnStore,
    invalidator: &dyn Invalidator,
    painting_id: &str,
    url: &str,
) -> Result<(), MediaError> {
    let mut cdn_cleaned = false;
    let mut attempts = 0;
    loop {
        attempts += 1;
        let envelope = store.get_required::<Painting>(painting_id)?;
        let mut painting = envelope.record;

        let Some(index) = painting.images.index_of_original_url(url) else {
            if cdn_cleaned {
                // Another writer spliced the same entry between our attempts
                break;
            }
            return Err(MediaError::UrlNotFound(url.to_string()));
        };

        if !cdn_cleaned {
            // Capture the ids before the entry disappears
            let entry = painting.images.get(index).expect("index from lookup").clone();
            for file_id in entry.file_ids() {
                cdn::best_effort_delete(cdn_store, file_id);
            }
            cdn_cleaned = true;
        }

        painting.images.remove_at(index);
        match store.put(painting, envelope.version) {
            Ok(_) => break,
            Err(StoreError::VersionConflict { .. }) if attempts < MAX_WRITE_ATTEMPTS => continue,
            Err(e) => return Err(e.into()),
        }
    }

    invalidator.list_changed(Painting::COLLECTION);
    invalidator.record_changed(Painting::COLLECTION, painting_id);
    info!(painting_id, url, "image detached");
    Ok(())
}

/// Flip the rendered flag of the image at `index`, touching nothing else.
pub fn set_rendered(
    store: &JsonStore,
    invalidator: &dyn Invalidator,
    painting_id: &str,
    index: usize,
    value: bool,
) -> Result<(), MediaError> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        let envelope = store.get_required::<Painting>(painting_id)?;
        let mut painting = envelope.record;

        if !painting.images.set_rendered(index, value) {
            return Err(MediaError::IndexOutOfRange {
                index,
                len: painting.images.len(),
            });
        }
        match store.put(painting, envelope.version) {
            Ok(_) => break,
            Err(StoreError::VersionConflict { .. }) if attempts < MAX_WRITE_ATTEMPTS => continue,
            Err(e) => return Err(e.into()),
        }
    }

    invalidator.record_changed(Painting::COLLECTION, painting_id);
    info!(painting_id, index, value, "rendered flag set");
    Ok(())
}
