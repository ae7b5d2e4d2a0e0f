//! Painting record synchronizer.
//!
//! A painting update is more than a field copy: the painting's artist
//! association is mirrored on the artist side (each artist record lists the
//! business keys of its paintings), so changing `artist_id` moves the
//! painting reference between two artist records. The rules, in order:
//!
//! 1. The form is validated before anything is read or written.
//! 2. A reassignment first verifies the destination artist exists — an
//!    update must not proceed into a dangling reference.
//! 3. The reference is pulled from the previous artist; a missing previous
//!    artist or an already-absent reference is logged, not fatal (legacy
//!    data drifts).
//! 4. The reference is added to the new artist exactly once.
//! 5. The painting is persisted under its optimistic version, and the cache
//!    invalidation signals fire.
//!
//! Deleting a painting pulls the reference symmetrically and best-effort
//! deletes every CDN object its image set references.

use super::forms::{PaintingForm, ValidationError};
use super::record::{Artist, Painting, Record};
use super::store::{JsonStore, StoreError};
use crate::cdn::{self, CdnStore};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no artist with artist_id '{0}'")]
    ArtistNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Cdn(#[from] crate::cdn::CdnError),
}

/// Receives change signals so externally cached page renders can be
/// invalidated. The cache itself is an external collaborator; this crate
/// only reports *what* changed.
pub trait Invalidator {
    fn list_changed(&self, collection: &'static str);
    fn record_changed(&self, collection: &'static str, key: &str);
}

/// For callers with nothing to invalidate (batch tools, tests).
pub struct NoopInvalidator;

impl Invalidator for NoopInvalidator {
    fn list_changed(&self, _collection: &'static str) {}
    fn record_changed(&self, _collection: &'static str, _key: &str) {}
}

/// Create an empty painting under a fresh business key. The key must be
/// unused — the "new painting" screen checks first, and the store enforces
/// it again here.
pub fn create_painting(
    store: &JsonStore,
    invalidator: &dyn Invalidator,
    painting_id: &str,
) -> Result<Painting, UpdateError> {
    let envelope = store.put_new(Painting::new(painting_id))?;
    invalidator.list_changed(Painting::COLLECTION);
    info!(painting_id, "painting created");
    Ok(envelope.record)
}

/// Apply a validated field-set update to a painting, synchronizing the
/// artist cross-reference when the association changed.
pub fn update_painting(
    store: &JsonStore,
    invalidator: &dyn Invalidator,
    painting_id: &str,
    form: PaintingForm,
) -> Result<Painting, UpdateError> {
    let form = form.into_validated()?;
    let envelope = store.get_required::<Painting>(painting_id)?;
    let mut painting = envelope.record;

    if form.artist_id != painting.artist_id {
        reassign_artist(store, painting_id, &painting.artist_id, &form.artist_id)?;
    }

    form.apply_to(&mut painting);
    let updated = store.put(painting, envelope.version)?;

    invalidator.list_changed(Painting::COLLECTION);
    invalidator.record_changed(Painting::COLLECTION, painting_id);
    info!(painting_id, "painting updated");
    Ok(updated.record)
}

/// Delete a painting: pull its reference from the owning artist, delete its
/// CDN objects best-effort, remove the record.
pub fn delete_painting(
    store: &JsonStore,
    cdn_store: &dyn CdnStore,
    invalidator: &dyn Invalidator,
    painting_id: &str,
) -> Result<Painting, UpdateError> {
    let envelope = store.get_required::<Painting>(painting_id)?;
    let painting = envelope.record;

    if !painting.artist_id.is_empty() {
        pull_artist_reference(store, &painting.artist_id, painting_id)?;
    }

    for image in painting.images.iter() {
        for file_id in image.file_ids() {
            cdn::best_effort_delete(cdn_store, file_id);
        }
    }

    store.delete::<Painting>(painting_id)?;
    invalidator.list_changed(Painting::COLLECTION);
    invalidator.record_changed(Painting::COLLECTION, painting_id);
    info!(painting_id, "painting deleted");
    Ok(painting)
}

/// Move the painting reference from `old_artist_id` to `new_artist_id`.
///
/// The destination is verified first so a failed lookup aborts before any
/// record changes; once past that point the pull side is tolerant of legacy
/// drift (missing artist, reference already gone).
fn reassign_artist(
    store: &JsonStore,
    painting_id: &str,
    old_artist_id: &str,
    new_artist_id: &str,
) -> Result<(), UpdateError> {
    let destination = store
        .get::<Artist>(new_artist_id)?
        .ok_or_else(|| UpdateError::ArtistNotFound(new_artist_id.to_string()))?;

    if !old_artist_id.is_empty() {
        pull_artist_reference(store, old_artist_id, painting_id)?;
    }

    let mut artist = destination.record;
    if !artist.paintings.iter().any(|k| k == painting_id) {
        artist.paintings.push(painting_id.to_string());
        store.put(artist, destination.version)?;
    }
    Ok(())
}

/// Remove `painting_id` from an artist's reference list. A missing artist
/// or an already-absent reference is a warning, not an error.
fn pull_artist_reference(
    store: &JsonStore,
    artist_id: &str,
    painting_id: &str,
) -> Result<(), StoreError> {
    let Some(envelope) = store.get::<Artist>(artist_id)? else {
        warn!(artist_id, painting_id, "previous artist missing; reference not pulled");
        return Ok(());
    };

    let mut artist = envelope.record;
    let before = artist.paintings.len();
    artist.paintings.retain(|k| k != painting_id);
    if artist.paintings.len() == before {
        warn!(artist_id, painting_id, "painting reference already absent from previous artist");
        return Ok(());
    }
    store.put(artist, envelope.version)?;
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::cdn::tests::MockCdn;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records invalidation signals for assertions.
    #[derive(Default)]
    pub struct RecordingInvalidator {
        pub signals: Mutex<Vec<String>>,
    }

    impl RecordingInvalidator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_signals(&self) -> Vec<String> {
            self.signals.lock().unwrap().clone()
        }
    }

    impl Invalidator for RecordingInvalidator {
        fn list_changed(&self, collection: &'static str) {
            self.signals.lock().unwrap().push(format!("list:{collection}"));
        }

        fn record_changed(&self, collection: &'static str, key: &str) {
            self.signals
                .lock()
                .unwrap()
                .push(format!("record:{collection}/{key}"));
        }
    }

    fn seed_artist(store: &JsonStore, artist_id: &str) {
        store
            .put_new(Artist {
                artist_id: artist_id.into(),
                name: format!("Artist {artist_id}"),
                ..Artist::default()
            })
            .unwrap();
    }

    fn painting_form(artist_id: &str) -> PaintingForm {
        PaintingForm {
            title: "Bamboo After Rain".into(),
            creation_year: "2003".into(),
            artist_id: artist_id.into(),
            material: "ink and color on silk".into(),
            description: "Album leaf".into(),
            ..PaintingForm::default()
        }
    }

    fn artist_paintings(store: &JsonStore, artist_id: &str) -> Vec<String> {
        store
            .get::<Artist>(artist_id)
            .unwrap()
            .unwrap()
            .record
            .paintings
    }

    // =========================================================================
    // create / delete
    // =========================================================================

    #[test]
    fn create_rejects_existing_id() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();

        create_painting(&store, &NoopInvalidator, "p-001").unwrap();
        assert!(matches!(
            create_painting(&store, &NoopInvalidator, "p-001"),
            Err(UpdateError::Store(StoreError::DuplicateKey { .. }))
        ));
    }

    #[test]
    fn delete_pulls_reference_and_deletes_cdn_objects() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        let cdn = MockCdn::new();
        seed_artist(&store, "a-1");

        create_painting(&store, &NoopInvalidator, "p-001").unwrap();
        update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-1")).unwrap();

        // Give it one image with four stored objects
        let envelope = store.get::<Painting>("p-001").unwrap().unwrap();
        let mut painting = envelope.record;
        painting.images.push(crate::catalog::image_set::CatalogImage {
            original: crate::catalog::image_set::ImageRef::new("u", "f-orig"),
            small: crate::catalog::image_set::ImageRef::new("u150", "f-150"),
            medium: crate::catalog::image_set::ImageRef::new("u300", "f-300"),
            large: crate::catalog::image_set::ImageRef::new("u1000", "f-1000"),
            rendered: false,
        });
        store.put(painting, envelope.version).unwrap();

        delete_painting(&store, &cdn, &NoopInvalidator, "p-001").unwrap();

        assert!(store.get::<Painting>("p-001").unwrap().is_none());
        assert!(artist_paintings(&store, "a-1").is_empty());
        // Four delete attempts, NotFound on each (mock never stored them) — ignored
        assert_eq!(cdn.delete_count(), 4);
    }

    // =========================================================================
    // update + reassignment
    // =========================================================================

    #[test]
    fn first_assignment_adds_reference() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        seed_artist(&store, "a-1");
        create_painting(&store, &NoopInvalidator, "p-001").unwrap();

        let updated =
            update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-1")).unwrap();

        assert_eq!(updated.artist_id, "a-1");
        assert_eq!(artist_paintings(&store, "a-1"), vec!["p-001".to_string()]);
    }

    #[test]
    fn reassignment_moves_reference_between_artists() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        seed_artist(&store, "a-1");
        seed_artist(&store, "a-2");
        create_painting(&store, &NoopInvalidator, "p-001").unwrap();
        update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-1")).unwrap();

        update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-2")).unwrap();

        assert!(artist_paintings(&store, "a-1").is_empty());
        assert_eq!(artist_paintings(&store, "a-2"), vec!["p-001".to_string()]);
    }

    #[test]
    fn reassignment_adds_exactly_once() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        seed_artist(&store, "a-1");
        seed_artist(&store, "a-2");
        create_painting(&store, &NoopInvalidator, "p-001").unwrap();
        update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-1")).unwrap();

        // Destination already lists the painting (legacy double-write)
        let envelope = store.get::<Artist>("a-2").unwrap().unwrap();
        let mut a2 = envelope.record;
        a2.paintings.push("p-001".into());
        store.put(a2, envelope.version).unwrap();

        update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-2")).unwrap();
        assert_eq!(artist_paintings(&store, "a-2"), vec!["p-001".to_string()]);
    }

    #[test]
    fn unchanged_artist_touches_no_artist_records() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        seed_artist(&store, "a-1");
        create_painting(&store, &NoopInvalidator, "p-001").unwrap();
        update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-1")).unwrap();

        let artist_version_before = store.get::<Artist>("a-1").unwrap().unwrap().version;

        let mut form = painting_form("a-1");
        form.title = "Retitled".into();
        update_painting(&store, &NoopInvalidator, "p-001", form).unwrap();

        // No artist lookup wrote anything — version unchanged
        assert_eq!(
            store.get::<Artist>("a-1").unwrap().unwrap().version,
            artist_version_before
        );
        assert_eq!(artist_paintings(&store, "a-1"), vec!["p-001".to_string()]);
    }

    #[test]
    fn reassignment_to_missing_artist_aborts_whole_update() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        seed_artist(&store, "a-1");
        create_painting(&store, &NoopInvalidator, "p-001").unwrap();
        update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-1")).unwrap();

        let err =
            update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-ghost"))
                .unwrap_err();
        assert!(matches!(err, UpdateError::ArtistNotFound(id) if id == "a-ghost"));

        // Nothing moved: old artist still owns the painting, record unchanged
        assert_eq!(artist_paintings(&store, "a-1"), vec!["p-001".to_string()]);
        let painting = store.get::<Painting>("p-001").unwrap().unwrap().record;
        assert_eq!(painting.artist_id, "a-1");
    }

    #[test]
    fn missing_old_artist_is_tolerated() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        seed_artist(&store, "a-2");
        create_painting(&store, &NoopInvalidator, "p-001").unwrap();

        // Point the painting at an artist record that never existed
        let envelope = store.get::<Painting>("p-001").unwrap().unwrap();
        let mut painting = envelope.record;
        painting.artist_id = "a-vanished".into();
        store.put(painting, envelope.version).unwrap();

        update_painting(&store, &NoopInvalidator, "p-001", painting_form("a-2")).unwrap();
        assert_eq!(artist_paintings(&store, "a-2"), vec!["p-001".to_string()]);
    }

    #[test]
    fn invalid_form_rejected_before_any_lookup() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        // No artist, no painting seeded — validation must fire first
        let err = update_painting(
            &store,
            &NoopInvalidator,
            "p-404",
            PaintingForm::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UpdateError::Validation(_)));
    }

    #[test]
    fn update_signals_list_and_record_invalidation() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        let invalidator = RecordingInvalidator::new();
        seed_artist(&store, "a-1");
        create_painting(&store, &NoopInvalidator, "p-001").unwrap();

        update_painting(&store, &invalidator, "p-001", painting_form("a-1")).unwrap();

        let signals = invalidator.get_signals();
        assert!(signals.contains(&"list:paintings".to_string()));
        assert!(signals.contains(&"record:paintings/p-001".to_string()));
    }
}
