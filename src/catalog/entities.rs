//! CRUD operations for the remaining catalog entities.
//!
//! Artists, hero banner items, and articles follow the same shape as the
//! painting operations but without an image set of their own: hero items
//! and articles reference a single CDN object, artists a profile image.
//!
//! Hero items denormalize the artist's names onto the item at create and
//! update time so the storefront renders the banner without a second
//! lookup; a hero item can therefore only ever point at an artist that
//! exists.

use super::forms::{ArticleForm, ArtistForm, HeroForm};
use super::record::{Article, Artist, HeroItem, Painting, Record};
use super::store::{JsonStore, StoreError};
use super::update::{Invalidator, UpdateError};
use crate::cdn::{self, CdnStore, UploadedFile};
use tracing::info;

// =============================================================================
// Artists
// =============================================================================

pub fn create_artist(
    store: &JsonStore,
    invalidator: &dyn Invalidator,
    artist_id: &str,
    form: ArtistForm,
) -> Result<Artist, UpdateError> {
    let form = form.into_validated()?;
    let mut artist = Artist {
        artist_id: artist_id.to_string(),
        ..Artist::default()
    };
    form.apply_to(&mut artist);
    let envelope = store.put_new(artist)?;
    invalidator.list_changed(Artist::COLLECTION);
    info!(artist_id, "artist created");
    Ok(envelope.record)
}

pub fn update_artist(
    store: &JsonStore,
    invalidator: &dyn Invalidator,
    artist_id: &str,
    form: ArtistForm,
) -> Result<Artist, UpdateError> {
    let form = form.into_validated()?;
    let envelope = store.get_required::<Artist>(artist_id)?;
    let mut artist = envelope.record;
    form.apply_to(&mut artist);
    let updated = store.put(artist, envelope.version)?;
    invalidator.list_changed(Artist::COLLECTION);
    invalidator.record_changed(Artist::COLLECTION, artist_id);
    info!(artist_id, "artist updated");
    Ok(updated.record)
}

/// Replace an artist's profile image: upload the new object, persist the
/// new reference, then delete the previous object best-effort.
pub fn set_artist_profile_image(
    store: &JsonStore,
    cdn_store: &dyn CdnStore,
    invalidator: &dyn Invalidator,
    artist_id: &str,
    blob: &[u8],
    file_name: &str,
) -> Result<Artist, UpdateError> {
    let envelope = store.get_required::<Artist>(artist_id)?;

    let folder = format!("/artists/{artist_id}");
    let UploadedFile { url, file_id } = cdn_store.upload(blob, &folder, file_name)?;

    let mut artist = envelope.record;
    let old_file_id = std::mem::replace(&mut artist.profile_image_id, file_id);
    artist.profile_image = url;
    let updated = store.put(artist, envelope.version)?;

    cdn::best_effort_delete(cdn_store, &old_file_id);
    invalidator.record_changed(Artist::COLLECTION, artist_id);
    info!(artist_id, "artist profile image replaced");
    Ok(updated.record)
}

// =============================================================================
// Hero items
// =============================================================================

/// Look up the artist a hero item points at and return its display names.
fn resolve_artist_names(
    store: &JsonStore,
    artist_id: &str,
) -> Result<(String, String), UpdateError> {
    let envelope = store
        .get::<Artist>(artist_id)?
        .ok_or_else(|| UpdateError::ArtistNotFound(artist_id.to_string()))?;
    Ok((envelope.record.name, envelope.record.name_chinese))
}

pub fn create_hero_item(
    store: &JsonStore,
    invalidator: &dyn Invalidator,
    hero_id: &str,
    form: HeroForm,
) -> Result<HeroItem, UpdateError> {
    let form = form.into_validated()?;
    let (artist_name, artist_name_chinese) = resolve_artist_names(store, &form.artist_id)?;

    let mut item = HeroItem {
        hero_id: hero_id.to_string(),
        ..HeroItem::default()
    };
    form.apply_to(&mut item);
    item.artist_name = artist_name;
    item.artist_name_chinese = artist_name_chinese;

    let envelope = store.put_new(item)?;
    invalidator.list_changed(HeroItem::COLLECTION);
    info!(hero_id, "hero item created");
    Ok(envelope.record)
}

pub fn update_hero_item(
    store: &JsonStore,
    invalidator: &dyn Invalidator,
    hero_id: &str,
    form: HeroForm,
) -> Result<HeroItem, UpdateError> {
    let form = form.into_validated()?;
    let (artist_name, artist_name_chinese) = resolve_artist_names(store, &form.artist_id)?;

    let envelope = store.get_required::<HeroItem>(hero_id)?;
    let mut item = envelope.record;
    form.apply_to(&mut item);
    item.artist_name = artist_name;
    item.artist_name_chinese = artist_name_chinese;

    let updated = store.put(item, envelope.version)?;
    invalidator.list_changed(HeroItem::COLLECTION);
    invalidator.record_changed(HeroItem::COLLECTION, hero_id);
    info!(hero_id, "hero item updated");
    Ok(updated.record)
}

pub fn delete_hero_item(
    store: &JsonStore,
    cdn_store: &dyn CdnStore,
    invalidator: &dyn Invalidator,
    hero_id: &str,
) -> Result<HeroItem, UpdateError> {
    let envelope = store.get_required::<HeroItem>(hero_id)?;
    cdn::best_effort_delete(cdn_store, &envelope.record.image_id);
    store.delete::<HeroItem>(hero_id)?;
    invalidator.list_changed(HeroItem::COLLECTION);
    info!(hero_id, "hero item deleted");
    Ok(envelope.record)
}

// =============================================================================
// Articles
// =============================================================================

pub fn create_article(
    store: &JsonStore,
    invalidator: &dyn Invalidator,
    article_id: &str,
    form: ArticleForm,
) -> Result<Article, UpdateError> {
    let form = form.into_validated()?;
    let mut article = Article {
        article_id: article_id.to_string(),
        ..Article::default()
    };
    form.apply_to(&mut article);
    let envelope = store.put_new(article)?;
    invalidator.list_changed(Article::COLLECTION);
    info!(article_id, "article created");
    Ok(envelope.record)
}

pub fn update_article(
    store: &JsonStore,
    invalidator: &dyn Invalidator,
    article_id: &str,
    form: ArticleForm,
) -> Result<Article, UpdateError> {
    let form = form.into_validated()?;
    let envelope = store.get_required::<Article>(article_id)?;
    let mut article = envelope.record;
    form.apply_to(&mut article);
    let updated = store.put(article, envelope.version)?;
    invalidator.list_changed(Article::COLLECTION);
    invalidator.record_changed(Article::COLLECTION, article_id);
    info!(article_id, "article updated");
    Ok(updated.record)
}

pub fn delete_article(
    store: &JsonStore,
    cdn_store: &dyn CdnStore,
    invalidator: &dyn Invalidator,
    article_id: &str,
) -> Result<Article, UpdateError> {
    let envelope = store.get_required::<Article>(article_id)?;
    cdn::best_effort_delete(cdn_store, &envelope.record.cover_image_id);
    store.delete::<Article>(article_id)?;
    invalidator.list_changed(Article::COLLECTION);
    info!(article_id, "article deleted");
    Ok(envelope.record)
}

// =============================================================================
// Dashboard
// =============================================================================

/// Per-collection record counts for the dashboard tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub paintings: usize,
    pub artists: usize,
    pub hero_items: usize,
    pub articles: usize,
}

pub fn stats(store: &JsonStore) -> Result<CatalogStats, StoreError> {
    Ok(CatalogStats {
        paintings: store.count::<Painting>()?,
        artists: store.count::<Artist>()?,
        hero_items: store.count::<HeroItem>()?,
        articles: store.count::<Article>()?,
    })
}
