//! Catalog records, persistence, and the operations over them.
//!
//! | Module | Role |
//! |--------|------|
//! | [`record`] | The four document types (painting, artist, hero item, article) |
//! | [`image_set`] | A painting's multi-resolution image set + legacy wire format |
//! | [`store`] | Versioned JSON document store behind the database seam |
//! | [`forms`] | Schema-validated inputs for the admin screens |
//! | [`update`] | Painting synchronizer: field updates + artist cross-reference |
//! | [`entities`] | Artist / hero item / article CRUD and dashboard counts |

pub mod entities;
pub mod forms;
pub mod image_set;
pub mod record;
pub mod store;
pub mod update;

pub use entities::{
    CatalogStats, create_article, create_artist, create_hero_item, delete_article,
    delete_hero_item, set_artist_profile_image, stats, update_article, update_artist,
    update_hero_item,
};
pub use forms::{ArticleForm, ArtistForm, HeroForm, PaintingForm, ValidationError};
pub use image_set::{CatalogImage, ImageRef, ImageSet, LegacyImageArrays};
pub use record::{Article, Artist, HeroItem, KeyPoints, Painting, PaintingSource, Record};
pub use store::{JsonStore, PageRequest, Paged, StoreError, Versioned};
pub use update::{
    Invalidator, NoopInvalidator, UpdateError, create_painting, delete_painting, update_painting,
};
