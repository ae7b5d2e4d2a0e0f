//! Catalog record types.
//!
//! Four document kinds make up the back-office catalog: paintings, artists,
//! hero banner items, and articles. Each is addressed by a human-assigned
//! business key (`painting_id`, `artist_id`, ...) — never by storage-internal
//! identity — and cross-references between records use those keys too.
//!
//! Field names mirror the legacy document schema so existing data keeps
//! loading; fields the back-office no longer writes carry serde defaults.

use super::image_set::ImageSet;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A persistable catalog document.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Collection the record lives in (one directory per collection).
    const COLLECTION: &'static str;

    /// The record's business key.
    fn key(&self) -> &str;
}

/// Provenance of a painting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintingSource {
    #[default]
    Original,
    Collection,
    Print,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Painting {
    pub painting_id: String,
    pub title: String,
    pub title_chinese: String,
    pub creation_year: String,
    /// Business key of the associated artist; empty while unassigned.
    pub artist_id: String,
    pub collector_id: String,
    pub material: String,
    pub material_chinese: String,
    pub source: PaintingSource,
    pub condition: String,
    pub available: bool,
    pub on_hold: bool,
    pub description: String,
    pub description_chinese: String,
    pub seal: String,
    pub seal_chinese: String,
    pub inscription: String,
    pub inscription_chinese: String,

    pub awards: Vec<String>,
    pub awards_chinese: Vec<String>,
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub images: ImageSet,

    /// Dimensions in centimeters.
    pub image_height: f64,
    pub image_width: f64,
    pub overall_height: f64,
    pub overall_width: f64,
    pub is_framed: bool,
    pub selling_price: f64,
    pub mount_description: String,

    pub featured: bool,
    pub homepage: bool,
    pub views: u64,
}

impl Painting {
    /// A fresh, unassigned painting with the given business key. New
    /// records start available with an empty image set.
    pub fn new(painting_id: impl Into<String>) -> Self {
        Self {
            painting_id: painting_id.into(),
            available: true,
            ..Self::default()
        }
    }
}

impl Record for Painting {
    const COLLECTION: &'static str = "paintings";

    fn key(&self) -> &str {
        &self.painting_id
    }
}

/// Curated biography highlights shown on the artist page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPoints {
    pub education: String,
    pub current_profession: String,
    pub best_achievement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub name_chinese: String,
    pub title: String,
    pub birth_year: i32,
    pub bio: String,
    pub bio_chinese: String,
    pub short_description: String,

    pub profile_image: String,
    #[serde(rename = "profile_imageId")]
    pub profile_image_id: String,

    /// Business keys of this artist's paintings. A painting key appears in
    /// exactly one artist's list at a time.
    pub paintings: Vec<String>,

    pub featured: bool,
    pub views: u64,
    pub key_points: KeyPoints,
    pub awards: String,
    pub exhibitions: String,
    pub external_links: String,
}

impl Record for Artist {
    const COLLECTION: &'static str = "artists";

    fn key(&self) -> &str {
        &self.artist_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroItem {
    pub hero_id: String,
    pub title: String,
    pub artist_id: String,
    /// Denormalized from the artist record at create/update time.
    pub artist_name: String,
    pub artist_name_chinese: String,
    pub image: String,
    #[serde(rename = "imageId")]
    pub image_id: String,
    pub painting_id: String,
}

impl Record for HeroItem {
    const COLLECTION: &'static str = "heroitems";

    fn key(&self) -> &str {
        &self.hero_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub article_id: String,
    pub title: String,
    /// Editorial category (art review, art news, art history, ...).
    pub category: String,
    /// `abstract` on the wire; keyword in Rust.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub date: String,
    pub cover_image: String,
    #[serde(rename = "cover_imageId")]
    pub cover_image_id: String,
    /// Raw markdown body; rendering belongs to the site frontend.
    pub markdown: String,
}

impl Record for Article {
    const COLLECTION: &'static str = "articles";

    fn key(&self) -> &str {
        &self.article_id
    }
}
