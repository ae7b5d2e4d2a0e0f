//! Validated form inputs for the admin screens.
//!
//! Every mutation enters the catalog through one of these structured types,
//! parsed from the submitted JSON and validated *before* any record is
//! touched or any external call is made. Unknown fields are rejected to
//! catch typos early, same policy as the site configuration.
//!
//! Validation is two-fold:
//! - **Required fields** must be non-blank after trimming.
//! - **Free-text arrays** (awards, tags) come from comma-separated inputs
//!   and routinely contain blank or whitespace-only entries; those are
//!   dropped during normalization, and the surviving entries are trimmed.
//!
//! The image set is deliberately absent from [`PaintingForm`]: images are
//! managed by their own attach/detach operations and a field-set update
//! must never clobber them.

use super::record::{Article, Artist, HeroItem, KeyPoints, Painting, PaintingSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("validation failed: {}", issues.join("; "))]
pub struct ValidationError {
    pub issues: Vec<String>,
}

/// Collects blank-check failures across fields.
struct Checker {
    issues: Vec<String>,
}

impl Checker {
    fn new() -> Self {
        Self { issues: Vec::new() }
    }

    fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.issues.push(format!("{field} is required"));
        }
    }

    fn require_non_negative(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.issues.push(format!("{field} must be a non-negative number"));
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues: self.issues })
        }
    }
}

/// Trim entries and drop the blank ones.
fn clean_entries(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaintingForm {
    pub title: String,
    pub title_chinese: String,
    pub creation_year: String,
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

    pub image_height: f64,
    pub image_width: f64,
    pub overall_height: f64,
    pub overall_width: f64,
    pub is_framed: bool,
    pub selling_price: f64,
    pub mount_description: String,

    pub featured: bool,
    pub homepage: bool,
}

impl PaintingForm {
    /// Check required fields and normalize free-text arrays. Rejection
    /// happens here, before any record or external service is touched.
    pub fn into_validated(mut self) -> Result<Self, ValidationError> {
        let mut check = Checker::new();
        check.require("title", &self.title);
        check.require("creation_year", &self.creation_year);
        check.require("artist_id", &self.artist_id);
        check.require("material", &self.material);
        check.require("description", &self.description);
        check.require_non_negative("image_height", self.image_height);
        check.require_non_negative("image_width", self.image_width);
        check.require_non_negative("overall_height", self.overall_height);
        check.require_non_negative("overall_width", self.overall_width);
        check.require_non_negative("selling_price", self.selling_price);
        check.finish()?;

        self.awards = clean_entries(self.awards);
        self.awards_chinese = clean_entries(self.awards_chinese);
        self.tags = clean_entries(self.tags);
        Ok(self)
    }

    /// Apply the field set to a painting. The business key, the image set,
    /// and the view counter are not form-managed and stay untouched.
    pub fn apply_to(self, painting: &mut Painting) {
        painting.title = self.title;
        painting.title_chinese = self.title_chinese;
        painting.creation_year = self.creation_year;
        painting.artist_id = self.artist_id;
        painting.collector_id = self.collector_id;
        painting.material = self.material;
        painting.material_chinese = self.material_chinese;
        painting.source = self.source;
        painting.condition = self.condition;
        painting.available = self.available;
        painting.on_hold = self.on_hold;
        painting.description = self.description;
        painting.description_chinese = self.description_chinese;
        painting.seal = self.seal;
        painting.seal_chinese = self.seal_chinese;
        painting.inscription = self.inscription;
        painting.inscription_chinese = self.inscription_chinese;
        painting.awards = self.awards;
        painting.awards_chinese = self.awards_chinese;
        painting.tags = self.tags;
        painting.image_height = self.image_height;
        painting.image_width = self.image_width;
        painting.overall_height = self.overall_height;
        painting.overall_width = self.overall_width;
        painting.is_framed = self.is_framed;
        painting.selling_price = self.selling_price;
        painting.mount_description = self.mount_description;
        painting.featured = self.featured;
        painting.homepage = self.homepage;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtistForm {
    pub name: String,
    pub name_chinese: String,
    pub title: String,
    pub birth_year: i32,
    pub bio: String,
    pub bio_chinese: String,
    pub short_description: String,
    pub featured: bool,
    pub key_points: KeyPoints,
    pub awards: String,
    pub exhibitions: String,
    pub external_links: String,
}

impl ArtistForm {
    pub fn into_validated(self) -> Result<Self, ValidationError> {
        let mut check = Checker::new();
        check.require("name", &self.name);
        check.require("name_chinese", &self.name_chinese);
        check.require("title", &self.title);
        check.require("bio", &self.bio);
        check.require("short_description", &self.short_description);
        check.finish()?;
        Ok(self)
    }

    /// The business key, painting references, profile image, and view
    /// counter are managed elsewhere.
    pub fn apply_to(self, artist: &mut Artist) {
        artist.name = self.name;
        artist.name_chinese = self.name_chinese;
        artist.title = self.title;
        artist.birth_year = self.birth_year;
        artist.bio = self.bio;
        artist.bio_chinese = self.bio_chinese;
        artist.short_description = self.short_description;
        artist.featured = self.featured;
        artist.key_points = self.key_points;
        artist.awards = self.awards;
        artist.exhibitions = self.exhibitions;
        artist.external_links = self.external_links;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeroForm {
    pub title: String,
    pub artist_id: String,
    pub image: String,
    #[serde(rename = "imageId")]
    pub image_id: String,
    pub painting_id: String,
}

impl HeroForm {
    pub fn into_validated(self) -> Result<Self, ValidationError> {
        let mut check = Checker::new();
        check.require("title", &self.title);
        check.require("artist_id", &self.artist_id);
        check.require("image", &self.image);
        check.require("painting_id", &self.painting_id);
        check.finish()?;
        Ok(self)
    }

    /// Artist names are denormalized by the caller after lookup, not here.
    pub fn apply_to(self, item: &mut HeroItem) {
        item.title = self.title;
        item.artist_id = self.artist_id;
        item.image = self.image;
        item.image_id = self.image_id;
        item.painting_id = self.painting_id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArticleForm {
    pub title: String,
    pub category: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub date: String,
    pub cover_image: String,
    #[serde(rename = "cover_imageId")]
    pub cover_image_id: String,
    pub markdown: String,
}

impl ArticleForm {
    pub fn into_validated(self) -> Result<Self, ValidationError> {
        let mut check = Checker::new();
        check.require("title", &self.title);
        check.require("category", &self.category);
        check.require("abstract", &self.abstract_text);
        check.require("date", &self.date);
        check.require("cover_image", &self.cover_image);
        check.require("markdown", &self.markdown);
        check.finish()?;
        Ok(self)
    }

    pub fn apply_to(self, article: &mut Article) {
        article.title = self.title;
        article.category = self.category;
        article.abstract_text = self.abstract_text;
        article.date = self.date;
        article.cover_image = self.cover_image;
        article.cover_image_id = self.cover_image_id;
        article.markdown = self.markdown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_painting_form() -> PaintingForm {
        PaintingForm {
            title: "Autumn Mountains".into(),
            creation_year: "1998".into(),
            artist_id: "a-007".into(),
            material: "ink on paper".into(),
            description: "Hanging scroll".into(),
            ..PaintingForm::default()
        }
    }

    #[test]
    fn minimal_form_validates() {
        assert!(minimal_painting_form().into_validated().is_ok());
    }

    #[test]
    fn missing_required_fields_all_reported() {
        let err = PaintingForm::default().into_validated().unwrap_err();
        let msg = err.to_string();
        for field in ["title", "creation_year", "artist_id", "material", "description"] {
            assert!(msg.contains(field), "expected {field} in: {msg}");
        }
    }

    #[test]
    fn whitespace_only_required_field_is_blank() {
        let form = PaintingForm {
            title: "   ".into(),
            ..minimal_painting_form()
        };
        assert!(form.into_validated().is_err());
    }

    #[test]
    fn blank_array_entries_dropped_and_trimmed() {
        let form = PaintingForm {
            awards: vec!["  Gold Medal ".into(), "".into(), "   ".into()],
            tags: vec!["landscape".into(), " ".into(), "ink ".into()],
            ..minimal_painting_form()
        };
        let validated = form.into_validated().unwrap();
        assert_eq!(validated.awards, vec!["Gold Medal".to_string()]);
        assert_eq!(
            validated.tags,
            vec!["landscape".to_string(), "ink".to_string()]
        );
    }

    #[test]
    fn negative_numeric_fields_rejected() {
        let form = PaintingForm {
            selling_price: -100.0,
            ..minimal_painting_form()
        };
        let err = form.into_validated().unwrap_err();
        assert!(err.to_string().contains("selling_price"));
    }

    #[test]
    fn unknown_fields_rejected_at_parse() {
        let json = r#"{"title": "x", "not_a_field": true}"#;
        assert!(serde_json::from_str::<PaintingForm>(json).is_err());
    }

    #[test]
    fn apply_leaves_key_images_and_views_alone() {
        let mut painting = Painting::new("p-001");
        painting.views = 42;
        painting.images.push(crate::catalog::image_set::CatalogImage::default());

        minimal_painting_form()
            .into_validated()
            .unwrap()
            .apply_to(&mut painting);

        assert_eq!(painting.painting_id, "p-001");
        assert_eq!(painting.views, 42);
        assert_eq!(painting.images.len(), 1);
        assert_eq!(painting.title, "Autumn Mountains");
    }

    #[test]
    fn hero_form_requires_painting_reference() {
        let form = HeroForm {
            title: "Spring show".into(),
            artist_id: "a-1".into(),
            image: "https://cdn.test/hero.jpg".into(),
            ..HeroForm::default()
        };
        let err = form.into_validated().unwrap_err();
        assert!(err.to_string().contains("painting_id"));
    }

    #[test]
    fn article_form_parses_and_validates() {
        let json = r##"{
            "title": "On Literati Painting",
            "category": "art history",
            "abstract": "A short survey",
            "date": "2025-11-02",
            "cover_image": "https://cdn.test/cover.jpg",
            "markdown": "# On Literati Painting"
        }"##;
        let form: ArticleForm = serde_json::from_str(json).unwrap();
        assert!(form.into_validated().is_ok());
    }
}
