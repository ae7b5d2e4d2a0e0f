//! Multi-resolution image set for a catalog record.
//!
//! Historically the painting document stored its images as nine parallel
//! arrays — URL and file-id arrays at four resolutions plus a rendered-flag
//! array — kept index-aligned by convention. That shape survives on the wire
//! (existing documents must keep reading and writing it), but in memory the
//! set is a single ordered `Vec<CatalogImage>`: one element per logical
//! image, carrying all four `(url, file_id)` pairs and its flag. Alignment
//! is structural, not a convention to police.
//!
//! Wire ↔ memory conversion happens in serde via [`LegacyImageArrays`].
//! Deserialization runs [`LegacyImageArrays::repair_legacy_lengths`] first,
//! so historical records whose arrays drifted out of step load cleanly; new
//! writes can never reintroduce the drift.

use serde::{Deserialize, Serialize};

/// A stored CDN object reference. An empty pair marks a legacy placeholder
/// (the object was never uploaded or its id was lost).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub file_id: String,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_id: file_id.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_empty() && self.file_id.is_empty()
    }
}

/// One logical image: the original upload plus its three derived rasters
/// and the display flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogImage {
    pub original: ImageRef,
    /// 150-edge derivative.
    pub small: ImageRef,
    /// 300-edge derivative.
    pub medium: ImageRef,
    /// 1000-edge derivative.
    pub large: ImageRef,
    pub rendered: bool,
}

impl CatalogImage {
    /// File ids of all four stored objects, original first.
    pub fn file_ids(&self) -> [&str; 4] {
        [
            &self.original.file_id,
            &self.small.file_id,
            &self.medium.file_id,
            &self.large.file_id,
        ]
    }
}

/// Ordered set of a record's images. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LegacyImageArrays", into = "LegacyImageArrays")]
pub struct ImageSet {
    entries: Vec<CatalogImage>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogImage> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogImage> {
        self.entries.iter()
    }

    /// Append one image, returning its index.
    pub fn push(&mut self, image: CatalogImage) -> usize {
        self.entries.push(image);
        self.entries.len() - 1
    }

    /// Index of the image whose *original* URL matches.
    pub fn index_of_original_url(&self, url: &str) -> Option<usize> {
        self.entries.iter().position(|img| img.original.url == url)
    }

    /// Remove the image at `index`, preserving the relative order of the
    /// rest. Returns the removed entry, or `None` if out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<CatalogImage> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Set the rendered flag at `index`. Returns `false` if out of range;
    /// no other field is touched.
    pub fn set_rendered(&mut self, index: usize, value: bool) -> bool {
        match self.entries.get_mut(index) {
            Some(img) => {
                img.rendered = value;
                true
            }
            None => false,
        }
    }
}

/// The nine parallel arrays as persisted documents carry them. Field names
/// match the legacy document schema verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyImageArrays {
    pub all_images: Vec<String>,
    #[serde(rename = "all_imageIds")]
    pub all_image_ids: Vec<String>,
    pub all_images_150: Vec<String>,
    #[serde(rename = "all_imageIds_150")]
    pub all_image_ids_150: Vec<String>,
    pub all_images_300: Vec<String>,
    #[serde(rename = "all_imageIds_300")]
    pub all_image_ids_300: Vec<String>,
    pub all_images_1000: Vec<String>,
    #[serde(rename = "all_imageIds_1000")]
    pub all_image_ids_1000: Vec<String>,
    pub image_is_rendered: Vec<bool>,
}

fn pad_pair(urls: &mut Vec<String>, ids: &mut Vec<String>) {
    let len = urls.len().max(ids.len());
    urls.resize(len, String::new());
    ids.resize(len, String::new());
}

impl LegacyImageArrays {
    /// Normalize legacy drift: any id sequence whose length differs from its
    /// paired url sequence is padded with empty-string placeholders up to
    /// the longer of the pair (and vice versa), and the rendered array is
    /// padded with `false` to the original-URL count. Idempotent — running
    /// it on already-consistent arrays changes nothing.
    pub fn repair_legacy_lengths(&mut self) {
        pad_pair(&mut self.all_images, &mut self.all_image_ids);
        pad_pair(&mut self.all_images_150, &mut self.all_image_ids_150);
        pad_pair(&mut self.all_images_300, &mut self.all_image_ids_300);
        pad_pair(&mut self.all_images_1000, &mut self.all_image_ids_1000);
        if self.image_is_rendered.len() < self.all_images.len() {
            self.image_is_rendered.resize(self.all_images.len(), false);
        }
    }
}

impl From<LegacyImageArrays> for ImageSet {
    fn from(mut raw: LegacyImageArrays) -> Self {
        raw.repair_legacy_lengths();

        let n = raw.all_images.len();
        let cell = |urls: &[String], ids: &[String], i: usize| ImageRef {
            url: urls.get(i).cloned().unwrap_or_default(),
            file_id: ids.get(i).cloned().unwrap_or_default(),
        };

        let entries = (0..n)
            .map(|i| CatalogImage {
                original: cell(&raw.all_images, &raw.all_image_ids, i),
                small: cell(&raw.all_images_150, &raw.all_image_ids_150, i),
                medium: cell(&raw.all_images_300, &raw.all_image_ids_300, i),
                large: cell(&raw.all_images_1000, &raw.all_image_ids_1000, i),
                rendered: raw.image_is_rendered.get(i).copied().unwrap_or(false),
            })
            .collect();

        Self { entries }
    }
}

impl From<ImageSet> for LegacyImageArrays {
    fn from(set: ImageSet) -> Self {
        let mut raw = LegacyImageArrays::default();
        for img in set.entries {
            raw.all_images.push(img.original.url);
            raw.all_image_ids.push(img.original.file_id);
            raw.all_images_150.push(img.small.url);
            raw.all_image_ids_150.push(img.small.file_id);
            raw.all_images_300.push(img.medium.url);
            raw.all_image_ids_300.push(img.medium.file_id);
            raw.all_images_1000.push(img.large.url);
            raw.all_image_ids_1000.push(img.large.file_id);
            raw.image_is_rendered.push(img.rendered);
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image(tag: &str) -> CatalogImage {
        CatalogImage {
            original: ImageRef::new(format!("https://cdn.test/full/{tag}.jpg"), format!("f-{tag}")),
            small: ImageRef::new(format!("https://cdn.test/150/{tag}.jpg"), format!("s-{tag}")),
            medium: ImageRef::new(format!("https://cdn.test/300/{tag}.jpg"), format!("m-{tag}")),
            large: ImageRef::new(format!("https://cdn.test/1000/{tag}.jpg"), format!("l-{tag}")),
            rendered: false,
        }
    }

    // =========================================================================
    // Structural operations
    // =========================================================================

    #[test]
    fn push_returns_appended_index() {
        let mut set = ImageSet::new();
        assert_eq!(set.push(sample_image("a")), 0);
        assert_eq!(set.push(sample_image("b")), 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut set = ImageSet::new();
        set.push(sample_image("a"));
        set.push(sample_image("b"));
        set.push(sample_image("c"));

        let removed = set.remove_at(1).unwrap();
        assert_eq!(removed.original.file_id, "f-b");
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().original.file_id, "f-a");
        assert_eq!(set.get(1).unwrap().original.file_id, "f-c");
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut set = ImageSet::new();
        set.push(sample_image("a"));
        assert!(set.remove_at(1).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn index_of_original_url_matches_only_originals() {
        let mut set = ImageSet::new();
        set.push(sample_image("a"));
        set.push(sample_image("b"));

        assert_eq!(set.index_of_original_url("https://cdn.test/full/b.jpg"), Some(1));
        // A derived URL never matches
        assert_eq!(set.index_of_original_url("https://cdn.test/300/b.jpg"), None);
        assert_eq!(set.index_of_original_url("https://cdn.test/full/zz.jpg"), None);
    }

    #[test]
    fn set_rendered_touches_only_the_flag() {
        let mut set = ImageSet::new();
        set.push(sample_image("a"));
        set.push(sample_image("b"));
        let before = set.get(1).unwrap().clone();

        assert!(set.set_rendered(1, true));
        let after = set.get(1).unwrap();
        assert!(after.rendered);
        assert_eq!(after.original, before.original);
        assert_eq!(after.large, before.large);
        assert!(!set.get(0).unwrap().rendered);

        assert!(!set.set_rendered(2, true));
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    #[test]
    fn serializes_to_legacy_parallel_arrays() {
        let mut set = ImageSet::new();
        set.push(sample_image("a"));
        set.set_rendered(0, true);

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["all_images"][0], "https://cdn.test/full/a.jpg");
        assert_eq!(json["all_imageIds"][0], "f-a");
        assert_eq!(json["all_images_150"][0], "https://cdn.test/150/a.jpg");
        assert_eq!(json["all_imageIds_1000"][0], "l-a");
        assert_eq!(json["image_is_rendered"][0], true);
    }

    #[test]
    fn wire_roundtrip_preserves_entries() {
        let mut set = ImageSet::new();
        set.push(sample_image("a"));
        set.push(sample_image("b"));
        set.set_rendered(0, true);

        let json = serde_json::to_string(&set).unwrap();
        let back: ImageSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn deserializing_missing_arrays_yields_empty_set() {
        let set: ImageSet = serde_json::from_str("{}").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn legacy_short_id_array_is_padded() {
        // Two originals but only one id — historical partial-write damage
        let json = r#"{
            "all_images": ["u1", "u2"],
            "all_imageIds": ["i1"],
            "all_images_150": ["s1", "s2"],
            "all_imageIds_150": ["si1", "si2"],
            "all_images_300": ["m1", "m2"],
            "all_imageIds_300": ["mi1", "mi2"],
            "all_images_1000": ["l1", "l2"],
            "all_imageIds_1000": ["li1", "li2"],
            "image_is_rendered": [true]
        }"#;
        let set: ImageSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().original.url, "u2");
        assert_eq!(set.get(1).unwrap().original.file_id, "");
        assert!(set.get(0).unwrap().rendered);
        assert!(!set.get(1).unwrap().rendered);
    }

    #[test]
    fn repair_is_idempotent() {
        let mut raw = LegacyImageArrays {
            all_images: vec!["u1".into(), "u2".into()],
            all_image_ids: vec!["i1".into()],
            image_is_rendered: vec![],
            ..LegacyImageArrays::default()
        };

        raw.repair_legacy_lengths();
        let once = raw.clone();
        raw.repair_legacy_lengths();
        assert_eq!(raw, once);

        assert_eq!(raw.all_image_ids, vec!["i1".to_string(), String::new()]);
        assert_eq!(raw.image_is_rendered, vec![false, false]);
    }

    #[test]
    fn repair_pads_urls_when_ids_are_longer() {
        let mut raw = LegacyImageArrays {
            all_images_300: vec!["m1".into()],
            all_image_ids_300: vec!["mi1".into(), "mi2".into()],
            ..LegacyImageArrays::default()
        };
        raw.repair_legacy_lengths();
        assert_eq!(raw.all_images_300.len(), 2);
        assert_eq!(raw.all_images_300[1], "");
    }
}
