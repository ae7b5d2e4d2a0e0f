//! Versioned JSON document store.
//!
//! The production deployment keeps catalog records in a hosted document
//! database; that driver is an external collaborator behind this seam. The
//! in-tree implementation persists one pretty-printed JSON file per record
//! under `<root>/<collection>/<key>.json` — inspectable with any editor,
//! same as the pipeline manifests this crate's ancestry is built on.
//!
//! Two design points worth stating:
//!
//! - **Lifecycle-scoped handle.** [`JsonStore::open`] returns a handle that
//!   is passed explicitly to every operation. There is no module-level
//!   "connected" flag and no global.
//! - **Optimistic versioning.** Every document is wrapped in a
//!   [`Versioned`] envelope carrying a monotonically increasing version.
//!   Writers pass the version they read; a mismatch fails with
//!   [`StoreError::VersionConflict`] instead of silently losing the other
//!   writer's update. The check-and-write runs under an in-process mutex;
//!   cross-process exclusion belongs to the real database.

use super::record::Record;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no {collection} record with key '{key}'")]
    NotFound { collection: &'static str, key: String },
    #[error("{collection} record with key '{key}' already exists")]
    DuplicateKey { collection: &'static str, key: String },
    #[error(
        "version conflict on {collection}/{key}: expected {expected}, found {actual} — \
         the record changed since it was read"
    )]
    VersionConflict {
        collection: &'static str,
        key: String,
        expected: u64,
        actual: u64,
    },
    #[error("invalid record key '{0}': keys must be non-empty and contain only [A-Za-z0-9._-]")]
    InvalidKey(String),
}

/// A stored document plus its envelope version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u64,
    pub record: T,
}

/// Offset pagination request. Pages are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    fn skip(&self) -> usize {
        (self.page - 1) * self.page_size
    }
}

/// One page of records plus the arithmetic the list screens need.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
}

pub struct JsonStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

impl JsonStore {
    /// Open (creating if needed) a store rooted at `root`. The returned
    /// handle is the only way to reach the data; drop it to release.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path<R: Record>(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(R::COLLECTION).join(format!("{key}.json")))
    }

    fn read_envelope<R: Record>(&self, key: &str) -> Result<Option<Versioned<R>>, StoreError> {
        let path = self.record_path::<R>(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_envelope<R: Record>(&self, envelope: &Versioned<R>) -> Result<(), StoreError> {
        let path = self.record_path::<R>(envelope.record.key())?;
        fs::create_dir_all(path.parent().expect("record path has a collection dir"))?;
        let json = serde_json::to_string_pretty(envelope)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Fetch a record with its version, or `None` if absent.
    pub fn get<R: Record>(&self, key: &str) -> Result<Option<Versioned<R>>, StoreError> {
        self.read_envelope(key)
    }

    /// Fetch a record that must exist.
    pub fn get_required<R: Record>(&self, key: &str) -> Result<Versioned<R>, StoreError> {
        self.read_envelope(key)?.ok_or_else(|| StoreError::NotFound {
            collection: R::COLLECTION,
            key: key.to_string(),
        })
    }

    pub fn exists<R: Record>(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.record_path::<R>(key)?.exists())
    }

    /// Insert a record that must not exist yet. Returns the envelope at
    /// version 1.
    pub fn put_new<R: Record>(&self, record: R) -> Result<Versioned<R>, StoreError> {
        let _guard = self.write_lock.lock().expect("store lock poisoned");
        if self.record_path::<R>(record.key())?.exists() {
            return Err(StoreError::DuplicateKey {
                collection: R::COLLECTION,
                key: record.key().to_string(),
            });
        }
        let envelope = Versioned { version: 1, record };
        self.write_envelope(&envelope)?;
        Ok(envelope)
    }

    /// Replace a record, checking that it is still at `expected_version`.
    /// Returns the envelope at the incremented version.
    pub fn put<R: Record>(
        &self,
        record: R,
        expected_version: u64,
    ) -> Result<Versioned<R>, StoreError> {
        let _guard = self.write_lock.lock().expect("store lock poisoned");
        let current = self.read_envelope::<R>(record.key())?.ok_or_else(|| {
            StoreError::NotFound {
                collection: R::COLLECTION,
                key: record.key().to_string(),
            }
        })?;
        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                collection: R::COLLECTION,
                key: record.key().to_string(),
                expected: expected_version,
                actual: current.version,
            });
        }
        let envelope = Versioned {
            version: expected_version + 1,
            record,
        };
        self.write_envelope(&envelope)?;
        Ok(envelope)
    }

    /// Remove a record. Absence is an error — callers deleting during
    /// cleanup should check `exists` first or tolerate `NotFound`.
    pub fn delete<R: Record>(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().expect("store lock poisoned");
        let path = self.record_path::<R>(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                collection: R::COLLECTION,
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// All keys in a collection, newest first. Business keys are assigned
    /// monotonically by the admin screens, so reverse-lexicographic order
    /// matches the "latest additions on page one" behavior of the list
    /// views.
    pub fn keys<R: Record>(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join(R::COLLECTION);
        let mut keys = Vec::new();
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                keys.push(stem.to_string());
            }
        }
        keys.sort_by(|a, b| b.cmp(a));
        Ok(keys)
    }

    pub fn count<R: Record>(&self) -> Result<usize, StoreError> {
        Ok(self.keys::<R>()?.len())
    }

    /// One page of a collection, optionally restricted by an equality-style
    /// predicate (the search screens filter on exact business keys).
    pub fn page_where<R, F>(&self, request: PageRequest, filter: F) -> Result<Paged<R>, StoreError>
    where
        R: Record,
        F: Fn(&R) -> bool,
    {
        let mut matching = Vec::new();
        for key in self.keys::<R>()? {
            if let Some(envelope) = self.read_envelope::<R>(&key)?
                && filter(&envelope.record)
            {
                matching.push(envelope.record);
            }
        }

        let total_items = matching.len();
        let total_pages = total_items.div_ceil(request.page_size);
        let skip = request.skip();
        let items: Vec<R> = matching
            .into_iter()
            .skip(skip)
            .take(request.page_size)
            .collect();
        let has_next = total_items > skip + items.len();

        Ok(Paged {
            items,
            total_items,
            total_pages,
            has_next,
        })
    }

    /// One page of a collection, unfiltered.
    pub fn page<R: Record>(&self, request: PageRequest) -> Result<Paged<R>, StoreError> {
        self.page_where(request, |_| true)
    }
}
