//! CDN object storage client.
//!
//! The catalog never serves image bytes itself — every raster lives on a
//! hosted CDN and the records store only `(url, file_id)` pairs. This module
//! defines the [`CdnStore`] trait the rest of the crate programs against and
//! re-exports the production HTTP implementation,
//! [`ImageKitClient`](imagekit::ImageKitClient).
//!
//! Two rules the trait encodes:
//!
//! - **No automatic retries.** An upload failure (network, auth, quota)
//!   surfaces to the caller, whose retry policy it is.
//! - **Not-found on delete is a distinct, recoverable error.** Cleanup paths
//!   routinely delete objects that may already be gone; they match on
//!   [`CdnError::NotFound`] and move on.

pub mod imagekit;

use std::time::Duration;
use thiserror::Error;

pub use imagekit::ImageKitClient;

#[derive(Error, Debug)]
pub enum CdnError {
    #[error("CDN authorization failed: {0}")]
    Auth(String),
    #[error("CDN upload failed: {0}")]
    Upload(String),
    #[error("CDN delete failed: {0}")]
    Delete(String),
    #[error("file not found on CDN")]
    NotFound,
    #[error("CDN request timed out after {0:?}")]
    Timeout(Duration),
}

/// A stored object as reported by the CDN: the public URL plus the opaque
/// identifier later used to delete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub url: String,
    pub file_id: String,
}

/// Trait for CDN object storage backends.
pub trait CdnStore {
    /// Store a blob under `folder`, returning its public URL and file id.
    /// The destination name is a hint; the CDN may uniquify it.
    fn upload(&self, blob: &[u8], folder: &str, file_name: &str)
    -> Result<UploadedFile, CdnError>;

    /// Delete a stored object by file id. An object that is already gone
    /// yields [`CdnError::NotFound`].
    fn delete(&self, file_id: &str) -> Result<(), CdnError>;
}

/// Delete a stored object on a cleanup path, where failure must never
/// abort the surrounding operation. Empty ids (legacy placeholders) are
/// skipped; not-found and transport failures are logged and swallowed.
pub fn best_effort_delete(cdn: &dyn CdnStore, file_id: &str) {
    if file_id.is_empty() {
        return;
    }
    match cdn.delete(file_id) {
        Ok(()) => {}
        Err(CdnError::NotFound) => {
            tracing::debug!(file_id, "CDN object already gone during cleanup");
        }
        Err(e) => {
            tracing::warn!(file_id, error = %e, "CDN delete failed during cleanup; continuing");
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory CDN that records operations, in the same shape as the
    /// imaging MockBackend.
    #[derive(Default)]
    pub struct MockCdn {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Ids of currently stored objects; delete removes from here.
        pub stored: Mutex<HashSet<String>>,
        /// When set, the nth upload call (0-based) fails.
        pub fail_upload_at: Option<usize>,
        /// When true, every delete fails with a transport-style error.
        pub fail_deletes: bool,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RecordedOp {
        Upload {
            folder: String,
            file_name: String,
            blob_len: usize,
        },
        Delete {
            file_id: String,
        },
    }

    impl MockCdn {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn upload_count(&self) -> usize {
            self.operations
                .lock()
                .unwrap()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Upload { .. }))
                .count()
        }

        pub fn delete_count(&self) -> usize {
            self.operations
                .lock()
                .unwrap()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Delete { .. }))
                .count()
        }

        pub fn contains(&self, file_id: &str) -> bool {
            self.stored.lock().unwrap().contains(file_id)
        }
    }

    impl CdnStore for MockCdn {
        fn upload(
            &self,
            blob: &[u8],
            folder: &str,
            file_name: &str,
        ) -> Result<UploadedFile, CdnError> {
            let n = self.upload_count();
            self.operations.lock().unwrap().push(RecordedOp::Upload {
                folder: folder.to_string(),
                file_name: file_name.to_string(),
                blob_len: blob.len(),
            });
            if self.fail_upload_at == Some(n) {
                return Err(CdnError::Upload("mock upload failure".to_string()));
            }
            let file_id = format!("file-{n}");
            self.stored.lock().unwrap().insert(file_id.clone());
            Ok(UploadedFile {
                url: format!("https://cdn.test{folder}/{file_name}"),
                file_id,
            })
        }

        fn delete(&self, file_id: &str) -> Result<(), CdnError> {
            self.operations.lock().unwrap().push(RecordedOp::Delete {
                file_id: file_id.to_string(),
            });
            if self.fail_deletes {
                return Err(CdnError::Delete("mock delete failure".to_string()));
            }
            if self.stored.lock().unwrap().remove(file_id) {
                Ok(())
            } else {
                Err(CdnError::NotFound)
            }
        }
    }

    #[test]
    fn mock_upload_assigns_sequential_ids() {
        let cdn = MockCdn::new();
        let a = cdn.upload(b"aa", "/paintings/full/p-1", "a.jpg").unwrap();
        let b = cdn.upload(b"bb", "/paintings/150/p-1", "b.jpg").unwrap();
        assert_eq!(a.file_id, "file-0");
        assert_eq!(b.file_id, "file-1");
        assert_eq!(a.url, "https://cdn.test/paintings/full/p-1/a.jpg");
        assert!(cdn.contains("file-0"));
    }

    #[test]
    fn mock_delete_missing_is_not_found() {
        let cdn = MockCdn::new();
        assert!(matches!(cdn.delete("nope"), Err(CdnError::NotFound)));
    }

    #[test]
    fn mock_upload_failure_injection() {
        let cdn = MockCdn {
            fail_upload_at: Some(1),
            ..MockCdn::default()
        };
        assert!(cdn.upload(b"a", "/f", "a.jpg").is_ok());
        assert!(matches!(
            cdn.upload(b"b", "/f", "b.jpg"),
            Err(CdnError::Upload(_))
        ));
    }
}
