//! Source-document retrieval behind a trait seam.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::StoreError;

/// One fetched object: the bytes plus whatever the store knows about them.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub size: u64,
}

/// Read access to document storage, addressed by (container, path).
pub trait ObjectStore: Send + Sync {
    fn fetch(&self, container: &str, path: &str) -> Result<StoredObject, StoreError>;

    /// A display URI for logs and OCR collaborators.
    fn uri(&self, container: &str, path: &str) -> String {
        format!("{container}/{path}")
    }
}

/// Filesystem-backed store: containers map to directories under a root.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for FsObjectStore {
    fn fetch(&self, container: &str, path: &str) -> Result<StoredObject, StoreError> {
        let full = self.root.join(container).join(path);
        if !full.is_file() {
            return Err(StoreError::ObjectNotFound {
                container: container.to_string(),
                path: path.to_string(),
            });
        }
        let bytes = std::fs::read(&full)?;
        let content_type = mime_guess::from_path(&full)
            .first()
            .map(|m| m.essence_str().to_string());
        let size = bytes.len() as u64;
        Ok(StoredObject {
            bytes,
            content_type,
            size,
        })
    }
}

/// In-memory object store for tests.
#[derive(Default)]
pub struct MockObjectStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, container: &str, path: &str, bytes: Vec<u8>, content_type: Option<&str>) {
        let size = bytes.len() as u64;
        self.objects
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(
                (container.to_string(), path.to_string()),
                StoredObject {
                    bytes,
                    content_type: content_type.map(str::to_string),
                    size,
                },
            );
    }
}

impl ObjectStore for MockObjectStore {
    fn fetch(&self, container: &str, path: &str) -> Result<StoredObject, StoreError> {
        self.objects
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&(container.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::ObjectNotFound {
                container: container.to_string(),
                path: path.to_string(),
            })
    }
}
