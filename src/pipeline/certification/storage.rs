//! Object storage for rendered certificates.
//!
//! Keys are slash-separated relative paths. `FileSystemStorage` maps them
//! under a root directory and reports a URL built from a public base.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Where a stored object can be retrieved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

pub trait ObjectStorage: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<StoredObject, StorageError>;
}

impl<T: ObjectStorage + ?Sized> ObjectStorage for std::sync::Arc<T> {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<StoredObject, StorageError> {
        (**self).put(key, bytes, content_type)
    }
}

/// Reject empty, absolute, or parent-escaping keys.
pub fn validate_key(key: &str) -> Result<&Path, StorageError> {
    let path = Path::new(key);
    if key.trim().is_empty() || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(path)
}

fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// Objects written as files below `root`.
pub struct FileSystemStorage {
    root: PathBuf,
    public_base_url: String,
}

impl FileSystemStorage {
    /// `public_base_url` defaults to a `file://` URL of the root.
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        let root = root.into();
        let public_base_url =
            public_base_url.unwrap_or_else(|| format!("file://{}", root.display()));
        Self {
            root,
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(validate_key(key)?))
    }
}

impl ObjectStorage for FileSystemStorage {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<StoredObject, StorageError> {
        let full_path = self.path_for(key)?;
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write beside the target, then rename, so readers never see a partial file.
        let staging = full_path.with_extension("partial");
        std::fs::write(&staging, bytes)?;
        std::fs::rename(&staging, &full_path)?;

        tracing::debug!(key, content_type, size = bytes.len(), "Stored object");
        Ok(StoredObject {
            key: key.to_string(),
            url: join_url(&self.public_base_url, key),
        })
    }
}

/// In-memory storage (for tests and dry runs).
pub struct MemoryStorage {
    base_url: String,
    objects: Mutex<BTreeMap<String, (String, Vec<u8>)>>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            base_url: "memory://sitecert".into(),
            objects: Mutex::new(BTreeMap::new()),
            fail_writes: false,
        }
    }

    /// Storage whose every `put` fails.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(key).map(|(_, bytes)| bytes.clone()))
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStorage for MemoryStorage {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<StoredObject, StorageError> {
        validate_key(key)?;
        if self.fail_writes {
            return Err(StorageError::Unavailable("memory storage rejects writes".into()));
        }
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".into()))?;
        objects.insert(key.to_string(), (content_type.to_string(), bytes.to_vec()));
        Ok(StoredObject {
            key: key.to_string(),
            url: join_url(&self.base_url, key),
        })
    }
}
